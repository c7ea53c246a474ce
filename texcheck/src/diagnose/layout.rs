/// Joins two blocks of lines into one, column A padded to its widest line,
/// for side-by-side visual diffing. Widths are measured in characters, not
/// bytes, so box-drawing glyphs line up.
pub fn layout_two_columns(column_a: &[String], column_b: &[String]) -> Vec<String> {
    let width_a = column_a.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let lines = column_a.len().max(column_b.len());
    let mut out = Vec::with_capacity(lines);
    for line in 0..lines {
        let a = column_a.get(line).map(String::as_str).unwrap_or("");
        let b = column_b.get(line).map(String::as_str).unwrap_or("");
        let pad = width_a - a.chars().count();
        out.push(format!("{}{} | {}", a, " ".repeat(pad), b));
    }
    out
}
