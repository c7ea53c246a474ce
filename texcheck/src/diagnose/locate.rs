use crate::texel::{Texel, TexelFormat, TexelStore};
use std::collections::BTreeMap;
use tracing::trace;

/// Black-box re-execution of a single sampling operation against a synthetic
/// texture. One implementation probes the analytic model, another re-runs the
/// call through an executor; the localizer cannot tell them apart.
pub trait TexelProbe {
    type Error;

    fn probe(&mut self, texels: TexelStore) -> impl Future<Output = Result<Texel, Self::Error>>;
}

/// Identifies which texels contributed to one sampled result and with what
/// per-component weights, then renders them as a grid plus a weight listing.
///
/// The search is a binary partition over texel indices driven by an explicit
/// work stack: fill half of the current unclassified set with 1, everything
/// else with 0, and probe. A zero result rules the half out wholesale; a
/// nonzero singleton's probe result is that texel's weight vector. Each
/// contributing texel therefore costs O(log n) probes instead of the n probes
/// of an exhaustive scan. Probes run strictly one at a time because each
/// split decision depends on the previous result.
pub async fn identify_sample_points<P: TexelProbe>(
    format: TexelFormat,
    width: u32,
    height: u32,
    probe: &mut P,
) -> Result<Vec<String>, P::Error> {
    let num_texels = width * height;
    let mut weights: BTreeMap<u32, Texel> = BTreeMap::new();
    let mut unclassified_stack: Vec<Vec<u32>> = vec![(0..num_texels).collect()];
    let mut probes = 0u32;

    while let Some(unclassified) = unclassified_stack.pop() {
        // Split into two interleaved halves; sets stay sorted.
        let mut candidates = Vec::with_capacity(unclassified.len().div_ceil(2));
        let mut rest = Vec::with_capacity(unclassified.len() / 2);
        for (i, &texel) in unclassified.iter().enumerate() {
            if i & 1 == 0 {
                candidates.push(texel);
            } else {
                rest.push(texel);
            }
        }
        if !rest.is_empty() {
            unclassified_stack.push(rest);
        }

        let pattern = TexelStore::from_fn(format, width, height, 1, |[x, y, _]| {
            let index = x + y * width;
            if candidates.binary_search(&index).is_ok() {
                Texel::splat(1.0)
            } else {
                Texel::splat(0.0)
            }
        });
        let result = probe.probe(pattern).await?;
        probes += 1;

        if format.component_order().iter().any(|&c| result[c] != 0.0) {
            if candidates.len() == 1 {
                // The probe result of a singleton set is its weight vector.
                weights.insert(candidates[0], result);
            } else {
                unclassified_stack.push(candidates);
            }
        }
    }

    trace!(probes, located = weights.len(), "sample point search done");
    Ok(render_sample_points(format, width, height, &weights))
}

fn letter(index: usize) -> char {
    // Wraps after 'z'; linear filtering touches at most 8 texels, so real
    // diagnostics never get close.
    char::from(b'a' + (index % 26) as u8)
}

/// Text-art grid marking each contributing texel with a letter, followed by
/// one `a: at: [x, y], weights: [...]` line per texel:
///
/// ```text
///     0   1   2   3
///   ┌───┬───┬───┬───┐
/// 0 │   │ a │   │   │
///   ├───┼───┼───┼───┤
/// 1 │   │   │ b │   │
///   └───┴───┴───┴───┘
/// a: at: [1, 0], weights: [R: 0.75000]
/// b: at: [2, 1], weights: [R: 0.25000]
/// ```
fn render_sample_points(
    format: TexelFormat,
    width: u32,
    height: u32,
    weights: &BTreeMap<u32, Texel>,
) -> Vec<String> {
    let mut lines = Vec::new();

    let mut header = String::from("  ");
    for x in 0..width {
        header.push_str(&format!("  {} ", x));
    }
    lines.push(header);

    let mut top = String::from("  ┌");
    for x in 0..width {
        top.push_str(if x == width - 1 { "───┐" } else { "───┬" });
    }
    lines.push(top);

    let mut ordered: Vec<u32> = Vec::new();
    for y in 0..height {
        let mut row = format!("{} │", y);
        for x in 0..width {
            let index = x + y * width;
            if weights.contains_key(&index) {
                row.push_str(&format!(" {} │", letter(ordered.len())));
                ordered.push(index);
            } else {
                row.push_str("   │");
            }
        }
        lines.push(row);

        let mut divider = String::from(if y == height - 1 { "  └" } else { "  ├" });
        for x in 0..width {
            divider.push_str(match (y == height - 1, x == width - 1) {
                (false, false) => "───┼",
                (false, true) => "───┤",
                (true, false) => "───┴",
                (true, true) => "───┘",
            });
        }
        lines.push(divider);
    }

    for (i, &index) in ordered.iter().enumerate() {
        let y = index / width;
        let x = index - y * width;
        let listed = format
            .component_order()
            .iter()
            .map(|&c| format!("{}: {:.5}", c, weights[&index][c]))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("{}: at: [{}, {}], weights: [{}]", letter(i), x, y, listed));
    }
    lines
}
