pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Rounds to the nearest integer with halves going toward positive infinity,
/// so `round_half_up(-0.5) == 0.0` and `round_half_up(2.5) == 3.0`.
pub fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Collapses a value onto the nearest f32-representable number.
pub fn quantize_to_f32(v: f64) -> f64 {
    v as f32 as f64
}
