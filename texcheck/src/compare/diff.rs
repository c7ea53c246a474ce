use crate::texel::ComponentEncoding;

/// Mismatch thresholds. Both metrics must be exceeded before a component
/// counts as wrong: ULP distance alone trips on coarse formats, relative
/// difference alone trips near zero, and real sampler divergence fails both.
///
/// The defaults absorb the filtering/rounding spread observed across GPU
/// vendors; tighten or loosen them per platform as needed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub max_ulp: u64,
    pub max_rel: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self { max_ulp: 3, max_rel: 0.03 }
    }
}

/// Per-component comparison record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentDiff {
    pub got: f64,
    pub expected: f64,
    pub abs_diff: f64,
    pub rel_diff: f64,
    pub ulp_diff: u64,
}

/// Compares one component pair through the texture format's encoding, so ULP
/// distance is measured on the scale the values are actually stored at.
pub fn component_diff(encoding: ComponentEncoding, got: f64, expected: f64) -> ComponentDiff {
    let abs_diff = (got - expected).abs();
    // NaN when both values are 0; is_mismatch treats that as a match.
    let rel_diff = abs_diff / got.abs().max(expected.abs());
    let ulp_diff = encoding.ulps_from_zero(got).abs_diff(encoding.ulps_from_zero(expected));
    ComponentDiff { got, expected, abs_diff, rel_diff, ulp_diff }
}

impl ComponentDiff {
    pub fn is_mismatch(&self, tolerance: &Tolerance) -> bool {
        self.ulp_diff > tolerance.max_ulp && self.rel_diff > tolerance.max_rel
    }
}
