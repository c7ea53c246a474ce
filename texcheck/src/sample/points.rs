use crate::util::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplePointMethod {
    /// Hash-scattered texel centers.
    TexelCentre,
    /// A spiral walking outward from the texture center, crossing texel
    /// boundaries and the texture edge.
    Spiral,
}

#[derive(Debug, Clone, Copy)]
pub struct SamplePointArgs {
    pub method: SamplePointMethod,
    pub texture_width: u32,
    pub texture_height: u32,
    /// Spiral only: final radius in normalized units.
    pub radius: f64,
    /// Spiral only: number of turns.
    pub loops: f64,
}

impl Default for SamplePointArgs {
    fn default() -> Self {
        Self {
            method: SamplePointMethod::TexelCentre,
            texture_width: 8,
            texture_height: 8,
            radius: 1.5,
            loops: 2.0,
        }
    }
}

/// Coordinates that land between these per-texel subdivisions hit rounding
/// disagreements between samplers, so every generated point snaps to the grid.
const SUBDIVISIONS_PER_TEXEL: u32 = 4;

/// Generates `n` normalized 2-D coordinates to sample a texture at.
///
/// With `nearest` set, points that sit exactly on a texel boundary are nudged
/// off it: on the boundary either neighbor is a legal nearest pick, so the
/// generator (not the sampling model) disambiguates.
pub fn generate_sample_points(n: usize, nearest: bool, args: &SamplePointArgs) -> Vec<[f32; 2]> {
    let mut out = Vec::with_capacity(n);
    match args.method {
        SamplePointMethod::TexelCentre => {
            for i in 0..n {
                let r = hash_u32(&[i as u32]);
                let x = lerp(0.0, (args.texture_width - 1) as f64, (r & 0xffff) as f64 / 0xffff as f64).floor() + 0.5;
                let y = lerp(0.0, (args.texture_height - 1) as f64, (r >> 16) as f64 / 0xffff as f64).floor() + 0.5;
                out.push([x / args.texture_width as f64, y / args.texture_height as f64]);
            }
        }
        SamplePointMethod::Spiral => {
            for i in 0..n {
                let f = i as f64 / (n.max(2) - 1) as f64;
                let r = args.radius * f;
                let a = args.loops * 2.0 * std::f64::consts::PI * f;
                out.push([0.5 + r * a.cos(), 0.5 + r * a.sin()]);
            }
        }
    }

    let q = [
        (args.texture_width * SUBDIVISIONS_PER_TEXEL) as f64,
        (args.texture_height * SUBDIVISIONS_PER_TEXEL) as f64,
    ];
    out.iter()
        .map(|c| {
            let mut point = [0.0f32; 2];
            for i in 0..2 {
                let snapped = (c[i] * q[i]).floor();
                let snapped = if nearest && snapped as i64 % SUBDIVISIONS_PER_TEXEL as i64 == 0 {
                    snapped + 1.0
                } else {
                    snapped
                };
                point[i] = (snapped / q[i]) as f32;
            }
            point
        })
        .collect()
}
