use super::*;
use crate::texel::{Texel, TexelStore};
use crate::util::*;
use arrayvec::ArrayVec;

/// One texel tap contributing to a filtered result: an (unmapped, possibly
/// out-of-range) integer coordinate and its interpolation weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexelTap {
    pub at: [i64; 3],
    pub weight: f64,
}

/// Expands an absolute texel-space position into filter taps.
///
/// Nearest produces exactly one tap with weight 1; linear produces the 2^N
/// corners of the enclosing hypercube, with weights that sum to 1. Taps are
/// not yet wrapped/clamped to the texture: addressing happens per axis
/// afterwards.
pub fn filter_taps(at: &[f64], filter: FilterMode) -> ArrayVec<TexelTap, 8> {
    let dims = at.len();
    assert!((1..=3).contains(&dims), "1 to 3 coordinates, got {}", dims);
    let mut taps = ArrayVec::new();
    match filter {
        FilterMode::Nearest => {
            let mut p = [0i64; 3];
            for (i, &v) in at.iter().enumerate() {
                // Hardware rounds in f32; mirror that before picking the texel.
                p[i] = round_half_up(quantize_to_f32(v)) as i64;
            }
            taps.push(TexelTap { at: p, weight: 1.0 });
        }
        FilterMode::Linear => {
            let mut p0 = [0i64; 3];
            let mut p0w = [0.0f64; 3];
            let mut p1w = [0.0f64; 3];
            for (i, &v) in at.iter().enumerate() {
                let floor = v.floor();
                p0[i] = floor as i64;
                p1w[i] = v - floor;
                p0w[i] = 1.0 - p1w[i];
            }
            for corner in 0..(1usize << dims) {
                let mut tap = TexelTap { at: p0, weight: 1.0 };
                for axis in 0..dims {
                    if corner & (1 << axis) != 0 {
                        tap.at[axis] += 1;
                        tap.weight *= p1w[axis];
                    } else {
                        tap.weight *= p0w[axis];
                    }
                }
                taps.push(tap);
            }
        }
    }
    taps
}

/// Maps an out-of-range coordinate into `[0, size)` on one axis.
pub fn resolve_address(mode: AddressMode, v: i64, size: u32) -> u32 {
    let size = size as i64;
    let mapped = match mode {
        AddressMode::ClampToEdge => v.clamp(0, size - 1),
        AddressMode::Repeat => v.rem_euclid(size),
        AddressMode::MirrorRepeat => {
            let n = v.div_euclid(size);
            let r = v - n * size;
            if n & 1 != 0 { size - r - 1 } else { r }
        }
    };
    mapped as u32
}

/// Computes the analytic result of one texture call.
///
/// Pure: reads only its arguments, no hidden state, no randomness. This is
/// the reference the executor's output is compared against, and it is kept
/// executor-free so it can be property-tested on its own.
pub fn expected(call: &TextureCall, texture: &TexelStore, sampler: &SamplerState) -> Texel {
    match call {
        TextureCall::Load { coords, array_index, mip_level } => {
            let level = mip_level.unwrap_or(0);
            let mut at = [0u32; 3];
            for (i, &v) in coords.iter().enumerate() {
                assert!(v >= 0, "load coordinate {} is negative: {}", i, v);
                at[i] = v as u32;
            }
            if coords.len() < 3 {
                at[2] = array_index.unwrap_or(0);
            } else {
                assert!(array_index.is_none(), "array_index conflicts with a 3-component load coordinate");
            }
            texture.color_at(at, level)
        }
        TextureCall::Sample { coords, offset, array_index, mip_level } => {
            let level = mip_level.unwrap_or(0);
            let size = texture.size(level);
            let dims = coords.len();
            if dims == 3 {
                assert!(array_index.is_none(), "array_index conflicts with a 3-component sample coordinate");
            }

            // Normalized to absolute texel space. Texel centers sit at
            // integer+0.5, so coordinate 0.5/size lands exactly on texel 0.
            let mut at = [0.0f64; 3];
            for i in 0..dims {
                at[i] = coords[i] as f64 * size[i] as f64 - 0.5;
            }
            // Whole-texel offset, before addressing.
            if let Some(offset) = offset {
                for i in 0..dims {
                    at[i] += offset[i] as f64;
                }
            }

            let order = texture.format().component_order();
            let modes = sampler.address_modes();
            // Channels the format does not carry keep their load defaults,
            // matching what unpack returns for a stored texel.
            let mut out = Texel::new(0.0, 0.0, 0.0, 1.0);
            for &c in order {
                out[c] = 0.0;
            }
            for tap in filter_taps(&at[..dims], sampler.filter) {
                let mut mapped = [0u32; 3];
                for i in 0..dims {
                    mapped[i] = resolve_address(modes[i], tap.at[i], size[i]);
                }
                if dims < 3 {
                    mapped[2] = array_index.unwrap_or(0);
                }
                let texel = texture.color_at(mapped, level);
                for &c in order {
                    out[c] += texel[c] * tap.weight;
                }
            }
            out
        }
    }
}
