use crate::util::*;
use bytemuck::{Pod, Zeroable};
use std::fmt;

/// One color channel. Formats list their channels in a fixed order that every
/// consumer (store, model, comparator, diagnostics) shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    R,
    G,
    B,
    A,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::R => write!(f, "R"),
            Component::G => write!(f, "G"),
            Component::B => write!(f, "B"),
            Component::A => write!(f, "A"),
        }
    }
}

/// A decoded texel: one f64 per channel, addressed by `Component`.
///
/// Channels a format does not carry are left at their load defaults
/// (0 for color, 1 for alpha) and are ignored by consumers, which only
/// iterate the format's component order.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Zeroable, Pod)]
pub struct Texel {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Texel {
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// All four channels set to `v`.
    pub fn splat(v: f64) -> Self {
        Self { r: v, g: v, b: v, a: v }
    }
}

impl std::ops::Index<Component> for Texel {
    type Output = f64;
    fn index(&self, c: Component) -> &f64 {
        match c {
            Component::R => &self.r,
            Component::G => &self.g,
            Component::B => &self.b,
            Component::A => &self.a,
        }
    }
}

impl std::ops::IndexMut<Component> for Texel {
    fn index_mut(&mut self, c: Component) -> &mut f64 {
        match c {
            Component::R => &mut self.r,
            Component::G => &mut self.g,
            Component::B => &mut self.b,
            Component::A => &mut self.a,
        }
    }
}

/// Bit-level encoding shared by all components of a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentEncoding {
    Unorm8,
    Snorm8,
    Float32,
}

impl ComponentEncoding {
    pub fn bytes(self) -> usize {
        match self {
            ComponentEncoding::Unorm8 | ComponentEncoding::Snorm8 => 1,
            ComponentEncoding::Float32 => 4,
        }
    }

    /// Value to representation bits, clamped to the encodable range.
    pub fn encode(self, v: f64) -> u32 {
        match self {
            ComponentEncoding::Unorm8 => round_half_up(v.clamp(0.0, 1.0) * 255.0) as u32,
            ComponentEncoding::Snorm8 => {
                let code = round_half_up(v.clamp(-1.0, 1.0) * 127.0) as i32;
                (code as i8 as u8) as u32
            }
            ComponentEncoding::Float32 => (v as f32).to_bits(),
        }
    }

    /// Representation bits back to a value.
    pub fn decode(self, bits: u32) -> f64 {
        match self {
            ComponentEncoding::Unorm8 => (bits & 0xff) as f64 / 255.0,
            ComponentEncoding::Snorm8 => ((bits as u8 as i8) as f64 / 127.0).max(-1.0),
            ComponentEncoding::Float32 => f32::from_bits(bits) as f64,
        }
    }

    /// Maps a value onto a signed "ULPs from zero" scale: a monotone integer
    /// scale where adjacent representable values are one step apart.
    ///
    /// Unlike `encode` this does not clamp, so values beyond the encodable
    /// range keep growing their distance instead of saturating.
    pub fn ulps_from_zero(self, v: f64) -> i64 {
        match self {
            ComponentEncoding::Unorm8 => round_half_up(v * 255.0) as i64,
            ComponentEncoding::Snorm8 => round_half_up(v * 127.0) as i64,
            ComponentEncoding::Float32 => {
                let bits = (v as f32).to_bits();
                let magnitude = (bits & 0x7fff_ffff) as i64;
                if bits & 0x8000_0000 != 0 { -magnitude } else { magnitude }
            }
        }
    }

    /// Inclusive value range used when synthesizing random texel content.
    /// Unbounded float formats are capped to keep weights well-conditioned.
    pub fn sample_range(self) -> (f64, f64) {
        match self {
            ComponentEncoding::Unorm8 => (0.0, 1.0),
            ComponentEncoding::Snorm8 => (-1.0, 1.0),
            ComponentEncoding::Float32 => (-1000.0, 1000.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexelFormat {
    R8Unorm,
    Rgba8Unorm,
    Rgba8Snorm,
    R32Float,
    Rgba32Float,
}

const R: &[Component] = &[Component::R];
const RGBA: &[Component] = &[Component::R, Component::G, Component::B, Component::A];

impl TexelFormat {
    pub fn component_order(self) -> &'static [Component] {
        match self {
            TexelFormat::R8Unorm | TexelFormat::R32Float => R,
            TexelFormat::Rgba8Unorm | TexelFormat::Rgba8Snorm | TexelFormat::Rgba32Float => RGBA,
        }
    }

    pub fn encoding(self) -> ComponentEncoding {
        match self {
            TexelFormat::R8Unorm | TexelFormat::Rgba8Unorm => ComponentEncoding::Unorm8,
            TexelFormat::Rgba8Snorm => ComponentEncoding::Snorm8,
            TexelFormat::R32Float | TexelFormat::Rgba32Float => ComponentEncoding::Float32,
        }
    }

    pub fn bytes_per_texel(self) -> usize {
        self.component_order().len() * self.encoding().bytes()
    }

    /// Encodes `texel` into `out`, component by component, little-endian.
    pub fn pack_into(self, texel: &Texel, out: &mut [u8]) {
        assert_eq!(out.len(), self.bytes_per_texel(), "packed texel size mismatch");
        let encoding = self.encoding();
        let size = encoding.bytes();
        for (i, &c) in self.component_order().iter().enumerate() {
            let bits = encoding.encode(texel[c]);
            out[i * size..(i + 1) * size].copy_from_slice(&bits.to_le_bytes()[..size]);
        }
    }

    /// Decodes one packed texel. Channels absent from the format read as
    /// 0 (color) and 1 (alpha).
    pub fn unpack(self, bytes: &[u8]) -> Texel {
        assert_eq!(bytes.len(), self.bytes_per_texel(), "packed texel size mismatch");
        let encoding = self.encoding();
        let size = encoding.bytes();
        let mut out = Texel::new(0.0, 0.0, 0.0, 1.0);
        for (i, &c) in self.component_order().iter().enumerate() {
            let mut word = [0u8; 4];
            word[..size].copy_from_slice(&bytes[i * size..(i + 1) * size]);
            out[c] = encoding.decode(u32::from_le_bytes(word));
        }
        out
    }

    /// Round-trips arbitrary component values through the format so that
    /// synthesized content and values read back from storage sit on the same
    /// quantization grid.
    pub fn quantize(self, texel: &Texel) -> Texel {
        let encoding = self.encoding();
        let mut out = Texel::new(0.0, 0.0, 0.0, 1.0);
        for &c in self.component_order() {
            out[c] = encoding.decode(encoding.encode(texel[c]));
        }
        out
    }
}

impl fmt::Display for TexelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TexelFormat::R8Unorm => "r8unorm",
            TexelFormat::Rgba8Unorm => "rgba8unorm",
            TexelFormat::Rgba8Snorm => "rgba8snorm",
            TexelFormat::R32Float => "r32float",
            TexelFormat::Rgba32Float => "rgba32float",
        };
        write!(f, "{}", name)
    }
}
