use super::*;
use crate::util::*;

const MAX_MIP_LEVELS: usize = 16;

/// Geometry of one mip level inside the backing buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub offset: usize,
}

/// An immutable, format-aware grid of texels.
///
/// `depth` doubles as the array layer count; mip levels (optional, see
/// [`TexelStore::with_mip_chain`]) halve width/height while keeping the layer
/// count. Constructed once per test case and then only read, so the store is
/// freely shared across the analytic and executor paths.
pub struct TexelStore {
    format: TexelFormat,
    width: u32,
    height: u32,
    depth: u32,
    levels: Vec<MipLevel>,
    texels: Vec<u8>,
}

impl TexelStore {
    pub fn from_bytes(format: TexelFormat, width: u32, height: u32, depth: u32, texels: Vec<u8>) -> Self {
        assert!(width > 0 && height > 0 && depth > 0);
        let expected_len = (width * height * depth) as usize * format.bytes_per_texel();
        assert_eq!(texels.len(), expected_len, "texel data length mismatch");
        Self {
            format,
            width,
            height,
            depth,
            levels: vec![MipLevel { width, height, offset: 0 }],
            texels,
        }
    }

    /// Builds a store by evaluating `generator` at every `[x, y, z]`. Each
    /// produced texel is quantized through the format's packed representation,
    /// so reads return exactly what storage can hold.
    pub fn from_fn<F>(format: TexelFormat, width: u32, height: u32, depth: u32, generator: F) -> Self
    where
        F: Fn([u32; 3]) -> Texel,
    {
        assert!(width > 0 && height > 0 && depth > 0);
        let bpt = format.bytes_per_texel();
        let mut texels = vec![0u8; (width * height * depth) as usize * bpt];
        let mut cursor = 0;
        for z in 0..depth {
            for y in 0..height {
                for x in 0..width {
                    format.pack_into(&generator([x, y, z]), &mut texels[cursor..cursor + bpt]);
                    cursor += bpt;
                }
            }
        }
        Self::from_bytes(format, width, height, depth, texels)
    }

    /// Deterministic pseudo-random content: every component is hashed from its
    /// texel coordinate, spread over the format's sample range, and quantized.
    pub fn random(format: TexelFormat, width: u32, height: u32, depth: u32) -> Self {
        let (min, max) = format.encoding().sample_range();
        Self::from_fn(format, width, height, depth, |[x, y, z]| {
            let mut texel = Texel::new(0.0, 0.0, 0.0, 1.0);
            for &c in format.component_order() {
                let normalized = hash_unit(&[x, y, z, c as u32]);
                texel[c] = lerp(min, max, normalized);
            }
            texel
        })
    }

    /// Appends a box-filtered mip pyramid below the base level, halving width
    /// and height per level down to 1x1. Requires power-of-two extents.
    pub fn with_mip_chain(mut self) -> Self {
        assert!(self.width.is_power_of_two() && self.height.is_power_of_two());
        assert_eq!(self.levels.len(), 1, "mip chain already built");

        let bpt = self.format.bytes_per_texel();
        while self.levels.len() < MAX_MIP_LEVELS {
            let src = *self.levels.last().unwrap();
            if src.width == 1 && src.height == 1 {
                break;
            }
            let dst = MipLevel {
                width: (src.width / 2).max(1),
                height: (src.height / 2).max(1),
                offset: self.texels.len(),
            };

            let mut filtered = vec![0u8; (dst.width * dst.height * self.depth) as usize * bpt];
            let mut cursor = 0;
            for z in 0..self.depth {
                for y in 0..dst.height {
                    for x in 0..dst.width {
                        let mut sum = Texel::default();
                        let mut taps = 0.0;
                        for dy in 0..2 {
                            for dx in 0..2 {
                                let sx = (x * 2 + dx).min(src.width - 1);
                                let sy = (y * 2 + dy).min(src.height - 1);
                                let t = self.read_level(&src, [sx, sy, z]);
                                for &c in self.format.component_order() {
                                    sum[c] += t[c];
                                }
                                taps += 1.0;
                            }
                        }
                        let mut avg = Texel::new(0.0, 0.0, 0.0, 1.0);
                        for &c in self.format.component_order() {
                            avg[c] = sum[c] / taps;
                        }
                        self.format.pack_into(&avg, &mut filtered[cursor..cursor + bpt]);
                        cursor += bpt;
                    }
                }
            }
            self.texels.extend_from_slice(&filtered);
            self.levels.push(dst);
        }
        self
    }

    pub fn format(&self) -> TexelFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn level_count(&self) -> u32 {
        self.levels.len() as u32
    }

    pub fn level(&self, level: u32) -> MipLevel {
        assert!((level as usize) < self.levels.len(), "mip level out of range: {} >= {}", level, self.levels.len());
        self.levels[level as usize]
    }

    /// `[width, height, depth]` of the given mip level.
    pub fn size(&self, level: u32) -> [u32; 3] {
        let l = self.level(level);
        [l.width, l.height, self.depth]
    }

    /// Decoded component values at an exact integer texel coordinate.
    /// Out-of-range coordinates are a caller bug: the sampling model wraps or
    /// clamps before it reads.
    pub fn color_at(&self, at: [u32; 3], level: u32) -> Texel {
        let l = self.level(level);
        let [x, y, z] = at;
        assert!(x < l.width, "x out of bounds: {} >= {}", x, l.width);
        assert!(y < l.height, "y out of bounds: {} >= {}", y, l.height);
        assert!(z < self.depth, "z out of bounds: {} >= {}", z, self.depth);
        self.read_level(&l, at)
    }

    pub fn quantize(&self, texel: &Texel) -> Texel {
        self.format.quantize(texel)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.texels
    }

    fn read_level(&self, level: &MipLevel, [x, y, z]: [u32; 3]) -> Texel {
        let bpt = self.format.bytes_per_texel();
        let idx = ((z * level.height + y) * level.width + x) as usize;
        let offset = level.offset + idx * bpt;
        self.format.unpack(&self.texels[offset..offset + bpt])
    }
}
