use arrayvec::ArrayVec;
use std::fmt;

/// Policy for mapping an out-of-range texel coordinate back into the valid
/// range of one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressMode {
    #[default]
    ClampToEdge,
    Repeat,
    MirrorRepeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    Nearest,
    Linear,
}

/// Immutable sampler configuration, shared across a batch of calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SamplerState {
    pub address_mode_u: AddressMode,
    pub address_mode_v: AddressMode,
    pub address_mode_w: AddressMode,
    pub filter: FilterMode,
}

impl SamplerState {
    pub fn address_modes(&self) -> [AddressMode; 3] {
        [self.address_mode_u, self.address_mode_v, self.address_mode_w]
    }
}

/// Texel offsets mirror shading-language rules: compile-time constants in
/// [-8, 7] per axis.
pub const OFFSET_MIN: i32 = -8;
pub const OFFSET_MAX: i32 = 7;

/// One texture operation to verify. A variant per builtin kind, each carrying
/// only the fields that builtin accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureCall {
    /// Filtered sampling at normalized coordinates.
    Sample {
        coords: ArrayVec<f32, 3>,
        offset: Option<ArrayVec<i32, 3>>,
        array_index: Option<u32>,
        mip_level: Option<u32>,
    },
    /// Direct unfiltered read at an integer texel coordinate.
    Load {
        coords: ArrayVec<i32, 3>,
        array_index: Option<u32>,
        mip_level: Option<u32>,
    },
}

impl TextureCall {
    pub fn sample_1d(u: f32) -> Self {
        Self::sample(&[u])
    }

    pub fn sample_2d(u: f32, v: f32) -> Self {
        Self::sample(&[u, v])
    }

    pub fn sample_3d(u: f32, v: f32, w: f32) -> Self {
        Self::sample(&[u, v, w])
    }

    pub fn sample(coords: &[f32]) -> Self {
        assert!((1..=3).contains(&coords.len()), "sample takes 1 to 3 coordinates");
        TextureCall::Sample {
            coords: coords.iter().copied().collect(),
            offset: None,
            array_index: None,
            mip_level: None,
        }
    }

    pub fn load_2d(x: i32, y: i32) -> Self {
        Self::load(&[x, y])
    }

    pub fn load(coords: &[i32]) -> Self {
        assert!((1..=3).contains(&coords.len()), "load takes 1 to 3 coordinates");
        TextureCall::Load {
            coords: coords.iter().copied().collect(),
            array_index: None,
            mip_level: None,
        }
    }

    /// Attaches a whole-texel offset, one component per coordinate axis.
    pub fn with_offset(mut self, offset_values: &[i32]) -> Self {
        match &mut self {
            TextureCall::Sample { coords, offset, .. } => {
                assert_eq!(offset_values.len(), coords.len(), "offset arity must match coordinate arity");
                for &v in offset_values {
                    assert!(
                        (OFFSET_MIN..=OFFSET_MAX).contains(&v),
                        "offset component {} outside [{}, {}]",
                        v,
                        OFFSET_MIN,
                        OFFSET_MAX
                    );
                }
                *offset = Some(offset_values.iter().copied().collect());
            }
            TextureCall::Load { .. } => panic!("offsets only apply to sample calls"),
        }
        self
    }

    pub fn with_array_index(mut self, index: u32) -> Self {
        match &mut self {
            TextureCall::Sample { array_index, .. } | TextureCall::Load { array_index, .. } => {
                *array_index = Some(index);
            }
        }
        self
    }

    pub fn with_mip_level(mut self, level: u32) -> Self {
        match &mut self {
            TextureCall::Sample { mip_level, .. } | TextureCall::Load { mip_level, .. } => {
                *mip_level = Some(level);
            }
        }
        self
    }

    /// Coordinate arity (1, 2 or 3).
    pub fn dims(&self) -> usize {
        match self {
            TextureCall::Sample { coords, .. } => coords.len(),
            TextureCall::Load { coords, .. } => coords.len(),
        }
    }

    pub fn array_index(&self) -> Option<u32> {
        match self {
            TextureCall::Sample { array_index, .. } | TextureCall::Load { array_index, .. } => *array_index,
        }
    }

    pub fn mip_level(&self) -> Option<u32> {
        match self {
            TextureCall::Sample { mip_level, .. } | TextureCall::Load { mip_level, .. } => *mip_level,
        }
    }
}

pub(crate) fn vec_expr<T: fmt::Display>(values: &[T]) -> String {
    match values.len() {
        1 => format!("{}", values[0]),
        n => {
            let joined = values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ");
            format!("vec{}({})", n, joined)
        }
    }
}

impl fmt::Display for TextureCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureCall::Sample { coords, offset, array_index, mip_level } => {
                write!(f, "sample(coords: {}", vec_expr(coords))?;
                if let Some(offset) = offset {
                    write!(f, ", offset: {}", vec_expr(offset))?;
                }
                if let Some(index) = array_index {
                    write!(f, ", array_index: {}", index)?;
                }
                if let Some(level) = mip_level {
                    write!(f, ", mip_level: {}", level)?;
                }
                write!(f, ")")
            }
            TextureCall::Load { coords, array_index, mip_level } => {
                write!(f, "load(coords: {}", vec_expr(coords))?;
                if let Some(index) = array_index {
                    write!(f, ", array_index: {}", index)?;
                }
                if let Some(level) = mip_level {
                    write!(f, ", mip_level: {}", level)?;
                }
                write!(f, ")")
            }
        }
    }
}
