use crate::sample::TextureCall;
use crate::sample::call::vec_expr;
use arrayvec::ArrayVec;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinKind {
    Sample,
    Load,
}

/// Structural signature of a call: which builtin, how many coordinate
/// components, which optional arguments are present, and the literal offset.
///
/// Offsets are compile-time constants in shading languages, so they are part
/// of the shape (baked per batch) instead of the per-call data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallShape {
    pub builtin: BuiltinKind,
    pub dims: u8,
    pub offset: Option<ArrayVec<i32, 3>>,
    pub has_array_index: bool,
    pub has_mip_level: bool,
}

impl CallShape {
    pub fn of(call: &TextureCall) -> Self {
        match call {
            TextureCall::Sample { coords, offset, array_index, mip_level } => Self {
                builtin: BuiltinKind::Sample,
                dims: coords.len() as u8,
                offset: offset.clone(),
                has_array_index: array_index.is_some(),
                has_mip_level: mip_level.is_some(),
            },
            TextureCall::Load { coords, array_index, mip_level } => Self {
                builtin: BuiltinKind::Load,
                dims: coords.len() as u8,
                offset: None,
                has_array_index: array_index.is_some(),
                has_mip_level: mip_level.is_some(),
            },
        }
    }

    /// Number of u32 words one call of this shape occupies in the packed
    /// argument buffer. Every field is padded to 16 bytes, matching the
    /// alignment generated argument structs use on the execution side.
    pub fn words_per_call(&self) -> usize {
        let mut fields = 1; // coords
        if self.has_array_index {
            fields += 1;
        }
        if self.has_mip_level {
            fields += 1;
        }
        fields * 4
    }
}

impl fmt::Display for CallShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, coord_type) = match self.builtin {
            BuiltinKind::Sample => ("sample", "f32"),
            BuiltinKind::Load => ("load", "i32"),
        };
        write!(f, "{}(coords: ", name)?;
        match self.dims {
            1 => write!(f, "{}", coord_type)?,
            n => write!(f, "vec{}<{}>", n, coord_type)?,
        }
        if let Some(offset) = &self.offset {
            write!(f, ", offset: {}", vec_expr(offset))?;
        }
        if self.has_array_index {
            write!(f, ", array_index: u32")?;
        }
        if self.has_mip_level {
            write!(f, ", mip_level: u32")?;
        }
        write!(f, ")")
    }
}

/// One homogeneous group of calls, executable as a single dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct CallBatch {
    pub shape: CallShape,
    /// Indices into the original call list, in the order their data was packed.
    pub call_indices: Vec<usize>,
    /// Packed per-call arguments, `words_per_call` words each.
    pub data: Vec<u32>,
}

impl CallBatch {
    fn new(shape: CallShape) -> Self {
        Self { shape, call_indices: Vec::new(), data: Vec::new() }
    }

    fn push(&mut self, index: usize, call: &TextureCall) {
        self.call_indices.push(index);
        let field_start = self.data.len();
        match call {
            TextureCall::Sample { coords, .. } => {
                self.data.extend(coords.iter().map(|c| c.to_bits()));
            }
            TextureCall::Load { coords, .. } => {
                self.data.extend(coords.iter().map(|&c| c as u32));
            }
        }
        self.pad_field(field_start);
        if let Some(index) = call.array_index() {
            let field_start = self.data.len();
            self.data.push(index);
            self.pad_field(field_start);
        }
        if let Some(level) = call.mip_level() {
            let field_start = self.data.len();
            self.data.push(level);
            self.pad_field(field_start);
        }
    }

    fn pad_field(&mut self, field_start: usize) {
        while self.data.len() - field_start < 4 {
            self.data.push(0);
        }
    }

    /// Reconstructs the batch's calls from the packed data, in packed order.
    /// The inverse of packing; executors consume this, and tests use it to
    /// pin the buffer layout.
    pub fn decode_calls(&self) -> Vec<TextureCall> {
        let words = self.shape.words_per_call();
        assert_eq!(self.data.len(), words * self.call_indices.len(), "packed data length mismatch");
        self.data
            .chunks_exact(words)
            .map(|chunk| {
                let dims = self.shape.dims as usize;
                let mut fields = chunk.chunks_exact(4);
                let coord_words = &fields.next().expect("coords field")[..dims];
                let array_index = self.shape.has_array_index.then(|| fields.next().expect("array_index field")[0]);
                let mip_level = self.shape.has_mip_level.then(|| fields.next().expect("mip_level field")[0]);
                match self.shape.builtin {
                    BuiltinKind::Sample => TextureCall::Sample {
                        coords: coord_words.iter().map(|&w| f32::from_bits(w)).collect(),
                        offset: self.shape.offset.clone(),
                        array_index,
                        mip_level,
                    },
                    BuiltinKind::Load => TextureCall::Load {
                        coords: coord_words.iter().map(|&w| w as i32).collect(),
                        array_index,
                        mip_level,
                    },
                }
            })
            .collect()
    }
}

/// Groups calls into homogeneous-shape batches, first-seen order, preserving
/// each call's original index for order restoration after execution.
pub fn bin_calls(calls: &[TextureCall]) -> Vec<CallBatch> {
    let mut by_shape: HashMap<CallShape, usize> = HashMap::new();
    let mut batches: Vec<CallBatch> = Vec::new();
    for (index, call) in calls.iter().enumerate() {
        let shape = CallShape::of(call);
        let batch_index = *by_shape.entry(shape.clone()).or_insert_with(|| {
            batches.push(CallBatch::new(shape));
            batches.len() - 1
        });
        batches[batch_index].push(index, call);
    }
    batches
}
