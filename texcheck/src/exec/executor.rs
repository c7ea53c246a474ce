use super::batch::{CallBatch, bin_calls};
use crate::sample::{SamplerState, TextureCall, expected};
use crate::texel::{Texel, TexelStore};
use thiserror::Error;
use tracing::debug;

/// Failures surfaced by in-process executors. External executors (real GPU
/// backends) are free to use their own error type; the bridge propagates it
/// untouched and never retries.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("device lost: {0}")]
    DeviceLost(String),
}

/// The execution side of a verification run, consumed as an opaque
/// capability: build whatever pipeline the batches describe, run it against
/// the texture and sampler, and read back the results.
///
/// The returned buffer holds one rgba32float quad (16 bytes, native-endian)
/// per call, batch-major: all of batch 0's calls in packed order, then batch
/// 1's, and so on. Awaiting `run` is the only suspension point in a
/// verification pass. Implementations must release whatever transient
/// resources a dispatch allocated before returning: diagnostic passes re-run
/// calls many times in sequence.
pub trait CallExecutor {
    type Error: std::error::Error;

    fn run(
        &mut self,
        texture: &TexelStore,
        sampler: &SamplerState,
        batches: &[CallBatch],
    ) -> impl Future<Output = Result<Vec<u8>, Self::Error>>;
}

/// Bins `calls` by shape, executes them in one pass, and returns one decoded
/// result per call in the original call order.
pub async fn run_calls<E: CallExecutor>(
    executor: &mut E,
    texture: &TexelStore,
    sampler: &SamplerState,
    calls: &[TextureCall],
) -> Result<Vec<Texel>, E::Error> {
    let batches = bin_calls(calls);
    debug!(calls = calls.len(), batches = batches.len(), "dispatching texture calls");
    let raw = executor.run(texture, sampler, &batches).await?;
    assert_eq!(raw.len(), calls.len() * 16, "executor readback has the wrong size");
    let floats: Vec<f32> = bytemuck::pod_collect_to_vec(&raw);

    let mut out = vec![Texel::default(); calls.len()];
    let mut quad = 0;
    for batch in &batches {
        for &call_index in &batch.call_indices {
            let q = &floats[quad * 4..quad * 4 + 4];
            out[call_index] = Texel::new(q[0] as f64, q[1] as f64, q[2] as f64, q[3] as f64);
            quad += 1;
        }
    }
    Ok(out)
}

/// Software executor: evaluates every call with the analytic model and packs
/// the results exactly like a GPU readback would arrive. Serves as the
/// baseline implementation for tests, and as a template for real backends.
#[derive(Debug, Default)]
pub struct ReferenceExecutor;

impl CallExecutor for ReferenceExecutor {
    type Error = ExecutorError;

    async fn run(
        &mut self,
        texture: &TexelStore,
        sampler: &SamplerState,
        batches: &[CallBatch],
    ) -> Result<Vec<u8>, ExecutorError> {
        let mut floats: Vec<f32> = Vec::new();
        for batch in batches {
            for call in batch.decode_calls() {
                let texel = expected(&call, texture, sampler);
                floats.extend_from_slice(&[texel.r as f32, texel.g as f32, texel.b as f32, texel.a as f32]);
            }
        }
        Ok(bytemuck::cast_slice(&floats).to_vec())
    }
}
