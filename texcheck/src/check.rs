use crate::compare::{ComponentDiff, Tolerance, component_diff};
use crate::diagnose::{TexelProbe, identify_sample_points, layout_two_columns};
use crate::exec::{CallExecutor, run_calls};
use crate::sample::{SamplerState, TextureCall, expected};
use crate::texel::{Component, Texel, TexelStore};
use rayon::prelude::*;
use std::convert::Infallible;
use std::fmt;
use tracing::debug;

/// One failing component of one call, with everything needed to reason about
/// it offline: the numeric diff and the expected-vs-got sample point maps.
#[derive(Debug)]
pub struct CallFailure {
    pub call_index: usize,
    pub call: String,
    pub component: Component,
    pub diff: ComponentDiff,
    /// Two-column texel map, absent for calls addressing a non-base mip
    /// level or array layer (probe textures are single-subresource).
    pub sample_points: Option<String>,
}

impl fmt::Display for CallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "component was not as expected:")?;
        writeln!(f, "      call: {}", self.call)?;
        writeln!(f, " component: {}", self.component)?;
        writeln!(f, "       got: {}", self.diff.got)?;
        writeln!(f, "  expected: {}", self.diff.expected)?;
        writeln!(f, "  abs diff: {:.4}", self.diff.abs_diff)?;
        writeln!(f, "  rel diff: {:.2}%", self.diff.rel_diff * 100.0)?;
        writeln!(f, "  ulp diff: {}", self.diff.ulp_diff)?;
        match &self.sample_points {
            Some(map) => {
                writeln!(f, "  sample points:")?;
                write!(f, "{}", map)
            }
            None => write!(f, "  sample points: not derived (call addresses a non-base subresource)"),
        }
    }
}

/// Every mismatch found in one verification pass. Recorded, never thrown:
/// a run describes all of its failures in a single report.
#[derive(Debug)]
pub struct MismatchReport {
    pub failures: Vec<CallFailure>,
}

impl fmt::Display for MismatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
                writeln!(f)?;
            }
            write!(f, "{}", failure)?;
        }
        Ok(())
    }
}

/// Probes the analytic model.
struct ExpectedProbe<'a> {
    call: &'a TextureCall,
    sampler: &'a SamplerState,
}

impl TexelProbe for ExpectedProbe<'_> {
    type Error = Infallible;

    async fn probe(&mut self, texels: TexelStore) -> Result<Texel, Infallible> {
        Ok(expected(self.call, &texels, self.sampler))
    }
}

/// Probes the executor by re-running the call as a one-element batch.
struct ExecutorProbe<'a, E> {
    executor: &'a mut E,
    call: &'a TextureCall,
    sampler: &'a SamplerState,
}

impl<E: CallExecutor> TexelProbe for ExecutorProbe<'_, E> {
    type Error = E::Error;

    async fn probe(&mut self, texels: TexelStore) -> Result<Texel, E::Error> {
        let results = run_calls(self.executor, &texels, self.sampler, std::slice::from_ref(self.call)).await?;
        Ok(results[0])
    }
}

/// Runs every call through the executor, computes the same calls analytically,
/// and compares component by component.
///
/// Returns `Ok(None)` when everything matched, `Ok(Some(report))` on model
/// divergence, and `Err` only for executor failures (which are propagated,
/// not retried). Sample-point localization is derived lazily, only for calls
/// that already failed the numeric comparison.
pub async fn check_texture_calls<E: CallExecutor>(
    executor: &mut E,
    texture: &TexelStore,
    sampler: &SamplerState,
    calls: &[TextureCall],
    tolerance: &Tolerance,
) -> Result<Option<MismatchReport>, E::Error> {
    let got = run_calls(executor, texture, sampler, calls).await?;
    let want: Vec<Texel> = calls.par_iter().map(|call| expected(call, texture, sampler)).collect();

    let encoding = texture.format().encoding();
    let mut failures = Vec::new();
    for (call_index, call) in calls.iter().enumerate() {
        for &component in texture.format().component_order() {
            let diff = component_diff(encoding, got[call_index][component], want[call_index][component]);
            if !diff.is_mismatch(tolerance) {
                continue;
            }
            debug!(call = call_index, component = %component, "mismatch, locating sample points");

            let base_subresource = call.mip_level().unwrap_or(0) == 0 && call.array_index().unwrap_or(0) == 0;
            let sample_points = if base_subresource {
                let mut expected_lines = vec!["expected:".to_string()];
                let mut probe = ExpectedProbe { call, sampler };
                expected_lines.extend(
                    match identify_sample_points(texture.format(), texture.width(), texture.height(), &mut probe)
                        .await
                    {
                        Ok(lines) => lines,
                        Err(e) => match e {},
                    },
                );

                let mut got_lines = vec!["got:".to_string()];
                let mut probe = ExecutorProbe { executor: &mut *executor, call, sampler };
                got_lines.extend(
                    identify_sample_points(texture.format(), texture.width(), texture.height(), &mut probe)
                        .await?,
                );

                Some(layout_two_columns(&expected_lines, &got_lines).join("\n"))
            } else {
                None
            };

            failures.push(CallFailure {
                call_index,
                call: call.to_string(),
                component,
                diff,
                sample_points,
            });
        }
    }

    Ok(if failures.is_empty() { None } else { Some(MismatchReport { failures }) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{CallBatch, ExecutorError, ReferenceExecutor};
    use crate::sample::{FilterMode, generate_sample_points, SamplePointArgs, SamplePointMethod};
    use crate::texel::TexelFormat;

    /// Wraps the reference executor and scales every result, guaranteeing
    /// mismatches beyond any sane tolerance.
    struct SkewedExecutor {
        inner: ReferenceExecutor,
        scale: f32,
    }

    impl CallExecutor for SkewedExecutor {
        type Error = ExecutorError;

        async fn run(
            &mut self,
            texture: &TexelStore,
            sampler: &SamplerState,
            batches: &[CallBatch],
        ) -> Result<Vec<u8>, ExecutorError> {
            let raw = self.inner.run(texture, sampler, batches).await?;
            let mut floats: Vec<f32> = bytemuck::pod_collect_to_vec(&raw);
            for v in &mut floats {
                *v *= self.scale;
            }
            Ok(bytemuck::cast_slice(&floats).to_vec())
        }
    }

    /// Fails every dispatch, standing in for a lost device.
    struct BrokenExecutor;

    impl CallExecutor for BrokenExecutor {
        type Error = ExecutorError;

        async fn run(
            &mut self,
            _texture: &TexelStore,
            _sampler: &SamplerState,
            _batches: &[CallBatch],
        ) -> Result<Vec<u8>, ExecutorError> {
            Err(ExecutorError::DeviceLost("simulated".to_string()))
        }
    }

    fn spiral_calls(n: usize) -> Vec<TextureCall> {
        let args = SamplePointArgs { method: SamplePointMethod::Spiral, ..Default::default() };
        generate_sample_points(n, false, &args)
            .into_iter()
            .map(|[x, y]| TextureCall::sample_2d(x, y))
            .collect()
    }

    #[test]
    fn test_reference_executor_verifies_clean() {
        let texture = TexelStore::random(TexelFormat::Rgba8Unorm, 8, 8, 1);
        let sampler = SamplerState { filter: FilterMode::Linear, ..Default::default() };
        let calls = spiral_calls(32);
        let mut executor = ReferenceExecutor;
        let report = pollster::block_on(check_texture_calls(
            &mut executor,
            &texture,
            &sampler,
            &calls,
            &Tolerance::default(),
        ))
        .unwrap();
        assert!(report.is_none(), "unexpected mismatches:\n{}", report.unwrap());
    }

    #[test]
    fn test_skewed_executor_is_reported() {
        let texture = TexelStore::from_fn(TexelFormat::Rgba8Unorm, 8, 8, 1, |[x, y, _]| {
            Texel::new(0.8, 0.6, (x as f64) / 16.0, (y as f64) / 16.0 + 0.5)
        });
        let sampler = SamplerState::default();
        let calls = vec![TextureCall::sample_2d(2.5 / 8.0, 2.5 / 8.0)];
        let mut executor = SkewedExecutor { inner: ReferenceExecutor, scale: 0.5 };
        let report = pollster::block_on(check_texture_calls(
            &mut executor,
            &texture,
            &sampler,
            &calls,
            &Tolerance::default(),
        ))
        .unwrap()
        .expect("the skewed executor must fail verification");
        let text = report.to_string();
        assert!(text.contains("component was not as expected:"), "{}", text);
        assert!(text.contains("call: sample(coords: vec2(0.3125, 0.3125))"), "{}", text);
        assert!(text.contains("expected:"), "{}", text);
        assert!(text.contains("got:"), "{}", text);
        assert!(text.contains(" | "), "{}", text);
        assert!(text.contains("weights:"), "{}", text);
    }

    #[test]
    fn test_executor_failure_propagates() {
        let texture = TexelStore::random(TexelFormat::Rgba8Unorm, 4, 4, 1);
        let sampler = SamplerState::default();
        let calls = vec![TextureCall::sample_2d(0.5, 0.5)];
        let mut executor = BrokenExecutor;
        let err = pollster::block_on(check_texture_calls(
            &mut executor,
            &texture,
            &sampler,
            &calls,
            &Tolerance::default(),
        ))
        .unwrap_err();
        assert!(matches!(err, ExecutorError::DeviceLost(_)));
    }

    #[test]
    fn test_all_failures_are_accumulated() {
        let texture = TexelStore::random(TexelFormat::R32Float, 4, 4, 1);
        let sampler = SamplerState::default();
        let calls = vec![
            TextureCall::sample_2d(0.5 / 4.0, 0.5 / 4.0),
            TextureCall::sample_2d(1.5 / 4.0, 1.5 / 4.0),
            TextureCall::sample_2d(2.5 / 4.0, 2.5 / 4.0),
        ];
        let mut executor = SkewedExecutor { inner: ReferenceExecutor, scale: 2.0 };
        let report = pollster::block_on(check_texture_calls(
            &mut executor,
            &texture,
            &sampler,
            &calls,
            &Tolerance::default(),
        ))
        .unwrap()
        .expect("every call should fail");
        assert_eq!(report.failures.len(), calls.len());
        assert_eq!(report.failures[0].call_index, 0);
        assert_eq!(report.failures[2].call_index, 2);
    }

    #[test]
    fn test_non_base_subresource_skips_texel_map() {
        let texture = TexelStore::random(TexelFormat::Rgba8Unorm, 4, 4, 1).with_mip_chain();
        let sampler = SamplerState::default();
        let calls = vec![TextureCall::sample_2d(0.5 / 2.0, 0.5 / 2.0).with_mip_level(1)];
        let mut executor = SkewedExecutor { inner: ReferenceExecutor, scale: 0.25 };
        let report = pollster::block_on(check_texture_calls(
            &mut executor,
            &texture,
            &sampler,
            &calls,
            &Tolerance::default(),
        ))
        .unwrap()
        .expect("skewed executor must fail");
        assert!(report.failures[0].sample_points.is_none());
        assert!(report.to_string().contains("not derived"));
    }
}
