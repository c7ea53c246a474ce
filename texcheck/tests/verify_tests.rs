use texcheck::check::check_texture_calls;
use texcheck::compare::Tolerance;
use texcheck::exec::{CallBatch, CallExecutor, ExecutorError, ReferenceExecutor, run_calls};
use texcheck::sample::*;
use texcheck::texel::*;

macro_rules! assert_texel_close {
    ($left:expr, $right:expr, $format:expr, $tol:expr $(,)?) => {{
        let l = $left;
        let r = $right;
        let tol: f64 = $tol;
        for &c in $format.component_order() {
            let d = (l[c] - r[c]).abs();
            if d > tol {
                panic!(
                    "assertion failed: {} differs by {} (tol={})\n  left: {:?}\n right: {:?}",
                    c, d, tol, l, r
                );
            }
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// Scales every readback component, simulating a sampler with a
    /// systematic weighting error.
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

    #[rstest]
    #[case(TexelFormat::R8Unorm)]
    #[case(TexelFormat::Rgba8Unorm)]
    #[case(TexelFormat::Rgba8Snorm)]
    #[case(TexelFormat::R32Float)]
    #[case(TexelFormat::Rgba32Float)]
    fn test_reference_executor_passes_all_formats(#[case] format: TexelFormat) {
        let texture = TexelStore::random(format, 8, 8, 1);
        let args = SamplePointArgs { method: SamplePointMethod::Spiral, ..Default::default() };
        for filter in [FilterMode::Nearest, FilterMode::Linear] {
            let sampler = SamplerState {
                filter,
                address_mode_u: AddressMode::Repeat,
                address_mode_v: AddressMode::MirrorRepeat,
                ..Default::default()
            };
            let calls: Vec<TextureCall> = generate_sample_points(64, filter == FilterMode::Nearest, &args)
                .into_iter()
                .map(|[x, y]| TextureCall::sample_2d(x, y))
                .collect();
            let mut executor = ReferenceExecutor;
            let report = pollster::block_on(check_texture_calls(
                &mut executor,
                &texture,
                &sampler,
                &calls,
                &Tolerance::default(),
            ))
            .unwrap();
            assert!(
                report.is_none(),
                "{:?}/{:?} diverged:\n{}",
                format,
                filter,
                report.unwrap()
            );
        }
    }

    #[rstest]
    #[case(AddressMode::ClampToEdge)]
    #[case(AddressMode::Repeat)]
    #[case(AddressMode::MirrorRepeat)]
    fn test_out_of_range_coordinates_verify_clean(#[case] mode: AddressMode) {
        let texture = TexelStore::random(TexelFormat::Rgba8Unorm, 8, 8, 1);
        let sampler = SamplerState {
            filter: FilterMode::Linear,
            address_mode_u: mode,
            address_mode_v: mode,
            ..Default::default()
        };
        let calls: Vec<TextureCall> = (0..32)
            .map(|i| {
                let t = i as f32 / 31.0;
                TextureCall::sample_2d(-1.5 + 4.0 * t, 2.25 - 3.5 * t)
            })
            .collect();
        let mut executor = ReferenceExecutor;
        let report = pollster::block_on(check_texture_calls(
            &mut executor,
            &texture,
            &sampler,
            &calls,
            &Tolerance::default(),
        ))
        .unwrap();
        assert!(report.is_none(), "{:?} diverged:\n{}", mode, report.unwrap());
    }

    #[test]
    fn test_mixed_shapes_round_trip_in_order() {
        let texture = TexelStore::random(TexelFormat::Rgba8Unorm, 8, 8, 2).with_mip_chain();
        let sampler = SamplerState { filter: FilterMode::Linear, ..Default::default() };
        let calls = vec![
            TextureCall::sample_2d(0.31, 0.47),
            TextureCall::load_2d(5, 2),
            TextureCall::sample_2d(0.71, 0.13).with_offset(&[2, -3]),
            TextureCall::sample_2d(0.11, 0.93).with_array_index(1),
            TextureCall::sample_2d(0.52, 0.52).with_mip_level(2),
            TextureCall::sample_1d(0.66),
            TextureCall::sample_2d(0.05, 0.85).with_offset(&[2, -3]),
        ];
        let mut executor = ReferenceExecutor;
        let got = pollster::block_on(run_calls(&mut executor, &texture, &sampler, &calls)).unwrap();
        assert_eq!(got.len(), calls.len());
        for (got, call) in got.iter().zip(&calls) {
            let want = expected(call, &texture, &sampler);
            assert_texel_close!(*got, want, texture.format(), 1e-6);
        }
    }

    #[test]
    fn test_expected_stands_alone_without_an_executor() {
        // The analytic model is usable directly: nearest sampling at every
        // texel center reproduces the store exactly.
        let texture = TexelStore::random(TexelFormat::Rgba32Float, 8, 8, 1);
        let sampler = SamplerState::default();
        for y in 0..8u32 {
            for x in 0..8u32 {
                let call = TextureCall::sample_2d((x as f32 + 0.5) / 8.0, (y as f32 + 0.5) / 8.0);
                let got = expected(&call, &texture, &sampler);
                assert_texel_close!(got, texture.color_at([x, y, 0], 0), texture.format(), 0.0);
            }
        }
    }

    #[test]
    fn test_linear_weights_sum_to_one_for_generated_points() {
        // Sample a constant-1 texture: any correct weighting returns exactly 1.
        let texture = TexelStore::from_fn(TexelFormat::Rgba32Float, 8, 8, 1, |_| Texel::splat(1.0));
        let args = SamplePointArgs { method: SamplePointMethod::Spiral, radius: 2.5, loops: 3.0, ..Default::default() };
        let sampler = SamplerState {
            filter: FilterMode::Linear,
            address_mode_u: AddressMode::MirrorRepeat,
            address_mode_v: AddressMode::Repeat,
            ..Default::default()
        };
        for [x, y] in generate_sample_points(128, false, &args) {
            let got = expected(&TextureCall::sample_2d(x, y), &texture, &sampler);
            assert_texel_close!(got, Texel::splat(1.0), texture.format(), 1e-9);
        }
    }

    #[test]
    fn test_mismatch_report_shows_both_sample_point_maps() {
        let texture = TexelStore::from_fn(TexelFormat::Rgba8Unorm, 4, 4, 1, |[x, y, _]| {
            Texel::new(0.25 + 0.125 * x as f64, 0.25 + 0.125 * y as f64, 0.5, 1.0)
        });
        let sampler = SamplerState { filter: FilterMode::Linear, ..Default::default() };
        let calls = vec![TextureCall::sample_2d(1.0 / 4.0, 1.0 / 4.0)];
        let mut executor = SkewedExecutor { inner: ReferenceExecutor, scale: 0.4 };
        let report = pollster::block_on(check_texture_calls(
            &mut executor,
            &texture,
            &sampler,
            &calls,
            &Tolerance::default(),
        ))
        .unwrap()
        .expect("scaled results must diverge");

        let text = report.to_string();
        assert!(text.contains("component was not as expected:"), "{}", text);
        assert!(text.contains("  sample points:"), "{}", text);
        assert!(text.contains("expected:"), "{}", text);
        assert!(text.contains("got:"), "{}", text);
        // The corner call blends four texels; both maps must letter them.
        for letter in ["a", "b", "c", "d"] {
            assert!(text.contains(&format!("{}: at:", letter)), "missing {} in:\n{}", letter, text);
        }
        assert!(text.contains("┌───┬"), "{}", text);
    }

    #[test]
    fn test_dual_threshold_absorbs_small_relative_error() {
        // A 0.1% systematic skew is thousands of float32 ULPs but far below
        // the 3% relative threshold: the default tolerance must absorb it,
        // while a zero relative threshold must flag it.
        let texture = TexelStore::from_fn(TexelFormat::R32Float, 8, 8, 1, |[x, y, _]| {
            Texel::splat(10.0 + (x + 8 * y) as f64)
        });
        let sampler = SamplerState { filter: FilterMode::Linear, ..Default::default() };
        let calls = vec![TextureCall::sample_2d(0.437, 0.561)];
        let mut executor = SkewedExecutor { inner: ReferenceExecutor, scale: 1.001 };
        let relaxed = pollster::block_on(check_texture_calls(
            &mut executor,
            &texture,
            &sampler,
            &calls,
            &Tolerance::default(),
        ))
        .unwrap();
        assert!(relaxed.is_none(), "0.1% skew should pass:\n{}", relaxed.unwrap());

        let strict = Tolerance { max_ulp: 3, max_rel: 0.0 };
        let report = pollster::block_on(check_texture_calls(
            &mut executor,
            &texture,
            &sampler,
            &calls,
            &strict,
        ))
        .unwrap();
        assert!(report.is_some());
    }
}
