use criterion::{Criterion, criterion_group, criterion_main};
use texcheck::check::check_texture_calls;
use texcheck::compare::Tolerance;
use texcheck::exec::ReferenceExecutor;
use texcheck::sample::*;
use texcheck::texel::*;

fn criterion_benchmark(c: &mut Criterion) {
    let texture = TexelStore::random(TexelFormat::Rgba8Unorm, 16, 16, 1);
    let sampler = SamplerState {
        filter: FilterMode::Linear,
        address_mode_u: AddressMode::Repeat,
        address_mode_v: AddressMode::Repeat,
        ..Default::default()
    };
    let args = SamplePointArgs {
        method: SamplePointMethod::Spiral,
        texture_width: 16,
        texture_height: 16,
        ..Default::default()
    };
    let calls: Vec<TextureCall> = generate_sample_points(256, false, &args)
        .into_iter()
        .map(|[x, y]| TextureCall::sample_2d(x, y))
        .collect();

    c.bench_function("check 256 calls", |bencher| {
        bencher.iter(|| {
            let mut executor = ReferenceExecutor;
            let report = pollster::block_on(check_texture_calls(
                &mut executor,
                &texture,
                &sampler,
                &calls,
                &Tolerance::default(),
            ))
            .unwrap();
            assert!(report.is_none());
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
