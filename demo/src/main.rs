use texcheck::check::check_texture_calls;
use texcheck::compare::Tolerance;
use texcheck::exec::{CallBatch, CallExecutor, ExecutorError, ReferenceExecutor};
use texcheck::sample::*;
use texcheck::texel::*;

/// Stands in for a buggy GPU sampler: every readback component is scaled, so
/// verification fails and prints its sample-point diagnostics.
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
        let mut out = Vec::with_capacity(raw.len());
        for word in raw.chunks_exact(4) {
            let v = f32::from_ne_bytes([word[0], word[1], word[2], word[3]]) * self.scale;
            out.extend_from_slice(&v.to_ne_bytes());
        }
        Ok(out)
    }
}

fn load_texture(path: &str) -> TexelStore {
    let img = image::open(path).unwrap().into_rgba8();
    let (width, height) = img.dimensions();
    TexelStore::from_bytes(TexelFormat::Rgba8Unorm, width, height, 1, img.into_raw())
}

fn main() {
    tracing_subscriber::fmt().init();

    let texture = match std::env::args().nth(1) {
        Some(path) => load_texture(&path),
        None => TexelStore::random(TexelFormat::Rgba8Unorm, 8, 8, 1),
    };
    println!(
        "texture: {}x{} {}",
        texture.width(),
        texture.height(),
        texture.format()
    );

    let sampler = SamplerState {
        filter: FilterMode::Linear,
        address_mode_u: AddressMode::Repeat,
        address_mode_v: AddressMode::MirrorRepeat,
        ..Default::default()
    };
    let args = SamplePointArgs {
        method: SamplePointMethod::Spiral,
        texture_width: texture.width(),
        texture_height: texture.height(),
        ..Default::default()
    };
    let calls: Vec<TextureCall> = generate_sample_points(64, false, &args)
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
    match report {
        None => println!("reference executor: {} calls verified", calls.len()),
        Some(report) => println!("reference executor diverged:\n{}", report),
    }

    // Now the same batch against a sampler that is wrong on purpose, to show
    // what a real mismatch report looks like.
    let mut skewed = SkewedExecutor { inner: ReferenceExecutor, scale: 0.75 };
    let report = pollster::block_on(check_texture_calls(
        &mut skewed,
        &texture,
        &sampler,
        &calls[..4],
        &Tolerance::default(),
    ))
    .unwrap();
    match report {
        None => println!("skewed executor unexpectedly passed"),
        Some(report) => {
            println!("\nskewed executor (scale 0.75), first failure:\n");
            println!("{}", report.failures[0]);
            println!("\n({} failing components in total)", report.failures.len());
        }
    }
}
