use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use lightsout_core::{LampBank, Snapshot, TrialPhase};
use lightsout_render::LampRenderer;
use pprof::criterion::{Output, PProfProfiler};
use std::time::Duration;

const WIDTH: u32 = 1280;
const HEIGHT: u32 = 720;

fn sequencing(lit: usize) -> Snapshot {
    let mut lamps = LampBank::new();
    if lit > 0 {
        lamps.light_through(lit - 1);
    }
    Snapshot {
        trial_id: 1,
        lamps,
        phase: TrialPhase::Sequencing,
        ..Snapshot::default()
    }
}

pub fn bench_render_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_frame");
    group
        .sample_size(50)
        .measurement_time(Duration::from_secs(10))
        .warm_up_time(Duration::from_secs(2));

    // alternate snapshots so every iteration actually redraws
    group.bench_function("lamp_step", |b| {
        let mut renderer = LampRenderer::new(WIDTH, HEIGHT).expect("renderer");
        let mut frame = vec![0u8; (WIDTH * HEIGHT * 4) as usize];
        let frames = [sequencing(2), sequencing(3)];
        let mut n = 0usize;
        b.iter(|| {
            n += 1;
            let snap = &frames[n % 2];
            renderer
                .render_frame(black_box(snap), &mut frame)
                .expect("render");
        });
    });

    group.bench_function("unchanged", |b| {
        let mut renderer = LampRenderer::new(WIDTH, HEIGHT).expect("renderer");
        let mut frame = vec![0u8; (WIDTH * HEIGHT * 4) as usize];
        let snap = sequencing(5);
        renderer.render_frame(&snap, &mut frame).expect("render");
        b.iter(|| {
            renderer
                .render_frame(black_box(&snap), &mut frame)
                .expect("render");
        });
    });

    group.bench_function("cold_start", |b| {
        b.iter_batched(
            || vec![0u8; (WIDTH * HEIGHT * 4) as usize],
            |mut frame| {
                let mut renderer = LampRenderer::new(WIDTH, HEIGHT).expect("renderer");
                renderer
                    .render_frame(black_box(&sequencing(1)), &mut frame)
                    .expect("render");
            },
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)));
    targets = bench_render_frame
}

criterion_main!(benches);
