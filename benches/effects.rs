//! Benchmarks for the CPU drawing path.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use neuroslide::effects::Effect;
use neuroslide::{DeckConfig, DigitalRain, NeuralField, PixelCanvas, Presentation, View};

fn bench_neural_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("neural_frame");

    for (w, h) in [(800u32, 600u32), (1280, 720), (1920, 1080)] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", w, h)),
            &(w, h),
            |b, &(w, h)| {
                let mut rng = SmallRng::seed_from_u64(1);
                let mut field = NeuralField::new(w, h, &mut rng);
                let mut canvas = PixelCanvas::new(w, h);
                let mut t = 0.0;
                b.iter(|| {
                    t += 16.0;
                    field.frame(&mut canvas, black_box(t));
                })
            },
        );
    }

    group.finish();
}

fn bench_rain_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("rain_frame");

    for (w, h) in [(1280u32, 720u32), (1920, 1080)] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", w, h)),
            &(w, h),
            |b, &(w, h)| {
                let mut rain = DigitalRain::new(w, h, 1);
                let mut canvas = PixelCanvas::new(w, h);
                b.iter(|| rain.frame(&mut canvas, 0.0))
            },
        );
    }

    group.finish();
}

fn bench_view_and_compose(c: &mut Criterion) {
    let mut config = DeckConfig::default();
    config.effects.seed = Some(1);
    let mut show = Presentation::new(config, 1280, 720).unwrap();
    show.handle(neuroslide::Command::GoTo(5));
    show.advance_to(2_000);
    let view = View::new(show.config());

    c.bench_function("view_draw_1280x720", |b| {
        let mut canvas = PixelCanvas::new(1280, 720);
        b.iter(|| black_box(view.draw(&show, 2_000, &mut canvas)))
    });

    c.bench_function("composite_1280x720", |b| {
        let mut frame = PixelCanvas::new(1280, 720);
        let layer = PixelCanvas::new(1280, 720);
        b.iter(|| frame.composite(black_box(&layer), 0.8))
    });
}

criterion_group!(
    benches,
    bench_neural_frame,
    bench_rain_frame,
    bench_view_and_compose,
);
criterion_main!(benches);
