//! Benchmarks for event lookup and per-tick synchronization.
//!
//! Measures nearest-event queries on a large store, a full simulated
//! playback through the `Synchronizer`, and overlay rendering for one frame.
//!
//! Run with: `cargo bench --bench sync_bench`

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use safeview::{
    AnalysisRun, Category, OverlayRenderer, Rect, Surface, Synchronizer, TimedEvent,
    DEFAULT_TOLERANCE,
};

// ---------------------------------------------------------------------------
// Datasets
// ---------------------------------------------------------------------------

/// One event every 0.7s for roughly two hours of video.
const EVENT_COUNT: usize = 10_000;
const SPACING: f64 = 0.7;

fn large_run() -> AnalysisRun {
    let categories = [
        Category::CriticalRegion,
        Category::ToolProximity,
        Category::HighToolSpeed,
    ];
    let events = (0..EVENT_COUNT)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let time = i as f64 * SPACING;
            let rect = Rect::from_corners([100.0, 100.0, 400.0, 300.0]).unwrap();
            TimedEvent::new(time, categories[i % categories.len()].clone())
                .with_confidence(0.8)
                .with_geometry(rect)
        })
        .collect();
    AnalysisRun::from_events(events)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_store_query(c: &mut Criterion) {
    let run = large_run();
    let store = run.events();
    let mut group = c.benchmark_group("event_store_query");

    group.bench_function("hit", |b| {
        b.iter(|| store.query(black_box(3_500.1), DEFAULT_TOLERANCE));
    });

    group.bench_function("miss", |b| {
        b.iter(|| store.query(black_box(3_500.35), DEFAULT_TOLERANCE));
    });

    group.bench_function("past_end", |b| {
        b.iter(|| store.query(black_box(1.0e6), DEFAULT_TOLERANCE));
    });

    group.finish();
}

fn bench_playback(c: &mut Criterion) {
    let run = large_run();
    let end = run.events().last_time().unwrap_or(0.0);
    let mut group = c.benchmark_group("synchronizer");
    group.sample_size(20);

    group.bench_function("full_playback_250ms_ticks", |b| {
        b.iter_batched(
            || Synchronizer::with_run(run.clone(), DEFAULT_TOLERANCE),
            |mut sync| {
                let mut t = 0.0;
                while t <= end {
                    black_box(sync.on_tick(t));
                    t += 0.25;
                }
                sync
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("seek_back_and_forth", |b| {
        b.iter_batched(
            || {
                let mut sync = Synchronizer::with_run(run.clone(), DEFAULT_TOLERANCE);
                sync.on_tick(end);
                sync
            },
            |mut sync| {
                for i in 0..1_000_u32 {
                    let t = if i % 2 == 0 { 10.0 } else { end - 10.0 };
                    black_box(sync.on_tick(t));
                }
                sync
            },
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let run = large_run();
    let renderer = OverlayRenderer::default();
    let event = run.events().get(42).cloned();

    c.bench_function("overlay_render_active", |b| {
        b.iter(|| renderer.render(black_box(event.as_ref()), Surface::default()));
    });

    c.bench_function("overlay_render_idle", |b| {
        b.iter(|| renderer.render(black_box(None), Surface::default()));
    });
}

criterion_group!(benches, bench_store_query, bench_playback, bench_render);
criterion_main!(benches);
