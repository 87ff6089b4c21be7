use std::hint::black_box;
use std::time::Instant;

use burrow_assets::TemplateStore;
use burrow_kernel::World;
use burrow_stream::{GridIndex, StreamConfig, Streamer, Viewpoint};
use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn streamer(config: StreamConfig) -> Streamer {
    Streamer::new(config, &TemplateStore::stock(), 10).expect("stock templates are complete")
}

fn bench_fresh_scan(extent: f32, iterations: usize) {
    let viewpoint = Viewpoint::new(Vec2::new(0.0, -100.0), Vec2::splat(extent));

    let start = Instant::now();
    for i in 0..iterations {
        let mut s = streamer(StreamConfig::default());
        let mut world = World::new();
        let mut grid = GridIndex::new();
        let mut rng = StdRng::seed_from_u64(i as u64);
        let _ = black_box(s.scan(&mut world, &mut grid, black_box(&viewpoint), &mut rng));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  fresh scan (extent {extent}, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_descent(steps: usize) {
    let mut s = streamer(StreamConfig::default());
    let mut world = World::new();
    let mut grid = GridIndex::new();
    let mut rng = StdRng::seed_from_u64(42);

    let start = Instant::now();
    for i in 0..steps {
        // Simulate a viewer sinking one cell per step.
        let viewpoint = Viewpoint::new(Vec2::new(0.0, -(i as f32) * 10.0), Vec2::new(160.0, 90.0));
        let _ = black_box(s.update(&mut world, &mut grid, black_box(&viewpoint), &mut rng));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / steps as u32;
    println!(
        "  descent ({steps} steps, {} live chunks at end): {per_iter:?}/step, total {elapsed:?}",
        grid.spawned_count()
    );
}

fn main() {
    println!("=== Stream Scan Benchmarks ===\n");

    println!("Fresh window scan:");
    bench_fresh_scan(100.0, 1000);
    bench_fresh_scan(400.0, 100);
    bench_fresh_scan(1600.0, 10);

    println!("\nDescent with unloading:");
    bench_descent(1000);
    bench_descent(10000);

    println!("\n=== Done ===");
}
