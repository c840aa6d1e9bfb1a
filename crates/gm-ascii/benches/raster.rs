use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use gm_ascii::raster::Rasterizer;
use gm_ascii::sampler::sample_image;
use gm_core::config::RenderConfig;
use gm_core::frame::{FrameBuffer, GlyphGrid};
use gm_mesh::procedural;

fn bench_torus(c: &mut Criterion) {
    let mesh = procedural::torus(96, 48);
    let config = RenderConfig {
        rotation_x: 0.6,
        rotation_y: 0.9,
        ..RenderConfig::default()
    };
    let mut raster = Rasterizer::new();
    let mut grid = GlyphGrid::new(200, 60);
    c.bench_function("raster_torus_200x60", |b| {
        b.iter(|| raster.render(black_box(&mesh), black_box(&config), &mut grid));
    });

    let half = RenderConfig {
        resolution: 0.5,
        ..config.clone()
    };
    c.bench_function("raster_torus_200x60_half", |b| {
        b.iter(|| raster.render(black_box(&mesh), black_box(&half), &mut grid));
    });
}

fn bench_sampler(c: &mut Criterion) {
    let frame = FrameBuffer::filled(1920, 1080, [120, 80, 200, 255]);
    let config = RenderConfig::default();
    let mut grid = GlyphGrid::new(200, 60);
    c.bench_function("sample_1080p_200x60", |b| {
        b.iter(|| sample_image(black_box(&frame), black_box(&config), &mut grid));
    });
}

criterion_group!(benches, bench_torus, bench_sampler);
criterion_main!(benches);
