//! Benchmarks for nearest-UV lookup and surface patch extraction
//!
//! Compares the KD-Tree search against brute force, and the bounding-box
//! containment pre-filter against testing every UV point.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use drawmap_algorithms::{extract_patch, BruteForceUvIndex, KdUvIndex};
use drawmap_core::{
    ContainmentStrategy, ImageSize, MeshData, PixelPoint, Point3d, RegionOptions, UvMap, UvPoint,
    UvSearch,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Generate a UV table with the specified number of random points
fn generate_uvs(num_points: usize, seed: u64) -> Vec<UvPoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_points)
        .map(|_| UvPoint::new(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)))
        .collect()
}

/// A mesh with one vertex per random UV point and no faces
fn generate_mesh(num_points: usize) -> MeshData {
    let uvs = generate_uvs(num_points, 7);
    let vertices = uvs.iter().map(|uv| Point3d::new(uv.x, uv.y, 0.0)).collect();
    let lookup = (0..num_points).collect();
    MeshData::new(vertices, Vec::new(), UvMap::new(uvs, lookup))
        .expect("Failed to build benchmark mesh")
}

/// A dense circular border around the image center
fn circle_border(image: &ImageSize, samples: usize) -> Vec<PixelPoint> {
    let (cx, cy) = (image.width() / 2.0, image.height() / 2.0);
    let radius = image.width().min(image.height()) / 4.0;
    (0..samples)
        .map(|i| {
            let t = i as f64 / samples as f64 * std::f64::consts::TAU;
            PixelPoint::new(cx + radius * t.cos(), cy + radius * t.sin())
        })
        .collect()
}

/// Benchmark nearest-UV queries with different searches
fn benchmark_nearest_uv(c: &mut Criterion) {
    let sizes = vec![1000, 10000, 50000];
    let queries = generate_uvs(1000, 42);

    let mut group = c.benchmark_group("nearest_uv");
    for size in sizes {
        let uvs = generate_uvs(size, 1);
        group.throughput(Throughput::Elements(queries.len() as u64));

        let kd = KdUvIndex::new(&uvs);
        group.bench_with_input(BenchmarkId::new("kd_tree", size), &queries, |b, queries| {
            b.iter(|| {
                for query in queries {
                    black_box(kd.nearest_uv(query));
                }
            })
        });

        if size <= 10000 {
            let brute = BruteForceUvIndex::new(&uvs);
            group.bench_with_input(BenchmarkId::new("brute_force", size), &queries, |b, queries| {
                b.iter(|| {
                    for query in queries {
                        black_box(brute.nearest_uv(query));
                    }
                })
            });
        }
    }
    group.finish();
}

/// Benchmark patch extraction with both containment strategies
fn benchmark_extract_patch(c: &mut Criterion) {
    let image = ImageSize::new(1000.0, 1000.0).expect("Invalid image size");
    let border = circle_border(&image, 2000);

    let mut group = c.benchmark_group("extract_patch");
    for size in [5000, 20000] {
        let mesh = generate_mesh(size);
        for (name, containment) in [
            ("exhaustive", ContainmentStrategy::Exhaustive),
            ("bounding_box", ContainmentStrategy::BoundingBox),
        ] {
            let options = RegionOptions::default().with_containment(containment);
            group.bench_with_input(BenchmarkId::new(name, size), &mesh, |b, mesh| {
                b.iter(|| black_box(extract_patch(&border, &image, mesh, &options)))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, benchmark_nearest_uv, benchmark_extract_patch);
criterion_main!(benches);
