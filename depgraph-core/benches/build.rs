use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use depgraph_core::scene::*;
use depgraph_core::DependencyGraph;

/// A view layer of `n` mesh objects sharing a few materials, every tenth one
/// parented to the previous object.
fn build_scene(n: usize) -> (Database, SessionUuid) {
    let mut database = Database::new();
    let materials: Vec<_> = (0..4)
        .map(|i| database.add(format!("Material.{i}"), IdBody::Material(Material::default())))
        .collect();

    let mut layer = ViewLayer::new("View Layer");
    let mut previous = None;
    for i in 0..n {
        let mesh = database.add(
            format!("Mesh.{i}"),
            IdBody::Geometry(
                Geometry::new(GeometryKind::Mesh)
                    .with_materials(vec![materials[i % materials.len()]]),
            ),
        );
        let mut object = Object::with_data(mesh);
        if i % 10 == 9 {
            object.parent = previous;
        }
        let object = database.add(format!("Object.{i}"), IdBody::Object(object));
        layer.bases.push(Base::new(object));
        previous = Some(object);
    }

    let scene = database.add(
        "Scene",
        IdBody::Scene(Scene {
            view_layers: vec![layer],
            ..Default::default()
        }),
    );
    (database, scene)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_from_view_layer");
    for &n in &[10usize, 100, 1_000] {
        let (database, scene) = build_scene(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let mut depsgraph = DependencyGraph::default();
                depsgraph.build_from_view_layer(&database, scene, 0).unwrap();
                black_box(depsgraph.stats())
            })
        });
    }
    group.finish();
}

/// Rebuilds of an already evaluated graph, where every shadow copy is
/// carried over.
fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebuild_with_carry_over");
    for &n in &[10usize, 100, 1_000] {
        let (database, scene) = build_scene(n);
        let mut depsgraph = DependencyGraph::default();
        depsgraph.build_from_view_layer(&database, scene, 0).unwrap();
        depsgraph.expand_shadow_copies(&database, 1.0);

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                depsgraph.build_from_view_layer(&database, scene, 0).unwrap();
                black_box(depsgraph.stats())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_rebuild);
criterion_main!(benches);
