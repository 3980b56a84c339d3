use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use futures::executor::block_on;
use futures::future;
use serde_json::{Value, json};
use std::hint::black_box;
use std::time::Duration;
use trestle_canvas::{
    CanvasConfig, CollapseState, LayoutAdapter, assign_edge_handles, layout_request, project,
    resolve_absolute,
};
use trestle_core::{Architecture, DiagramType};

/// `services` services spread over `systems` systems, each service connected to the next few.
fn build_architecture(services: usize, systems: usize, fanout: usize) -> Architecture {
    let mut nodes: Vec<Value> = Vec::new();
    let mut relationships: Vec<Value> = Vec::new();
    for s in 0..systems {
        nodes.push(json!({ "unique-id": format!("sys{s}"), "node-type": "system", "name": format!("System {s}") }));
    }
    for i in 0..services {
        nodes.push(json!({ "unique-id": format!("svc{i}"), "node-type": "service", "name": format!("Service {i}") }));
        for k in 1..=fanout {
            let to = i + k * 2;
            if to >= services {
                break;
            }
            relationships.push(json!({
                "unique-id": format!("svc{i}-svc{to}"),
                "relationship-type": { "connects": { "source": format!("svc{i}"), "target": format!("svc{to}") } }
            }));
        }
    }
    for s in 0..systems {
        let members: Vec<String> = (0..services)
            .filter(|i| i % 2 == 0 && i % systems == s)
            .map(|i| format!("svc{i}"))
            .collect();
        if !members.is_empty() {
            relationships.push(json!({
                "unique-id": format!("sys{s}-members"),
                "relationship-type": { "composed-of": { "container": format!("sys{s}"), "nodes": members } }
            }));
        }
    }
    serde_json::from_value(json!({ "nodes": nodes, "relationships": relationships }))
        .expect("valid architecture")
}

fn bench_canvas(c: &mut Criterion) {
    let config = CanvasConfig::default();
    let cases = [
        ("flat_40_f2", 40usize, 0usize, 2usize),
        ("nested_120_s6_f3", 120, 6, 3),
    ];

    let mut group = c.benchmark_group("handles");
    for (name, services, systems, fanout) in cases {
        let arch = build_architecture(services, systems, fanout);
        let p = project(&arch, &config, &CollapseState::default());
        let outcome = block_on(LayoutAdapter::default().layout(
            layout_request(&p.nodes, &p.edges, &config, DiagramType::Architecture),
            None,
            future::pending(),
        ));
        let mut nodes = p.nodes.clone();
        for (n, placed) in nodes.iter_mut().zip(&outcome.nodes) {
            n.x = placed.x;
            n.y = placed.y;
            n.parent_id = None;
        }
        let rects = resolve_absolute(&nodes);
        group.bench_with_input(BenchmarkId::from_parameter(name), &p.edges, |b, edges| {
            b.iter(|| black_box(assign_edge_handles(&rects, edges, &config)))
        });
    }
    group.finish();

    let mut group = c.benchmark_group("layout");
    group.measurement_time(Duration::from_secs(10));
    for (name, services, systems, fanout) in cases {
        let arch = build_architecture(services, systems, fanout);
        let p = project(&arch, &config, &CollapseState::default());
        let adapter = LayoutAdapter::default();
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            b.iter_batched(
                || layout_request(&p.nodes, &p.edges, &config, DiagramType::Architecture),
                |request| black_box(block_on(adapter.layout(request, None, future::pending()))),
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_canvas);
criterion_main!(benches);
