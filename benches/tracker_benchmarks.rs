//! Tracker and event selection benchmarks using Criterion.
//!
//! Run with: cargo bench

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use lineage_rs::{
    EventSelection, EventSelectionConfig, Graph, NodeId, ObjectLabel, ObjectSample, Tracker,
    TrackerConfig,
};

const FRAMES: i32 = 50;

/// Objects on a grid drifting one pixel per frame.
fn create_test_frame(n: usize, frame: i32) -> BTreeMap<ObjectLabel, ObjectSample> {
    (0..n)
        .map(|i| {
            let x = (i % 10) as f64 * 40.0 + frame as f64;
            let y = (i / 10) as f64 * 40.0;
            (i as ObjectLabel + 1, ObjectSample::at(x, y, 8.0).expect("valid sample"))
        })
        .collect()
}

fn track_frames(n: usize) -> Graph<ObjectSample> {
    let mut tracker = Tracker::new(TrackerConfig::new(20.0, 3, 2)).expect("valid tracker");
    for frame in 0..FRAMES {
        tracker
            .track_next_frame(frame, create_test_frame(n, frame))
            .expect("frame tracked");
    }
    tracker.into_graph()
}

/// Tracked graph where every object switches class halfway.
fn create_classified_graph(n: usize) -> Graph<ObjectSample> {
    let mut graph = track_frames(n);
    for node_id in graph.node_list() {
        let class = if node_id.frame < FRAMES / 2 { 1 } else { 2 };
        if let Ok(sample) = graph.node_data_mut(&node_id) {
            sample.label = Some(class);
        }
    }
    graph
}

fn benchmark_track_10_objects(c: &mut Criterion) {
    c.bench_function("track_10_objects_50_frames", |b| {
        b.iter(|| black_box(track_frames(black_box(10))))
    });
}

fn benchmark_track_100_objects(c: &mut Criterion) {
    c.bench_function("track_100_objects_50_frames", |b| {
        b.iter(|| black_box(track_frames(black_box(100))))
    });
}

fn benchmark_find_events_100_objects(c: &mut Criterion) {
    let graph = create_classified_graph(100);
    let selection = EventSelection::new(EventSelectionConfig::new((1, 2), 10, 10)).expect("valid selection");

    c.bench_function("find_events_100_objects", |b| {
        b.iter(|| selection.find_events(black_box(&graph)).expect("event selection"))
    });
}

fn benchmark_find_events_unbounded(c: &mut Criterion) {
    let graph = create_classified_graph(100);
    let mut config = EventSelectionConfig::new((1, 2), -1, -1);
    config.forward_check = -1;
    let selection = EventSelection::new(config).expect("valid selection");

    c.bench_function("find_events_100_objects_unbounded", |b| {
        b.iter(|| selection.find_events(black_box(&graph)).expect("event selection"))
    });
}

fn benchmark_delete_nodes(c: &mut Criterion) {
    let graph = track_frames(100);
    let doomed: Vec<NodeId> = graph.node_list().into_iter().filter(|id| id.frame % 5 == 0).collect();

    c.bench_function("delete_every_fifth_frame_100_objects", |b| {
        b.iter(|| {
            let mut graph = graph.clone();
            for node_id in &doomed {
                graph.delete_node(node_id).expect("known node");
            }
            black_box(graph)
        })
    });
}

criterion_group!(
    benches,
    benchmark_track_10_objects,
    benchmark_track_100_objects,
    benchmark_find_events_100_objects,
    benchmark_find_events_unbounded,
    benchmark_delete_nodes,
);
criterion_main!(benches);
