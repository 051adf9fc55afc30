use std::hint::black_box;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use pulsegraph::prelude::{
    consolidate, Alignment, Frame, GenericInstruction, InstructionKind, LogicalElement, NodeId,
    Operand, ProgramGraph, Waveform,
};

const WIDTHS: [usize; 4] = [4, 16, 64, 256];

fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(20)
        .warm_up_time(Duration::from_secs(1))
        .measurement_time(Duration::from_secs(2))
}

fn play(qubit: i64) -> GenericInstruction {
    GenericInstruction::new(
        InstructionKind::Play,
        Operand::Waveform(Waveform::new("constant", 160)),
        Some(LogicalElement::qubit(qubit).expect("valid index")),
        Some(Frame::qubit(qubit).expect("valid index")),
    )
    .expect("valid instruction")
}

fn sequence(graph: &mut ProgramGraph, nodes: &[NodeId]) {
    let mut prev = graph.input();
    for node in nodes {
        graph.add_edge(prev, *node).expect("edge ok");
        prev = *node;
    }
    graph.add_edge(prev, graph.output()).expect("edge ok");
}

/// Sequential program holding `width` sequential subgraphs of two
/// instructions each; every subgraph is inlinable.
fn make_wide(width: usize) -> ProgramGraph {
    let mut graph = ProgramGraph::new(Alignment::Sequential);
    let mut nodes = Vec::with_capacity(width);
    for i in 0..width {
        let mut sub = ProgramGraph::new(Alignment::Sequential);
        let a = sub.append(play(i as i64));
        let b = sub.append(play(i as i64 + 1));
        sequence(&mut sub, &[a, b]);
        nodes.push(graph.append(sub));
    }
    sequence(&mut graph, &nodes);
    graph
}

/// Sequential nesting `depth` levels deep with one instruction per level.
fn make_deep(depth: usize) -> ProgramGraph {
    let mut graph = ProgramGraph::new(Alignment::Sequential);
    let inst = graph.append(play(depth as i64));
    if depth == 0 {
        sequence(&mut graph, &[inst]);
        return graph;
    }
    let nested = graph.append(make_deep(depth - 1));
    sequence(&mut graph, &[inst, nested]);
    graph
}

fn schedule_leaves(graph: &mut ProgramGraph) {
    let mut t0 = 0u64;
    for id in graph.node_ids() {
        let duration = match graph.element_mut(id) {
            Some(pulsegraph::graph::Element::Nested(sub)) => {
                schedule_leaves(sub);
                sub.duration().unwrap_or(0)
            }
            Some(element) => element.duration().unwrap_or(0),
            None => continue,
        };
        graph.set_time(id, t0).expect("interior node");
        t0 += duration;
    }
}

fn consolidate_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("rewrite/consolidate");
    for &width in &WIDTHS {
        group.bench_with_input(BenchmarkId::new("wide", width), &width, |b, &width| {
            let graph = make_wide(width);
            b.iter_batched(
                || graph.clone(),
                |mut graph| {
                    consolidate(&mut graph).expect("unscheduled");
                    black_box(graph);
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_with_input(BenchmarkId::new("deep", width), &width, |b, &depth| {
            let graph = make_deep(depth);
            b.iter_batched(
                || graph.clone(),
                |mut graph| {
                    consolidate(&mut graph).expect("unscheduled");
                    black_box(graph);
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn flatten_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("rewrite/flatten");
    for &width in &WIDTHS {
        let mut graph = make_wide(width);
        schedule_leaves(&mut graph);

        group.bench_with_input(BenchmarkId::new("wide", width), &width, |b, _| {
            b.iter(|| {
                let flat = graph.flatten().expect("fully scheduled");
                black_box(flat);
            });
        });

        group.bench_with_input(BenchmarkId::new("instructions", width), &width, |b, _| {
            b.iter(|| {
                let instructions = graph.scheduled_instructions().expect("fully scheduled");
                black_box(instructions);
            });
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = default_criterion();
    targets = consolidate_benches, flatten_benches
}
criterion_main!(benches);
