// SPDX-FileCopyrightText: 2026 FlowSketch contributors
// SPDX-License-Identifier: MIT

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use flowsketch::graph::build_flow;
use flowsketch::parse::parse_tasks;
use flowsketch::render::render_flow;

// Benchmark identity (keep stable):
// - Group names: `flow.build`, `flow.render`
// - Case IDs must remain stable across refactors (`small`, `medium_branchy`,
//   `large`) so results stay comparable over time.

fn task_text(lines: usize, decision_every: usize) -> String {
    (0..lines)
        .map(|idx| {
            if decision_every > 0 && idx % decision_every == decision_every - 1 {
                format!("IF step {idx} ok THEN continue ELSE retry")
            } else {
                format!("Build component {idx} #iter")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn benches_flow(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("flow.build");

        for (case_id, lines, decision_every) in
            [("small", 10usize, 0usize), ("medium_branchy", 200, 5), ("large", 2000, 10)]
        {
            let tasks = parse_tasks(&task_text(lines, decision_every));
            group.throughput(Throughput::Elements(lines as u64));
            group.bench_function(case_id, move |b| {
                b.iter(|| {
                    let state = build_flow(black_box(&tasks), true);
                    black_box(state.edges().len())
                })
            });
        }

        group.finish();
    }

    {
        let mut group = c.benchmark_group("flow.render");

        for (case_id, lines, decision_every) in
            [("small", 10usize, 0usize), ("medium_branchy", 200, 5)]
        {
            let state = build_flow(&parse_tasks(&task_text(lines, decision_every)), true);
            group.throughput(Throughput::Elements(state.nodes().len() as u64));
            group.bench_function(case_id, move |b| {
                b.iter(|| {
                    let rendered = render_flow(black_box(&state));
                    black_box(rendered.text.len())
                })
            });
        }

        group.finish();
    }
}

criterion_group!(benches, benches_flow);
criterion_main!(benches);
