use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lww_crdt::prelude::*;

fn ts(i: u32) -> Timestamp {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::microseconds(i64::from(i))
}

fn bench_lww_set_add(c: &mut Criterion) {
    c.bench_function("LWWSet::add x1000", |b| {
        b.iter(|| {
            let set = LWWSet::new();
            for i in 0..1000u32 {
                set.add(i, ts(i));
            }
            black_box(set.len())
        })
    });
}

fn bench_lww_set_get(c: &mut Criterion) {
    let set = LWWSet::new();
    for i in 0..1000u32 {
        set.add(i, ts(i));
        if i % 4 == 0 {
            set.remove(i, ts(i + 1));
        }
    }

    c.bench_function("LWWSet::get 1000 elements", |b| {
        b.iter(|| black_box(set.get().len()))
    });
}

fn bench_lww_set_merge(c: &mut Criterion) {
    let s1 = LWWSet::new();
    let s2 = LWWSet::new();

    for i in 0..1000u32 {
        s1.add(i, ts(i));
        s2.add(i + 500, ts(i)); // 50% overlap
    }

    c.bench_function("LWWSet::merge 1000+1000 elements", |b| {
        b.iter(|| {
            let merged = s1.clone();
            merged.merge(&s2).unwrap();
            black_box(merged.len())
        })
    });
}

fn bench_lww_set_delta(c: &mut Criterion) {
    let s1 = LWWSet::new();
    for i in 0..1000u32 {
        s1.add(i, ts(i));
    }
    let s2 = s1.clone();
    for i in 0..10u32 {
        s1.add(i, ts(2000 + i));
    }

    c.bench_function("LWWSet::delta 10 of 1000 changed", |b| {
        b.iter(|| black_box(s1.delta(&s2).is_empty()))
    });
}

fn ring(n: u32) -> LWWGraph<u32> {
    let g = LWWGraph::new();
    for v in 0..n {
        g.add_vertex(v);
    }
    for v in 0..n {
        g.add_edge(v, (v + 1) % n).unwrap();
    }
    g
}

fn bench_graph_add_edge(c: &mut Criterion) {
    c.bench_function("LWWGraph::add_edge ring of 1000", |b| {
        b.iter(|| black_box(ring(1000)))
    });
}

fn bench_graph_find_path(c: &mut Criterion) {
    let g = ring(1000);

    c.bench_function("LWWGraph::find_path across ring of 1000", |b| {
        b.iter(|| black_box(g.find_path(&0, &500).unwrap().len()))
    });
}

fn bench_graph_merge(c: &mut Criterion) {
    let replicas: Vec<LWWGraph<u32>> = (0..10)
        .map(|r| {
            let g = LWWGraph::new();
            for v in (r * 100)..((r + 1) * 100) {
                g.add_vertex(v);
            }
            for v in (r * 100 + 1)..((r + 1) * 100) {
                g.add_edge(v - 1, v).unwrap();
            }
            g
        })
        .collect();

    c.bench_function("LWWGraph::merge 10 replicas", |b| {
        b.iter(|| {
            let merged = replicas[0].clone();
            for other in &replicas[1..] {
                merged.merge(other).unwrap();
            }
            black_box(merged.get_all_vertices().len())
        })
    });
}

criterion_group!(
    benches,
    bench_lww_set_add,
    bench_lww_set_get,
    bench_lww_set_merge,
    bench_lww_set_delta,
    bench_graph_add_edge,
    bench_graph_find_path,
    bench_graph_merge,
);
criterion_main!(benches);
