//! Hot-path lookup benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use corelib::factory::{build, Algorithm, EngineConfig};
use corelib::node::Node;

fn nodes(n: usize) -> Vec<Node> {
    (0..n).map(|i| Node::new(format!("node-{}", i))).collect()
}

fn bench_lookup(c: &mut Criterion) {
    let members = nodes(32);
    let keys: Vec<String> = (0..1024).map(|i| format!("key-{}", i)).collect();

    let mut group = c.benchmark_group("lookup");
    for algorithm in Algorithm::ALL {
        let cluster = build(algorithm, &EngineConfig::default(), &members).unwrap();
        group.bench_function(algorithm.tag(), |b| {
            let mut i = 0;
            b.iter(|| {
                let key = &keys[i % keys.len()];
                i += 1;
                black_box(cluster.node_for(key).unwrap());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_lookup);
criterion_main!(benches);
