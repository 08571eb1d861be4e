use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use quadfall::{CandidateQuery, SimConfig, Simulation};

const BODIES: usize = 2_000;

// Every body is activated up front and the pile is given a few steps to
// spread out, so each benchmark starts from a realistic clustered state.
fn setup_sim(query: CandidateQuery) -> Simulation {
    let config = SimConfig {
        spawn_count: BODIES,
        rng_seed: Some(0),
        ..SimConfig::default()
    };
    let mut sim = Simulation::new(&config).expect("default config is valid");
    sim.set_candidate_query(query);

    for _ in 0..BODIES {
        sim.activate_next();
        sim.step(1.0 / 240.0);
    }
    sim
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("falling_discs_step");
    group.sample_size(20);
    group.throughput(Throughput::Elements(BODIES as u64));

    {
        let mut sim = setup_sim(CandidateQuery::Ancestors);
        group.bench_function("ancestors", |b| {
            b.iter(|| sim.step(1.0 / 60.0));
        });
    }

    {
        let mut sim = setup_sim(CandidateQuery::Overlapping);
        group.bench_function("overlapping", |b| {
            b.iter(|| sim.step(1.0 / 60.0));
        });
    }

    group.finish();
}

fn bench_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("falling_discs_index");
    group.sample_size(20);

    let mut sim = setup_sim(CandidateQuery::Ancestors);
    group.bench_function("rebuild", |b| {
        b.iter(|| sim.rebuild_index());
    });
    group.bench_function("candidate_pairs", |b| {
        b.iter(|| sim.candidate_pairs().len());
    });
    group.bench_function("overlapping_pairs", |b| {
        b.iter(|| sim.overlapping_pairs().len());
    });

    group.finish();
}

criterion_group!(benches, bench_step, bench_index);
criterion_main!(benches);
