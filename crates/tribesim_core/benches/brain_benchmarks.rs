use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tribesim_core::brain::{Brain, BRAIN_INPUTS};
use tribesim_core::math::XorShiftRng;
use tribesim_core::World;
use tribesim_data::OrganismKind;

/// Benchmark one forward pass with typical inputs.
fn bench_brain_predict(c: &mut Criterion) {
    let mut rng = XorShiftRng::new(42);
    let brain = Brain::new_random(16, &mut rng);
    let inputs = [0.5; BRAIN_INPUTS];

    c.bench_function("brain_predict", |b| {
        b.iter(|| {
            let outputs = brain.predict(black_box(&inputs));
            black_box(outputs)
        })
    });
}

/// Benchmark a forward pass with saturated inputs.
fn bench_brain_predict_extreme(c: &mut Criterion) {
    let mut rng = XorShiftRng::new(42);
    let brain = Brain::new_random(16, &mut rng);
    let inputs = [1.0; BRAIN_INPUTS];

    c.bench_function("brain_predict_extreme", |b| {
        b.iter(|| {
            let outputs = brain.predict(black_box(&inputs));
            black_box(outputs)
        })
    });
}

fn bench_brain_creation(c: &mut Criterion) {
    let mut rng = XorShiftRng::new(42);

    c.bench_function("brain_creation", |b| {
        b.iter(|| {
            let brain = Brain::new_random(16, &mut rng);
            black_box(brain)
        })
    });
}

fn bench_brain_mutation(c: &mut Criterion) {
    let mut rng = XorShiftRng::new(42);
    let mut brain = Brain::new_random(16, &mut rng);

    c.bench_function("brain_mutate", |b| {
        b.iter(|| {
            let changed = brain.mutate(0.1, 0.2, &mut rng);
            black_box(changed)
        })
    });
}

/// Full world tick with a few hundred deciding organisms.
fn bench_world_tick(c: &mut Criterion) {
    let mut world = World::init(2048, 7).expect("world");
    for g in 0..4 {
        let group = world.create_group().expect("group");
        for i in 0..40 {
            let x = 20.0 + g as f32 * 40.0 + (i % 8) as f32;
            let z = 20.0 + (i / 8) as f32;
            world
                .spawn_organism(OrganismKind::Tribal, x, 0.0, z, Some(group))
                .expect("member");
        }
    }
    for i in 0..200 {
        let kind = if i % 5 == 0 {
            OrganismKind::Carnivore
        } else {
            OrganismKind::Herbivore
        };
        let x = (i * 37 % 180) as f32 + 10.0;
        let z = (i * 53 % 180) as f32 + 10.0;
        world.spawn_organism(kind, x, 0.0, z, None).expect("animal");
    }

    c.bench_function("world_tick_360", |b| {
        b.iter(|| {
            world.update(black_box(0.1));
        })
    });
}

criterion_group!(
    benches,
    bench_brain_predict,
    bench_brain_predict_extreme,
    bench_brain_creation,
    bench_brain_mutation,
    bench_world_tick
);
criterion_main!(benches);
