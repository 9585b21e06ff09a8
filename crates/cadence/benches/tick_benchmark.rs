//! # Frame Tick Benchmark
//!
//! Cost of one scheduler tick with 10 000 runners and of one motion tick
//! with 1 000 playing motions. Both must fit comfortably in a 16.6ms frame.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cadence::motion::{MotionGroup, MotionTick};
use cadence::scheduler::{Scheduler, Tick};

const RUNNER_COUNT: u32 = 10_000;
const MOTION_COUNT: u32 = 1_000;

#[derive(Default)]
struct Counters {
    fired: u64,
    sum: f32,
}

fn bench_scheduler_tick(c: &mut Criterion) {
    let mut scheduler: Scheduler<Counters> = Scheduler::new(RUNNER_COUNT as usize);
    let mut counters = Counters::default();

    // A mix of every runner kind. Limited runners get a budget that outlasts the run.
    for i in 0..RUNNER_COUNT {
        let task = |tick: &mut Tick<'_, Counters>| {
            tick.env().fired += 1;
            Ok(())
        };
        let wait = i % 4;
        let limit = (i % 3 == 0).then_some(u32::MAX);
        let _ = scheduler.on(task, wait, limit);
    }

    c.bench_function("scheduler_tick_10k_runners", |b| {
        b.iter(|| {
            scheduler.update(&mut counters);
            black_box(counters.fired)
        });
    });
}

fn bench_motion_tick(c: &mut Criterion) {
    let mut group: MotionGroup<Counters> = MotionGroup::new(4 * MOTION_COUNT as usize, MOTION_COUNT as usize, 60);
    let mut counters = Counters::default();

    for i in 0..MOTION_COUNT {
        #[allow(clippy::cast_precision_loss)]
        let offset = i as f32;
        let _ = group
            .get_motion()
            .animate(offset, offset + 100.0, "cubic_in_out")
            .animate(0.0, 1.0, "elastic_out")
            .animate(1.0, 0.0, "bounce_out")
            .duration(240)
            .on_tick(|tick: &mut MotionTick<'_, Counters>| {
                let first = tick.values()[0];
                tick.state().sum += first;
                Ok(())
            })
            .then()
            .animate(offset + 100.0, offset, "sine_in_out")
            .duration(240)
            .then()
            .yoyo()
            .repeat(u32::MAX)
            .play();
    }

    c.bench_function("motion_tick_1k_motions", |b| {
        b.iter(|| {
            group.update(&mut counters);
            black_box(counters.sum)
        });
    });
}

criterion_group!(benches, bench_scheduler_tick, bench_motion_tick);
criterion_main!(benches);
