//! # CADENCE Demo
//!
//! Headless 60 Hz frame loop. Frames are simulated back to back, so the run
//! finishes immediately; each frame's engine cost is still measured.
//!
//! - A limited periodic task spawns a spark every half second and starts a
//!   yoyo fade for it.
//! - An infinite periodic task logs the scene once per simulated second.
//! - A per-tick task with a countdown drives a short intro.
//!
//! Usage: `cadence_demo [path/to/cadence.toml]`. Set `RUST_LOG=debug` for
//! lifecycle logs.

use std::time::{Duration, Instant};

use cadence::{Cadence, CadenceConfig, Stage, StageTick};
use tracing_subscriber::EnvFilter;

/// Simulated display rate.
const FRAME_RATE: u32 = 60;

/// Frames to simulate.
const FRAMES: u32 = 10 * FRAME_RATE;

#[derive(Debug, Default)]
struct Scene {
    intro: f32,
    sparks: u32,
    glow: f32,
    fades_done: u32,
    spawner_done: bool,
}

/// Frame cost statistics, in microseconds.
#[derive(Debug)]
struct FrameCost {
    min_us: u64,
    max_us: u64,
    total_us: u64,
    frames: u64,
}

impl FrameCost {
    fn new() -> Self {
        Self {
            min_us: u64::MAX,
            max_us: 0,
            total_us: 0,
            frames: 0,
        }
    }

    fn record(&mut self, cost: Duration) {
        let us = u64::try_from(cost.as_micros()).unwrap_or(u64::MAX);
        self.min_us = self.min_us.min(us);
        self.max_us = self.max_us.max(us);
        self.total_us = self.total_us.saturating_add(us);
        self.frames += 1;
    }

    fn avg_us(&self) -> u64 {
        self.total_us.checked_div(self.frames).unwrap_or(0)
    }
}

fn load_config() -> CadenceConfig {
    let Some(path) = std::env::args().nth(1) else {
        return CadenceConfig::default();
    };
    CadenceConfig::from_file(&path).unwrap_or_else(|error| {
        tracing::warn!(%error, "using default configuration");
        CadenceConfig::default()
    })
}

fn spawn_spark(tick: &mut StageTick<'_, Scene>) -> cadence::CallbackResult {
    let Stage { motions, state } = tick.env();
    state.sparks += 1;
    let spark = state.sparks;

    let _ = motions
        .get_motion()
        .animate(0.0, 1.0, "quad_out")
        .duration(12)
        .on_tick(|t| {
            let glow = t.values()[0];
            t.state().glow = glow;
            Ok(())
        })
        .then()
        .animate(1.0, 0.6, "sine_in_out")
        .duration(8)
        .on_tick(|t| {
            let glow = t.values()[0];
            t.state().glow = glow;
            Ok(())
        })
        .then()
        .yoyo()
        .repeat(1)
        .on_finish(move |t| {
            t.state().fades_done += 1;
            tracing::debug!(spark, "fade finished");
            Ok(())
        })
        .play();
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config();
    tracing::info!(?config, "starting cadence demo");
    let mut engine = Cadence::new(&config, Scene::default());

    let _ = engine.schedule(
        |tick: &mut StageTick<'_, Scene>| {
            let left = tick.countdown().unwrap_or(0);
            #[allow(clippy::cast_precision_loss)]
            let intro = 1.0 - left as f32 / 30.0;
            tick.env().state.intro = intro;
            Ok(())
        },
        0,
        Some(30),
    );

    let _ = engine
        .schedule_with(spawn_spark, FRAME_RATE / 2, Some(8))
        .on_complete(|stage: &mut Stage<Scene>| {
            stage.state.spawner_done = true;
            tracing::info!(sparks = stage.state.sparks, "spawner finished");
            Ok(())
        });

    let _ = engine.schedule(
        |tick: &mut StageTick<'_, Scene>| {
            let second = tick.frame() / u64::from(FRAME_RATE);
            let scene = &tick.env().state;
            tracing::info!(
                second,
                sparks = scene.sparks,
                glow = scene.glow,
                fades_done = scene.fades_done,
                "scene"
            );
            Ok(())
        },
        FRAME_RATE,
        None,
    );

    let mut cost = FrameCost::new();
    for _ in 0..FRAMES {
        let start = Instant::now();
        engine.tick();
        cost.record(start.elapsed());
    }

    let stats = engine.stats();
    let scene = engine.state();
    tracing::info!(
        frames = stats.frame,
        intro = scene.intro,
        sparks = scene.sparks,
        fades_done = scene.fades_done,
        spawner_done = scene.spawner_done,
        "simulation finished"
    );
    tracing::info!(
        min_us = cost.min_us,
        avg_us = cost.avg_us(),
        max_us = cost.max_us,
        "frame cost"
    );
    tracing::info!(
        runners_active = stats.scheduler.active,
        motions_active = stats.motions.active,
        legs_created = stats.motions.commands.created_total,
        motions_created = stats.motions.motions.created_total,
        "pool usage"
    );
}
