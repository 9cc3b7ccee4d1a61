//! Fixed timestep driver
//!
//! The host calls [`GameLoop::frame`] once per display frame with a
//! monotonic timestamp. Frame time is clamped, accumulated in integer
//! nanoseconds and spent in whole fixed ticks; the frame is then rendered
//! once, without interpolation.

use std::time::Duration;

use crate::consts::{MAX_FRAME_TIME, SIM_TICK};
use crate::highscores::HighScore;
use crate::persistence::HighScoreStore;
use crate::render::{RenderFrame, Renderer};
use crate::sim::{GameEvent, Phase, TickInput};

/// A game the loop can drive
pub trait Simulation {
    /// Advance one fixed step
    fn tick(&mut self, input: &TickInput, dt: f64);

    /// Describe the current state for drawing
    fn render(&self, frame: &mut RenderFrame);

    fn phase(&self) -> Phase;

    fn score(&self) -> u64;

    /// Round lifecycle events since the last call
    fn drain_events(&mut self) -> Vec<GameEvent>;

    /// Best score to show on the HUD
    fn set_high_score(&mut self, high_score: u64);
}

impl<S: Simulation + ?Sized> Simulation for Box<S> {
    fn tick(&mut self, input: &TickInput, dt: f64) {
        (**self).tick(input, dt);
    }

    fn render(&self, frame: &mut RenderFrame) {
        (**self).render(frame);
    }

    fn phase(&self) -> Phase {
        (**self).phase()
    }

    fn score(&self) -> u64 {
        (**self).score()
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        (**self).drain_events()
    }

    fn set_high_score(&mut self, high_score: u64) {
        (**self).set_high_score(high_score);
    }
}

/// Whether the host should schedule another frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue,
    Stop,
}

/// Clamped accumulator producing whole ticks
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    tick: Duration,
    max_frame: Duration,
    accumulator: Duration,
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(SIM_TICK, MAX_FRAME_TIME)
    }
}

impl FixedTimestep {
    /// A zero tick is bumped to 1ns so the accumulator always drains
    pub fn new(tick: Duration, max_frame: Duration) -> Self {
        Self {
            tick: tick.max(Duration::from_nanos(1)),
            max_frame,
            accumulator: Duration::ZERO,
        }
    }

    /// Tick length in seconds, as handed to the simulation
    pub fn dt(&self) -> f64 {
        self.tick.as_secs_f64()
    }

    pub fn accumulated(&self) -> Duration {
        self.accumulator
    }

    /// Add a frame's elapsed time and return how many ticks to run
    pub fn advance(&mut self, frame_time: Duration) -> u32 {
        self.accumulator += frame_time.min(self.max_frame);
        let mut ticks = 0;
        while self.accumulator >= self.tick {
            self.accumulator -= self.tick;
            ticks += 1;
        }
        ticks
    }

    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }
}

/// Owns a simulation and drives it from host frame callbacks
pub struct GameLoop<S, H> {
    sim: S,
    store: H,
    timestep: FixedTimestep,
    high_score: HighScore,
    last_frame: Option<Duration>,
    running: bool,
    input: TickInput,
    frame: RenderFrame,
    ticks: u64,
}

impl<S: Simulation, H: HighScoreStore> GameLoop<S, H> {
    pub fn new(sim: S, store: H) -> Self {
        Self::with_timestep(sim, store, FixedTimestep::default())
    }

    /// Storage is not touched here; the first read happens when a round starts
    pub fn with_timestep(sim: S, store: H, timestep: FixedTimestep) -> Self {
        Self {
            sim,
            store,
            timestep,
            high_score: HighScore::default(),
            last_frame: None,
            running: true,
            input: TickInput::default(),
            frame: RenderFrame::default(),
            ticks: 0,
        }
    }

    pub fn sim(&self) -> &S {
        &self.sim
    }

    pub fn sim_mut(&mut self) -> &mut S {
        &mut self.sim
    }

    pub fn store(&self) -> &H {
        &self.store
    }

    pub fn high_score(&self) -> u64 {
        self.high_score.best()
    }

    /// Intents for upcoming ticks; one-shots are cleared once a tick sees them
    pub fn input_mut(&mut self) -> &mut TickInput {
        &mut self.input
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Total fixed ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Last rendered frame
    pub fn last_frame(&self) -> &RenderFrame {
        &self.frame
    }

    /// One host frame: run due ticks, then render once
    pub fn frame<R: Renderer + ?Sized>(&mut self, now: Duration, renderer: &mut R) -> FrameOutcome {
        if !self.running {
            return FrameOutcome::Stop;
        }

        let delta = self
            .last_frame
            .map_or(Duration::ZERO, |last| now.saturating_sub(last));
        self.last_frame = Some(now);

        let dt = self.timestep.dt();
        for _ in 0..self.timestep.advance(delta) {
            self.sim.tick(&self.input, dt);
            self.input.clear_one_shots();
            self.ticks += 1;
            self.handle_events();
        }

        self.frame.clear();
        self.sim.render(&mut self.frame);
        renderer.draw(&self.frame);
        FrameOutcome::Continue
    }

    /// Stop scheduling (page hidden, window blurred)
    pub fn pause(&mut self) {
        if self.running {
            log::info!("Game loop paused");
        }
        self.running = false;
        self.input.release_all();
    }

    /// Resume at `now`; the next frame measures its delta from here
    pub fn resume(&mut self, now: Duration) {
        if !self.running {
            log::info!("Game loop resumed");
        }
        self.running = true;
        self.last_frame = Some(now);
    }

    fn handle_events(&mut self) {
        for event in self.sim.drain_events() {
            match event {
                GameEvent::RoundStarted => {
                    self.high_score.merge(self.store.load_high_score());
                    self.sim.set_high_score(self.high_score.best());
                }
                GameEvent::RoundEnded { score } => {
                    if self.high_score.submit(score) {
                        log::info!("New high score: {score}");
                        if let Err(e) = self.store.save_high_score(score) {
                            log::warn!("Failed to save high score: {e}");
                        }
                    }
                    self.sim.set_high_score(self.high_score.best());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::render::NullRenderer;
    use proptest::prelude::*;

    /// Counts ticks; confirm alternates between starting a round and ending
    /// it with a fixed score
    #[derive(Default)]
    struct Counter {
        ticks: u32,
        high: u64,
        confirms: u32,
        in_round: bool,
        events: Vec<GameEvent>,
    }

    impl Simulation for Counter {
        fn tick(&mut self, input: &TickInput, _dt: f64) {
            self.ticks += 1;
            if input.confirm {
                self.confirms += 1;
                self.events.push(if self.in_round {
                    GameEvent::RoundEnded { score: 250 }
                } else {
                    GameEvent::RoundStarted
                });
                self.in_round = !self.in_round;
            }
        }

        fn render(&self, frame: &mut RenderFrame) {
            frame.hud.score = self.ticks as u64;
        }

        fn phase(&self) -> Phase {
            Phase::Playing
        }

        fn score(&self) -> u64 {
            0
        }

        fn drain_events(&mut self) -> Vec<GameEvent> {
            std::mem::take(&mut self.events)
        }

        fn set_high_score(&mut self, high_score: u64) {
            self.high = high_score;
        }
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_exact_tick_counts() {
        let mut step = FixedTimestep::default();
        assert_eq!(step.advance(SIM_TICK * 3), 3);
        assert_eq!(step.advance(SIM_TICK / 2), 0);
        assert_eq!(step.advance(SIM_TICK / 2), 1);
    }

    #[test]
    fn test_frame_time_clamped() {
        let mut step = FixedTimestep::default();
        // A 5 s hitch only counts as 250 ms
        assert_eq!(step.advance(Duration::from_secs(5)), 15);
    }

    #[test]
    fn test_first_frame_runs_no_ticks() {
        let mut game = GameLoop::new(Counter::default(), MemoryStore::default());
        let mut renderer = NullRenderer::default();
        assert_eq!(game.frame(ms(1000), &mut renderer), FrameOutcome::Continue);
        assert_eq!(game.ticks(), 0);
        assert_eq!(renderer.frames, 1);
    }

    #[test]
    fn test_pause_stops_and_resume_resamples() {
        let mut game = GameLoop::new(Counter::default(), MemoryStore::default());
        let mut renderer = NullRenderer::default();
        game.frame(ms(0), &mut renderer);
        game.frame(ms(100), &mut renderer);
        let before = game.ticks();
        assert_eq!(before, 6);

        game.pause();
        assert_eq!(game.frame(ms(200), &mut renderer), FrameOutcome::Stop);

        // Ten seconds hidden: none of it reaches the simulation
        game.resume(ms(10_100));
        game.frame(ms(10_100), &mut renderer);
        assert_eq!(game.ticks(), before);
        game.frame(ms(10_150), &mut renderer);
        assert_eq!(game.ticks(), before + 3);
    }

    #[test]
    fn test_one_shot_input_consumed_once() {
        let mut game = GameLoop::new(Counter::default(), MemoryStore::default());
        let mut renderer = NullRenderer::default();
        game.frame(ms(0), &mut renderer);
        game.input_mut().confirm = true;
        // No tick due yet: the intent waits
        game.frame(ms(1), &mut renderer);
        game.frame(ms(100), &mut renderer);
        assert_eq!(game.sim().confirms, 1);
    }

    #[test]
    fn test_storage_read_only_at_round_start() {
        let mut game = GameLoop::new(Counter::default(), MemoryStore::with_value(100));
        let mut renderer = NullRenderer::default();
        assert_eq!(game.store().load_count(), 0);
        assert_eq!(game.sim().high, 0);

        game.frame(ms(0), &mut renderer);
        game.frame(ms(20), &mut renderer);
        assert_eq!(game.store().load_count(), 0);

        game.input_mut().confirm = true;
        game.frame(ms(40), &mut renderer);
        assert_eq!(game.store().load_count(), 1);
        assert_eq!(game.high_score(), 100);
        assert_eq!(game.sim().high, 100);
    }

    #[test]
    fn test_round_end_persists_new_best_only() {
        let mut game = GameLoop::new(Counter::default(), MemoryStore::with_value(100));
        let mut renderer = NullRenderer::default();
        game.frame(ms(0), &mut renderer);
        for at in [20, 40] {
            game.input_mut().confirm = true;
            game.frame(ms(at), &mut renderer);
        }
        assert_eq!(game.high_score(), 250);
        assert_eq!(game.store().save_count(), 1);
        assert_eq!(game.sim().high, 250);

        // Same score again is not an improvement
        for at in [60, 80] {
            game.input_mut().confirm = true;
            game.frame(ms(at), &mut renderer);
        }
        assert_eq!(game.store().save_count(), 1);
        assert_eq!(game.store().load_high_score(), 250);
    }

    proptest! {
        #[test]
        fn prop_tick_count_independent_of_chunking(
            chunks in prop::collection::vec(0u64..200_000_000, 0..50),
        ) {
            let mut step = FixedTimestep::new(SIM_TICK, Duration::MAX);
            let mut ticks = 0u64;
            let mut total = 0u64;
            for nanos in &chunks {
                ticks += step.advance(Duration::from_nanos(*nanos)) as u64;
                total += nanos;
            }
            prop_assert_eq!(ticks, total / SIM_TICK.as_nanos() as u64);
        }
    }
}
