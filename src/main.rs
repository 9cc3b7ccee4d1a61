//! Roid Rush entry point
//!
//! The browser build starts through `platform::start_game`. Natively this is
//! a headless runner: it plays one game with a simple autopilot at a fixed
//! seed and logs the outcome.
//!
//! Usage: `roid-rush [asteroids|defense] [seed] [seconds] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;
    use std::time::Duration;

    use glam::DVec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use roid_rush::consts::SIM_TICK;
    use roid_rush::persistence::JsonFileStore;
    use roid_rush::platform::GameKind;
    use roid_rush::render::NullRenderer;
    use roid_rush::sim::{Phase, TickInput};
    use roid_rush::{GameLoop, Settings, Simulation, Tuning};

    /// Seconds between autopilot missile shots
    const AIM_INTERVAL: f64 = 0.4;

    pub struct Args {
        pub kind: GameKind,
        pub seed: u64,
        pub seconds: f64,
        pub tuning: Option<PathBuf>,
    }

    pub fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
        let kind = match args.next() {
            Some(s) => s.parse()?,
            None => GameKind::Asteroids,
        };
        let seed = match args.next() {
            Some(s) => s.parse().map_err(|e| format!("bad seed '{s}': {e}"))?,
            None => 1,
        };
        let seconds = match args.next() {
            Some(s) => s.parse().map_err(|e| format!("bad duration '{s}': {e}"))?,
            None => 60.0,
        };
        Ok(Args {
            kind,
            seed,
            seconds,
            tuning: args.next().map(PathBuf::from),
        })
    }

    /// Held and one-shot intents for the next frame
    fn autopilot(kind: GameKind, phase: Phase, rng: &mut Pcg32, playfield: DVec2, aim_due: bool, input: &mut TickInput) {
        if phase != Phase::Playing {
            input.release_all();
            input.confirm = phase != Phase::Exploding;
            return;
        }
        match kind {
            GameKind::Asteroids => {
                input.fire = true;
                input.rotate_left = true;
                input.forward = rng.random::<f64>() < 0.3;
            }
            GameKind::Defense => {
                if aim_due {
                    input.aim = Some(DVec2::new(
                        rng.random_range(0.0..playfield.x),
                        rng.random_range(0.2 * playfield.y..0.7 * playfield.y),
                    ));
                }
            }
        }
    }

    pub fn run(args: Args) -> Result<(), String> {
        let tuning = match &args.tuning {
            Some(path) => Tuning::load(path).map_err(|e| format!("{}: {e}", path.display()))?,
            None => Tuning::default(),
        };
        let playfield = args.kind.playfield(&tuning);
        let store = JsonFileStore::new(std::env::temp_dir().join(format!("{}.json", args.kind.high_score_key())));
        log::info!("High scores stored in {}", store.path().display());

        let sim = args.kind.build(args.seed, &tuning, Settings::default());
        let mut game = GameLoop::new(sim, store);
        let mut renderer = NullRenderer::default();
        let mut rng = Pcg32::seed_from_u64(args.seed ^ 0x5eed);

        let frames = (args.seconds / SIM_TICK.as_secs_f64()).ceil() as u64;
        let aim_every = (AIM_INTERVAL / SIM_TICK.as_secs_f64()).round().max(1.0) as u64;
        let mut rounds = 0u32;
        let mut last_phase = game.sim().phase();

        for frame in 0..=frames {
            let phase = game.sim().phase();
            if phase != last_phase {
                log::debug!("{last_phase:?} -> {phase:?} at frame {frame}");
                if phase == Phase::GameOver {
                    rounds += 1;
                    log::info!("Round {rounds} over with score {}", game.sim().score());
                }
                last_phase = phase;
            }
            autopilot(args.kind, phase, &mut rng, playfield, frame % aim_every == 0, game.input_mut());
            game.frame(frame_time(frame), &mut renderer);
        }

        log::info!(
            "{} finished: {} ticks, {rounds} rounds, score {}, best {}",
            args.kind,
            game.ticks(),
            game.sim().score(),
            game.high_score()
        );
        println!(
            "{}: rounds={rounds} score={} best={}",
            args.kind,
            game.sim().score(),
            game.high_score()
        );
        Ok(())
    }

    fn frame_time(frame: u64) -> Duration {
        Duration::from_nanos(SIM_TICK.as_nanos() as u64 * frame)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Roid Rush (native) starting...");
    log::info!("Native mode runs headless - build for wasm32 to play in a browser");

    let result = headless::parse_args(std::env::args().skip(1)).and_then(headless::run);
    if let Err(e) = result {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::start_game, this is just to satisfy the compiler
}
