//! End-to-end round scenarios through the public API

use std::time::Duration;

use glam::DVec2;
use roid_rush::asteroids::{self, AsteroidsGame, Shot, SizeClass};
use roid_rush::consts::{SIM_DT, SIM_TICK};
use roid_rush::defense::{self, DefenseGame};
use roid_rush::persistence::{HighScoreStore, MemoryStore};
use roid_rush::render::NullRenderer;
use roid_rush::sim::{Phase, TickInput};
use roid_rush::tuning::{AsteroidsTuning, DefenseTuning};
use roid_rush::{GameLoop, Settings, Simulation};

fn confirm() -> TickInput {
    TickInput {
        confirm: true,
        ..Default::default()
    }
}

fn asteroids_round(seed: u64) -> AsteroidsGame {
    let mut game = AsteroidsGame::new(seed, AsteroidsTuning::default(), Settings::default());
    asteroids::tick(&mut game, &confirm(), SIM_DT);
    asteroids::tick(&mut game, &confirm(), SIM_DT);
    assert_eq!(game.phase, Phase::Playing);
    game
}

#[test]
fn test_first_rock_after_delay_and_interval() {
    let mut game = asteroids_round(11);
    // First delay (1 s) plus one ramped interval lands just before 6 s
    for _ in 0..370 {
        asteroids::tick(&mut game, &TickInput::default(), SIM_DT);
    }
    assert_eq!(game.phase, Phase::Playing);
    assert_eq!(game.active_rocks().count(), 1);
}

#[test]
fn test_bullet_through_large_rock_centre() {
    let mut game = asteroids_round(5);
    let rock = game.spawn_rock(DVec2::new(300.0, 150.0), DVec2::ZERO, SizeClass::Large);
    game.spawn_bullet(Shot {
        pos: DVec2::new(300.0, 100.0),
        vel: DVec2::new(0.0, 725.0),
        radius: 2.0,
    });
    let before = game.score;
    asteroids::tick(&mut game, &TickInput::default(), SIM_DT);

    assert!(game.rock(rock).is_none_or(|r| !r.body.active));
    let active: Vec<_> = game.active_rocks().collect();
    assert_eq!(active.len(), 3);
    assert!(active.iter().all(|r| r.size == SizeClass::Medium));
    assert_eq!(game.score, before + 15);
}

#[test]
fn test_defense_round_until_bases_fall() {
    let mut game = DefenseGame::new(2, DefenseTuning::default(), Settings::default());
    defense::tick(&mut game, &confirm(), SIM_DT);
    defense::tick(&mut game, &confirm(), SIM_DT);
    assert_eq!(game.phase, Phase::Playing);

    // Missile into a meteor's path scores a single kill
    let target = DVec2::new(480.0, 250.0);
    let meteor = game.spawn_meteor(target, target + DVec2::Y);
    if let Ok(i) = game.meteors.binary_search_by_key(&meteor, |m| m.id) {
        game.meteors[i].body.vel = DVec2::ZERO;
    }
    let aim = TickInput {
        aim: Some(target),
        ..Default::default()
    };
    defense::tick(&mut game, &aim, SIM_DT);
    for _ in 0..90 {
        defense::tick(&mut game, &TickInput::default(), SIM_DT);
    }
    assert!(game.meteor(meteor).is_none_or(|m| !m.body.active));
    assert_eq!(game.score, 10);

    // Nobody defends: meteors eventually level every base
    for _ in 0..(60 * 600) {
        defense::tick(&mut game, &TickInput::default(), SIM_DT);
        if game.phase != Phase::Playing {
            break;
        }
    }
    assert_eq!(game.phase, Phase::Exploding);
    assert_eq!(game.bases_remaining(), 0);
    assert!(game.meteors.is_empty());
}

#[test]
fn test_game_loop_saves_high_score_at_round_end() {
    let sim = AsteroidsGame::new(3, AsteroidsTuning::default(), Settings::default());
    let mut game = GameLoop::new(sim, MemoryStore::with_value(10));
    game.frame(Duration::ZERO, &mut NullRenderer::default());

    let mut renderer = NullRenderer::default();
    let mut now = Duration::ZERO;
    let mut step = |game: &mut GameLoop<AsteroidsGame, MemoryStore>| {
        now += SIM_TICK;
        game.frame(now, &mut renderer);
    };

    for _ in 0..2 {
        game.input_mut().confirm = true;
        step(&mut game);
    }
    assert_eq!(game.sim().phase(), Phase::Playing);
    assert_eq!(game.sim().high_score, 10);

    let hero = game.sim().hero.body.pos;
    game.sim_mut().score = 42;
    game.sim_mut()
        .spawn_rock(hero + DVec2::new(30.0, 0.0), DVec2::ZERO, SizeClass::Medium);
    step(&mut game);

    assert_eq!(game.sim().phase(), Phase::Exploding);
    assert_eq!(game.high_score(), 42);
    assert_eq!(game.store().load_high_score(), 42);
    assert_eq!(game.store().save_count(), 1);
    assert_eq!(game.sim().high_score, 42);
}
