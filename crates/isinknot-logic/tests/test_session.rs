//! Integration tests for full game sessions.
//!
//! Exercises: Game → Session → Registry → GameController / ShipEntity / Buttons
//! through the same calls a host makes (click, step, render, build menu).
//!
//! All tests are pure logic, with no window and no audio.

use isinknot_logic::audio::Sound;
use isinknot_logic::config::Tuning;
use isinknot_logic::game::{Game, Phase};
use isinknot_logic::modules::{Condition, ModuleKind};
use isinknot_logic::ship_entity::slot_rect;
use isinknot_logic::state::PendingAction;
use isinknot_logic::surface::{Color, DrawCommand, RecordingSurface};

// ── Helpers ────────────────────────────────────────────────────────────

fn calm_tuning() -> Tuning {
    Tuning {
        damage_rate: 0.0,
        ..Default::default()
    }
}

fn start(tuning: Tuning) -> Game {
    let mut game = Game::with_seed(tuning, 2024);
    game.start_game();
    assert_eq!(game.phase(), Phase::Playing);
    game
}

fn click_slot(game: &mut Game, x: usize, y: usize) -> bool {
    let ctx = game.session().context();
    let center = slot_rect(ctx.canvas, ctx.state.draught, x, y).center();
    game.click(center.x, center.y)
}

fn break_module(game: &mut Game, x: usize, y: usize) {
    let ctx = game.session_mut().context_mut();
    let tuning = ctx.tuning.clone();
    let module = ctx.state.ship.get_module_mut(x, y).unwrap();
    module.apply_damage(module.descriptor().max_health, &tuning);
    module.apply_damage(0.0, &tuning);
    assert_eq!(module.condition, Condition::Broken);
}

fn steps(game: &mut Game, count: usize) {
    for _ in 0..count {
        game.step(100.0);
    }
}

// ── Physics ────────────────────────────────────────────────────────────

#[test]
fn starting_ship_holds_draught_without_flooding() {
    let tuning = Tuning {
        hull_flood_rate: 0.0,
        ..Default::default()
    };
    let mut game = start(tuning);
    steps(&mut game, 600);
    let state = &game.session().context().state;
    assert_eq!(game.phase(), Phase::Playing);
    assert_eq!(state.draught, 10.0);
    assert_eq!(state.elapsed_ms, 60_000.0);
}

#[test]
fn flooded_ship_eventually_sinks() {
    let tuning = Tuning {
        damage_rate: 500.0,
        hull_flood_rate: 100.0,
        ..Default::default()
    };
    let mut game = start(tuning);
    for _ in 0..2000 {
        game.step(100.0);
        if game.phase() == Phase::GameOver {
            break;
        }
    }
    assert_eq!(game.phase(), Phase::GameOver);
    assert_eq!(game.session().registry().names(), vec!["GameOverScreen"]);
    assert_eq!(game.drain_sounds().first(), Some(&Sound::Breaking));
}

// ── Player actions ─────────────────────────────────────────────────────

#[test]
fn build_passes_through_construction() {
    let mut game = start(calm_tuning());
    assert!(click_slot(&mut game, 3, 0));
    game.confirm_build(ModuleKind::Hull).unwrap();

    let kind_at = |game: &Game| {
        game.session()
            .context()
            .state
            .ship
            .get_module(3, 0, None)
            .unwrap()
            .kind
    };
    assert_eq!(kind_at(&game), ModuleKind::Construction);
    assert_eq!(game.drain_sounds(), vec![Sound::Confirm]);

    // Hull build time is 2000 ms.
    steps(&mut game, 19);
    assert_eq!(kind_at(&game), ModuleKind::Construction);
    steps(&mut game, 1);
    assert_eq!(kind_at(&game), ModuleKind::Hull);
    assert_eq!(game.drain_sounds(), vec![Sound::Building]);
    assert!(game.session().registry().count_named("Particle") > 0);

    // Two hulls still balance exactly.
    steps(&mut game, 10);
    assert_eq!(game.session().context().state.draught, 10.0);
}

#[test]
fn repair_resets_flood_after_cooldown() {
    let mut game = start(calm_tuning());
    break_module(&mut game, 2, 0);
    steps(&mut game, 5);
    let flood = game.session().context().state.ship.flood();
    assert!(flood > 0.0);

    assert!(click_slot(&mut game, 2, 0));
    assert_eq!(
        game.session().context().state.pending,
        Some(PendingAction::Repair { x: 2, y: 0 })
    );
    assert_eq!(game.drain_sounds(), vec![Sound::Repairing]);

    steps(&mut game, 9);
    assert!(game.session().context().state.ship.flood() > 0.0);
    steps(&mut game, 1);

    let ship = &game.session().context().state.ship;
    let hull = ship.get_module(2, 0, None).unwrap();
    assert_eq!(hull.condition, Condition::Normal);
    assert_eq!(hull.flood, 0.0);
    assert_eq!(hull.damage, 0.0);
    assert!(!hull.repairing);
}

#[test]
fn clicks_refused_while_action_pending() {
    let mut game = start(calm_tuning());
    // Bail button, then Row button.
    assert!(game.click(40.0, 40.0));
    assert!(!game.click(40.0, 110.0));
    assert_eq!(
        game.session().context().state.pending,
        Some(PendingAction::Bail)
    );
    steps(&mut game, 10);
    assert!(game.click(40.0, 110.0));
    assert_eq!(game.session().context().state.speed_boost, 1.0);
}

#[test]
fn bail_drains_flood() {
    let mut game = start(calm_tuning());
    break_module(&mut game, 2, 0);
    steps(&mut game, 50);
    let before = game.session().context().state.ship.flood();
    assert!(before > 16.0);

    assert!(game.click(40.0, 40.0));
    steps(&mut game, 10);
    let after = game.session().context().state.ship.flood();
    // Ten more ticks of flooding, less one bail.
    assert!(after < before);
}

#[test]
fn rowing_adds_distance() {
    let mut game = start(calm_tuning());
    assert!(game.click(40.0, 110.0));
    steps(&mut game, 10);
    let state = &game.session().context().state;
    assert!(state.distance > 0.0);
    assert_eq!(state.speed_boost, 0.0);
}

// ── Rendering ──────────────────────────────────────────────────────────

#[test]
fn playing_frame_draws_layers_in_order() {
    let mut game = start(calm_tuning());
    let mut surface = RecordingSurface::new(1280.0, 720.0);
    assert!(game.render(0.0, &mut surface));

    let commands = surface.commands();
    assert!(matches!(
        commands[0],
        DrawCommand::FillRect { color, .. } if color == Color::SKY
    ));
    let hull = commands
        .iter()
        .position(|c| matches!(c, DrawCommand::Sprite { name, .. } if name == "hull"))
        .unwrap();
    let water = commands
        .iter()
        .position(|c| matches!(c, DrawCommand::FillRect { color, .. } if *color == Color::WATER))
        .unwrap();
    assert!(hull < water);
    assert!(surface.contains_text("0m"));
    assert!(surface.contains_text("Bail"));
}

#[test]
fn title_and_game_over_screens_render_messages() {
    let mut game = Game::with_seed(Tuning::default(), 5);
    let mut surface = RecordingSurface::new(1280.0, 720.0);
    game.render(0.0, &mut surface);
    assert!(surface.contains_text("click anywhere to start"));

    game.click(1.0, 1.0);
    game.session_mut().context_mut().state.distance = 321.5;
    game.session_mut().context_mut().state.draught = 1000.0;
    game.step(100.0);
    assert_eq!(game.phase(), Phase::GameOver);

    let mut surface = RecordingSurface::new(1280.0, 720.0);
    game.render(16.0, &mut surface);
    assert!(surface.contains_text("you made it 321 meters"));
}
