//! I Sink Not Headless Simulation Harness
//!
//! Validates the tuning data and plays scripted sessions through the same
//! `Game` facade the viewer drives. Runs entirely in-process, with no
//! window, no audio and no asset loading.
//!
//! Usage:
//!   cargo run -p isinknot-simtest
//!   cargo run -p isinknot-simtest -- --verbose
//!   cargo run -p isinknot-simtest -- --games 50

use isinknot_logic::art::SpriteAtlas;
use isinknot_logic::audio::{Music, Sound};
use isinknot_logic::config::{validate_tuning, Tuning};
use isinknot_logic::game::{Game, Phase};
use isinknot_logic::modules::{Condition, ModuleKind};
use isinknot_logic::ship_entity::slot_rect;
use isinknot_logic::surface::RecordingSurface;

// ── Tuning data (same JSON the viewer loads) ────────────────────────────
const TUNING_JSON: &str = include_str!("../../../data/tuning.json");

/// Simulated tick length for scripted sessions.
const STEP_MS: f64 = 100.0;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let games = args
        .iter()
        .position(|a| a == "--games")
        .and_then(|i| args.get(i + 1))
        .and_then(|n| n.parse().ok())
        .unwrap_or(20);
    println!("=== I Sink Not Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Tuning data validation
    let tuning = match load_tuning(&mut results) {
        Some(t) => t,
        None => Tuning::default(),
    };

    // 2. Module descriptor table
    results.extend(validate_module_table(verbose));

    // 3. Buoyancy equilibrium
    results.extend(validate_equilibrium(&tuning, verbose));

    // 4. Player actions
    results.extend(validate_actions(&tuning, verbose));

    // 5. Sinking and restart
    results.extend(validate_game_over(&tuning, verbose));

    // 6. Assets referenced by the logic
    results.extend(validate_assets(verbose));

    // 7. Unattended survival sweep
    results.extend(survival_sweep(&tuning, games, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn start(tuning: &Tuning, seed: u64) -> Game {
    let mut game = Game::with_seed(tuning.clone(), seed);
    game.start_game();
    game
}

fn click_slot(game: &mut Game, x: usize, y: usize) -> bool {
    let ctx = game.session().context();
    let center = slot_rect(ctx.canvas, ctx.state.draught, x, y).center();
    game.click(center.x, center.y)
}

fn steps(game: &mut Game, count: usize) {
    for _ in 0..count {
        game.step(STEP_MS);
    }
}

fn kind_at(game: &Game, x: usize, y: usize) -> Option<ModuleKind> {
    game.session()
        .context()
        .state
        .ship
        .get_module(x, y, None)
        .map(|m| m.kind)
}

// ── 1. Tuning Data ──────────────────────────────────────────────────────

fn load_tuning(results: &mut Vec<TestResult>) -> Option<Tuning> {
    println!("--- Tuning Data ---");

    let tuning: Tuning = match serde_json::from_str(TUNING_JSON) {
        Ok(t) => t,
        Err(e) => {
            results.push(TestResult {
                name: "tuning_parse".into(),
                passed: false,
                detail: format!("JSON parse error: {}", e),
            });
            return None;
        }
    };

    let errors = validate_tuning(&tuning);
    results.push(TestResult {
        name: "tuning_valid".into(),
        passed: errors.is_empty(),
        detail: if errors.is_empty() {
            "all values within range".into()
        } else {
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        },
    });

    // The shipped file documents the defaults; drift means one of them is stale.
    results.push(TestResult {
        name: "tuning_matches_defaults".into(),
        passed: tuning == Tuning::default(),
        detail: "data/tuning.json equals Tuning::default()".into(),
    });

    Some(tuning)
}

// ── 2. Module Table ─────────────────────────────────────────────────────

fn validate_module_table(verbose: bool) -> Vec<TestResult> {
    println!("--- Module Table ---");
    let mut results = Vec::new();

    let bad_health: Vec<_> = ModuleKind::all()
        .iter()
        .filter(|k| k.descriptor().max_health <= 0.0)
        .collect();
    results.push(TestResult {
        name: "modules_positive_health".into(),
        passed: bad_health.is_empty(),
        detail: format!("{} kinds without health", bad_health.len()),
    });

    let bad_build: Vec<_> = ModuleKind::buildable()
        .iter()
        .filter(|k| k.is_placeholder() || k.descriptor().build_time_ms <= 0.0)
        .collect();
    results.push(TestResult {
        name: "modules_buildable_take_time".into(),
        passed: bad_build.is_empty(),
        detail: format!(
            "{} buildable kinds, {} bad",
            ModuleKind::buildable().len(),
            bad_build.len()
        ),
    });

    let hull = ModuleKind::Hull.descriptor();
    results.push(TestResult {
        name: "modules_hull_floats".into(),
        passed: hull.buoyancy_capacity > hull.weight && hull.solid,
        detail: format!(
            "hull weight={} capacity={}",
            hull.weight, hull.buoyancy_capacity
        ),
    });

    let placeholders_inert = [ModuleKind::Empty, ModuleKind::Construction]
        .iter()
        .all(|k| !k.is_damageable() && k.descriptor().weight == 0.0);
    results.push(TestResult {
        name: "modules_placeholders_inert".into(),
        passed: placeholders_inert,
        detail: "empty and construction slots weigh nothing and never break".into(),
    });

    if verbose {
        println!("  Module kinds:");
        for kind in ModuleKind::all() {
            let d = kind.descriptor();
            println!(
                "    {:12} weight={:5} fragility={:4} health={:5} build={}ms",
                d.name, d.weight, d.fragility, d.max_health, d.build_time_ms
            );
        }
    }

    results
}

// ── 3. Equilibrium ──────────────────────────────────────────────────────

fn validate_equilibrium(tuning: &Tuning, _verbose: bool) -> Vec<TestResult> {
    println!("--- Buoyancy Equilibrium ---");
    let mut results = Vec::new();

    let calm = Tuning {
        damage_rate: 0.0,
        ..tuning.clone()
    };
    let mut game = start(&calm, 1);
    steps(&mut game, 600);
    let state = &game.session().context().state;
    results.push(TestResult {
        name: "equilibrium_holds".into(),
        passed: state.draught == tuning.initial_draught,
        detail: format!("draught {} after {}s", state.draught, state.elapsed_secs()),
    });

    let mut game = start(&calm, 1);
    game.session_mut().context_mut().state.draught = 40.0;
    steps(&mut game, 600);
    let draught = game.session().context().state.draught;
    results.push(TestResult {
        name: "equilibrium_recovers".into(),
        passed: (draught - tuning.initial_draught).abs() < 0.5,
        detail: format!("draught settled at {:.3} from 40", draught),
    });

    results
}

// ── 4. Player Actions ───────────────────────────────────────────────────

fn validate_actions(tuning: &Tuning, verbose: bool) -> Vec<TestResult> {
    println!("--- Player Actions ---");
    let mut results = Vec::new();
    let calm = Tuning {
        damage_rate: 0.0,
        ..tuning.clone()
    };
    let column = calm.initial_hull_column;

    // Build a hull beside the starting one.
    let mut game = start(&calm, 2);
    let opened = click_slot(&mut game, column + 1, 0) && game.build_menu().is_some();
    let confirmed = opened && game.confirm_build(ModuleKind::Hull).is_ok();
    let under_construction = kind_at(&game, column + 1, 0) == Some(ModuleKind::Construction);
    let build_ticks = (ModuleKind::Hull.descriptor().build_time_ms / STEP_MS).ceil() as usize;
    steps(&mut game, build_ticks);
    let built = kind_at(&game, column + 1, 0) == Some(ModuleKind::Hull);
    results.push(TestResult {
        name: "action_build_hull".into(),
        passed: confirmed && under_construction && built,
        detail: format!(
            "menu={} construction={} built after {} ticks={}",
            opened, under_construction, build_ticks, built
        ),
    });
    let sounds = game.drain_sounds();
    results.push(TestResult {
        name: "action_build_sounds".into(),
        passed: sounds == vec![Sound::Confirm, Sound::Building],
        detail: format!("{:?}", sounds),
    });

    // Break the starting hull, let it flood, then repair it.
    let mut game = start(&calm, 3);
    {
        let ctx = game.session_mut().context_mut();
        let tuning = ctx.tuning.clone();
        if let Some(hull) = ctx.state.ship.get_module_mut(column, 0) {
            let max = hull.descriptor().max_health;
            hull.apply_damage(max, &tuning);
            hull.apply_damage(0.0, &tuning);
        }
    }
    steps(&mut game, 20);
    let flooded = game.session().context().state.ship.flood();
    let clicked = click_slot(&mut game, column, 0);
    let repair_ticks = (calm.repair_time_ms / STEP_MS).ceil() as usize;
    steps(&mut game, repair_ticks);
    let ship = &game.session().context().state.ship;
    let repaired = ship
        .get_module(column, 0, None)
        .map(|m| m.condition == Condition::Normal && m.flood == 0.0)
        .unwrap_or(false);
    results.push(TestResult {
        name: "action_repair_hull".into(),
        passed: flooded > 0.0 && clicked && repaired,
        detail: format!("flood {:.2} before repair, repaired={}", flooded, repaired),
    });

    // Only one action at a time.
    let mut game = start(&calm, 4);
    let first = game.click(40.0, 40.0);
    let second = game.click(40.0, 110.0);
    results.push(TestResult {
        name: "action_single_pending".into(),
        passed: first && !second,
        detail: format!("bail={} row during cooldown={}", first, second),
    });

    // Rowing moves the ship.
    let mut game = start(&calm, 5);
    game.click(40.0, 110.0);
    steps(&mut game, 10);
    let distance = game.session().context().state.distance;
    results.push(TestResult {
        name: "action_row_distance".into(),
        passed: distance > 0.0,
        detail: format!("{:.1}m after one row", distance),
    });

    if verbose {
        println!("  Build ticks: {}, repair ticks: {}", build_ticks, repair_ticks);
    }

    results
}

// ── 5. Game Over ────────────────────────────────────────────────────────

fn validate_game_over(tuning: &Tuning, _verbose: bool) -> Vec<TestResult> {
    println!("--- Sinking & Restart ---");
    let mut results = Vec::new();

    let stormy = Tuning {
        damage_rate: 500.0,
        hull_flood_rate: 100.0,
        ..tuning.clone()
    };
    let mut game = start(&stormy, 6);
    let mut ticks = 0;
    while game.phase() == Phase::Playing && ticks < 5000 {
        game.step(STEP_MS);
        ticks += 1;
    }
    results.push(TestResult {
        name: "game_over_on_sink".into(),
        passed: game.phase() == Phase::GameOver,
        detail: format!("phase {:?} after {} ticks", game.phase(), ticks),
    });

    let mut surface = RecordingSurface::new(1280.0, 720.0);
    game.render(0.0, &mut surface);
    results.push(TestResult {
        name: "game_over_message".into(),
        passed: surface.contains_text("blub blub"),
        detail: surface.texts().next().unwrap_or("<nothing drawn>").to_string(),
    });

    game.click(10.0, 10.0);
    let restarted = game.phase() == Phase::Playing
        && game.session().context().state.draught == stormy.initial_draught
        && game.music() == Music::Main;
    results.push(TestResult {
        name: "game_over_restart".into(),
        passed: restarted,
        detail: "click after sinking starts a fresh session".into(),
    });

    results
}

// ── 6. Assets ───────────────────────────────────────────────────────────

fn validate_assets(_verbose: bool) -> Vec<TestResult> {
    println!("--- Assets ---");
    let mut results = Vec::new();

    let bad_sounds: Vec<_> = Sound::all()
        .iter()
        .filter(|s| !s.path().ends_with(".mp3") || !(0.0..=1.0).contains(&s.volume()))
        .collect();
    results.push(TestResult {
        name: "assets_sound_cues".into(),
        passed: bad_sounds.is_empty(),
        detail: format!("{} cues, {} bad", Sound::all().len(), bad_sounds.len()),
    });

    let atlas = SpriteAtlas::with_ship_sheet();
    let sheet_ok = ["hull", "propeller", "sail"]
        .iter()
        .all(|name| atlas.get(name).is_some());
    let fallback: Vec<_> = ModuleKind::all()
        .iter()
        .filter_map(|k| k.descriptor().sprite)
        .filter(|name| atlas.get(name).is_none())
        .collect();
    results.push(TestResult {
        name: "assets_ship_sheet".into(),
        passed: sheet_ok,
        detail: format!("colour fallback for: {}", fallback.join(", ")),
    });

    results
}

// ── 7. Survival Sweep ───────────────────────────────────────────────────

fn survival_sweep(tuning: &Tuning, games: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Survival Sweep ({} unattended games) ---", games);
    let mut results = Vec::new();
    // Ten simulated minutes per game.
    let max_ticks = 6000;

    let mut survived = Vec::new();
    let mut stuck = 0;
    for seed in 0..games {
        let mut game = start(tuning, seed);
        let mut ticks = 0;
        while game.phase() == Phase::Playing && ticks < max_ticks {
            game.step(STEP_MS);
            ticks += 1;
        }
        if game.phase() == Phase::Playing {
            stuck += 1;
        }
        survived.push(ticks as f64 * STEP_MS / 1000.0);
    }

    let mean = if survived.is_empty() {
        0.0
    } else {
        survived.iter().sum::<f64>() / survived.len() as f64
    };
    results.push(TestResult {
        name: "sweep_unattended_ships_sink".into(),
        passed: stuck == 0,
        detail: format!(
            "{} of {} still afloat after {}s, mean survival {:.1}s",
            stuck,
            games,
            max_ticks as f64 * STEP_MS / 1000.0,
            mean
        ),
    });

    if verbose {
        for (seed, secs) in survived.iter().enumerate() {
            println!("    seed {:3}: {:.1}s", seed, secs);
        }
    }

    results
}
