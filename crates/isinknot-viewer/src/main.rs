//! I Sink Not Viewer - Bevy window host for the simulation
//!
//! The logic crate draws into a `RecordingSurface`; each frame this host
//! replays the recorded commands as sprites, gizmos and text.
//!
//! Controls:
//!   Left click   interact (title, buttons, ship slots)
//!   1-9          pick an option from the open build menu
//!   Esc          close the build menu
//!   D            toggle the debug overlay
//!   Space        pause (debug mode only)

use bevy::audio::Volume;
use bevy::prelude::*;
use bevy::sprite::Anchor;
use bevy::window::{PrimaryWindow, WindowResized};
use isinknot_logic::audio::Music;
use isinknot_logic::config::{validate_tuning, Tuning};
use isinknot_logic::constants::{CANVAS_HEIGHT, CANVAS_WIDTH};
use isinknot_logic::game::Game;
use isinknot_logic::input::Key;
use isinknot_logic::surface::{Color as CanvasColor, DrawCommand, RecordingSurface, TextAlign};
use isinknot_logic::vector::Rect as CanvasRect;

const TUNING_PATH: &str = "data/tuning.json";
const SHIP_SHEET: &str = "art/ship-spritesheet.png";

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "I Sink Not".to_string(),
                resolution: (CANVAS_WIDTH, CANVAS_HEIGHT).into(),
                present_mode: bevy::window::PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(MusicState::default())
        .add_systems(Startup, (setup_game, setup))
        .add_systems(
            Update,
            (
                resize_canvas,
                handle_pointer,
                handle_keys,
                update_game,
                render_frame,
                play_sounds,
                play_music,
                update_menu_text,
            )
                .chain(),
        )
        .run();
}

/// Tuning from `data/tuning.json` when present and valid, defaults otherwise.
fn load_tuning() -> Tuning {
    let text = match std::fs::read_to_string(TUNING_PATH) {
        Ok(text) => text,
        Err(e) => {
            info!("No tuning file at {} ({}), using defaults", TUNING_PATH, e);
            return Tuning::default();
        }
    };
    let tuning: Tuning = match serde_json::from_str(&text) {
        Ok(t) => t,
        Err(e) => {
            warn!("Failed to parse {}: {}", TUNING_PATH, e);
            return Tuning::default();
        }
    };
    let errors = validate_tuning(&tuning);
    if !errors.is_empty() {
        for error in &errors {
            warn!("Invalid tuning: {}", error);
        }
        return Tuning::default();
    }
    tuning
}

struct GameWrapper(Game);

/// The surface the game draws into each frame.
struct Frame(RecordingSurface);

#[derive(Resource, Default)]
struct MusicState {
    playing: Option<(Music, Entity)>,
}

#[derive(Resource)]
struct ShipSheet(Handle<Image>);

// Marker for entities rebuilt from the draw list every frame
#[derive(Component)]
struct FrameItem;

#[derive(Component)]
struct MenuText;

/// Loads tuning once logging is up, then creates the game.
fn setup_game(world: &mut World) {
    let tuning = load_tuning();
    world.insert_non_send_resource(GameWrapper(Game::new(tuning)));
    world.insert_non_send_resource(Frame(RecordingSurface::new(CANVAS_WIDTH, CANVAS_HEIGHT)));
}

fn setup(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands.spawn(Camera2d);
    commands.insert_resource(ShipSheet(asset_server.load(SHIP_SHEET)));

    commands.spawn((
        Text2d::new(""),
        TextFont {
            font_size: 18.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Anchor::TopLeft,
        Transform::from_xyz(0.0, 0.0, 900.0),
        MenuText,
    ));

    info!("Viewer ready");
}

// ── Coordinates ─────────────────────────────────────────────────────────

/// Canvas space has its origin top-left with y down; world space is centred
/// with y up.
fn canvas_to_world(canvas: Vec2, x: f32, y: f32) -> Vec2 {
    Vec2::new(x - canvas.x / 2.0, canvas.y / 2.0 - y)
}

fn world_to_canvas(canvas: Vec2, world: Vec2) -> Vec2 {
    Vec2::new(world.x + canvas.x / 2.0, canvas.y / 2.0 - world.y)
}

fn rect_center(canvas: Vec2, rect: &CanvasRect) -> Vec2 {
    canvas_to_world(
        canvas,
        rect.x + rect.width / 2.0,
        rect.y + rect.height / 2.0,
    )
}

fn to_color(c: CanvasColor) -> Color {
    Color::srgba(c.r, c.g, c.b, c.a)
}

fn canvas_size(game: &Game) -> Vec2 {
    let c = game.canvas();
    Vec2::new(c.x, c.y)
}

// ── Systems ─────────────────────────────────────────────────────────────

fn resize_canvas(
    mut events: EventReader<WindowResized>,
    mut game: NonSendMut<GameWrapper>,
    mut frame: NonSendMut<Frame>,
) {
    for event in events.read() {
        game.0.set_canvas(event.width, event.height);
        frame.0.resize(event.width, event.height);
    }
}

fn handle_pointer(
    mut game: NonSendMut<GameWrapper>,
    camera_query: Query<(&Camera, &GlobalTransform)>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    mouse: Res<ButtonInput<MouseButton>>,
) {
    let Ok(window) = window_query.get_single() else {
        return;
    };
    let Some(cursor_pos) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_transform)) = camera_query.get_single() else {
        return;
    };
    let Ok(world_pos) = camera.viewport_to_world_2d(camera_transform, cursor_pos) else {
        return;
    };

    let pos = world_to_canvas(canvas_size(&game.0), world_pos);
    game.0.pointer_move(pos.x, pos.y);
    if mouse.just_pressed(MouseButton::Left) {
        game.0.click(pos.x, pos.y);
    }
}

const DIGIT_KEYS: [KeyCode; 9] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
    KeyCode::Digit9,
];

fn handle_keys(keyboard: Res<ButtonInput<KeyCode>>, mut game: NonSendMut<GameWrapper>) {
    if keyboard.just_pressed(KeyCode::KeyD) {
        game.0.key_down(Key::Debug);
    }
    if keyboard.just_pressed(KeyCode::Space) {
        game.0.key_down(Key::Pause);
    }

    let Some(menu) = game.0.build_menu().cloned() else {
        return;
    };
    if keyboard.just_pressed(KeyCode::Escape) {
        game.0.cancel_build();
        return;
    }
    for (key, kind) in DIGIT_KEYS.iter().zip(menu.options.iter()) {
        if keyboard.just_pressed(*key) {
            if let Err(e) = game.0.confirm_build(*kind) {
                warn!("Build refused: {}", e);
            }
            return;
        }
    }
}

fn update_game(time: Res<Time>, mut game: NonSendMut<GameWrapper>) {
    game.0.update(time.elapsed_secs_f64() * 1000.0);
}

fn render_frame(
    mut commands: Commands,
    time: Res<Time>,
    mut game: NonSendMut<GameWrapper>,
    mut frame: NonSendMut<Frame>,
    sheet: Res<ShipSheet>,
    old_items: Query<Entity, With<FrameItem>>,
    mut gizmos: Gizmos,
) {
    for entity in &old_items {
        commands.entity(entity).despawn();
    }

    let surface = &mut frame.0;
    surface.clear();
    if !game.0.render(time.elapsed_secs_f64() * 1000.0, surface) {
        return;
    }
    let canvas = canvas_size(&game.0);

    for (i, command) in surface.commands().iter().enumerate() {
        // Keep draw order: later commands sit in front.
        let z = i as f32 * 0.01;
        match command {
            DrawCommand::FillRect { rect, color } => {
                let center = rect_center(canvas, rect);
                commands.spawn((
                    Sprite::from_color(to_color(*color), Vec2::new(rect.width, rect.height)),
                    Transform::from_xyz(center.x, center.y, z),
                    FrameItem,
                ));
            }
            DrawCommand::StrokeRect { rect, color, .. } => {
                gizmos.rect_2d(
                    Isometry2d::from_translation(rect_center(canvas, rect)),
                    Vec2::new(rect.width, rect.height),
                    to_color(*color),
                );
            }
            DrawCommand::FillCircle {
                center,
                radius,
                color,
            } => {
                let c = canvas_to_world(canvas, center.x, center.y);
                gizmos.circle_2d(Isometry2d::from_translation(c), *radius, to_color(*color));
            }
            DrawCommand::Text {
                text,
                pos,
                font_size,
                color,
                align,
            } => {
                let anchor = match align {
                    TextAlign::Left => Anchor::BottomLeft,
                    TextAlign::Center => Anchor::BottomCenter,
                    TextAlign::Right => Anchor::BottomRight,
                };
                let p = canvas_to_world(canvas, pos.x, pos.y);
                commands.spawn((
                    Text2d::new(text.clone()),
                    TextFont {
                        font_size: *font_size,
                        ..default()
                    },
                    TextColor(to_color(*color)),
                    anchor,
                    Transform::from_xyz(p.x, p.y, z),
                    FrameItem,
                ));
            }
            DrawCommand::Sprite { source, dest, .. } => {
                let center = rect_center(canvas, dest);
                commands.spawn((
                    Sprite {
                        image: sheet.0.clone(),
                        rect: Some(Rect::new(
                            source.x,
                            source.y,
                            source.x + source.width,
                            source.y + source.height,
                        )),
                        custom_size: Some(Vec2::new(dest.width, dest.height)),
                        ..default()
                    },
                    Transform::from_xyz(center.x, center.y, z),
                    FrameItem,
                ));
            }
        }
    }
}

fn play_sounds(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut game: NonSendMut<GameWrapper>,
) {
    for sound in game.0.drain_sounds() {
        commands.spawn((
            AudioPlayer::<AudioSource>(asset_server.load(sound.path())),
            PlaybackSettings::DESPAWN.with_volume(Volume::new(sound.volume())),
        ));
    }
}

fn play_music(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    game: NonSend<GameWrapper>,
    mut state: ResMut<MusicState>,
) {
    let wanted = game.0.music();
    if let Some((current, _)) = state.playing {
        if current == wanted {
            return;
        }
    }
    if let Some((_, entity)) = state.playing.take() {
        commands.entity(entity).despawn();
    }
    info!("Music: {:?}", wanted);
    let entity = commands
        .spawn((
            AudioPlayer::<AudioSource>(asset_server.load(wanted.path())),
            PlaybackSettings::LOOP,
        ))
        .id();
    state.playing = Some((wanted, entity));
}

fn update_menu_text(
    game: NonSend<GameWrapper>,
    mut query: Query<(&mut Text2d, &mut Transform), With<MenuText>>,
) {
    let canvas = canvas_size(&game.0);
    let text = match game.0.build_menu() {
        Some(menu) => {
            let mut lines = vec![format!("Build at ({}, {}):", menu.x, menu.y)];
            lines.extend(menu.labels());
            lines.push("Esc: cancel".to_string());
            lines.join("\n")
        }
        None => String::new(),
    };
    let corner = canvas_to_world(canvas, canvas.x / 2.0 - 100.0, 40.0);
    for (mut menu_text, mut transform) in &mut query {
        **menu_text = text.clone();
        transform.translation.x = corner.x;
        transform.translation.y = corner.y;
    }
}
