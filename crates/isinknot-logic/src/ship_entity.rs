//! The ship as an entity: ticks the grid, turns grid events into sounds and
//! particles, draws the modules, and routes clicks to repairs and build menus.

use crate::actions;
use crate::audio::Sound;
use crate::clock::{bob_offset, FrameInfo};
use crate::constants::{bob, layers, MODULE_HEIGHT, MODULE_WIDTH, SHIP_ORIGIN_X, WATER_HEIGHT};
use crate::context::GameContext;
use crate::entity::{Entity, EntityFlags};
use crate::input::BuildMenu;
use crate::modules::{Condition, ModuleKind, ShipModule, TickEnv};
use crate::particles::EffectDef;
use crate::ship::ShipEvent;
use crate::surface::{Color, Surface, TextAlign};
use crate::vector::{Rect, Vec2};

/// Screen rectangle of grid slot (x, y) at rest (no bob).
pub fn slot_rect(canvas: Vec2, draught: f32, x: usize, y: usize) -> Rect {
    let bottom = canvas.y - WATER_HEIGHT + draught;
    Rect::new(
        SHIP_ORIGIN_X + x as f32 * MODULE_WIDTH,
        bottom - (y + 1) as f32 * MODULE_HEIGHT,
        MODULE_WIDTH,
        MODULE_HEIGHT,
    )
}

/// Fallback fill for kinds without art.
fn module_color(kind: ModuleKind) -> Color {
    match kind {
        ModuleKind::Empty => Color::rgba(0.0, 0.0, 0.0, 0.0),
        ModuleKind::Construction => Color::WHITE,
        ModuleKind::Hull => Color::rgb(0.55, 0.35, 0.17),
        ModuleKind::Sail => Color::rgb(0.96, 0.94, 0.86),
        ModuleKind::Boiler => Color::rgb(0.3, 0.3, 0.32),
        ModuleKind::Propeller => Color::rgb(0.72, 0.6, 0.2),
        ModuleKind::FinSail => Color::rgb(0.9, 0.85, 0.75),
        ModuleKind::Balloon => Color::rgb(0.85, 0.3, 0.3),
        ModuleKind::Castle => Color::rgb(0.6, 0.6, 0.58),
        ModuleKind::SmokeStack => Color::rgb(0.2, 0.2, 0.2),
        ModuleKind::Support => Color::rgb(0.45, 0.3, 0.15),
    }
}

pub struct ShipEntity {
    flags: EntityFlags,
}

impl ShipEntity {
    pub fn new() -> Self {
        Self {
            flags: EntityFlags::new(layers::SHIP),
        }
    }

    /// The clickable slot under (px, py), skipping rows that are fully under water.
    fn slot_at(ctx: &GameContext, px: f32, py: f32) -> Option<(usize, usize)> {
        let ship = &ctx.state.ship;
        let draught = ctx.state.draught;
        (0..ship.row_count())
            .filter(|&y| (y + 1) as f32 * MODULE_HEIGHT >= draught)
            .flat_map(|y| (0..ship.columns()).map(move |x| (x, y)))
            .find(|&(x, y)| slot_rect(ctx.canvas, draught, x, y).contains(px, py))
    }

    fn cue(ctx: &mut GameContext, event: ShipEvent, now: f64) {
        let (canvas, draught) = (ctx.canvas, ctx.state.draught);
        let center = move |x, y| slot_rect(canvas, draught, x, y).center();
        match event {
            ShipEvent::Built { x, y, kind } => {
                log::debug!("Cue build of {} at ({}, {})", kind.name(), x, y);
                ctx.play(Sound::Building);
                let origin = center(x, y);
                EffectDef::dust().emit(ctx, origin, now);
            }
            ShipEvent::Damaged { .. } => {}
            ShipEvent::Broken { x, y } => {
                ctx.play(Sound::Breaking);
                let origin = center(x, y);
                EffectDef::debris().emit(ctx, origin, now);
            }
            ShipEvent::Fixed { x, y } => {
                let origin = center(x, y);
                EffectDef::sparkle().emit(ctx, origin, now);
            }
            ShipEvent::Smoke { x, y } => {
                let rect = slot_rect(canvas, draught, x, y);
                EffectDef::smoke().emit(ctx, Vec2::new(rect.center().x, rect.y), now);
            }
        }
    }

    fn draw_module(surface: &mut dyn Surface, module: &ShipModule, rect: Rect, debug: bool) {
        match module.kind {
            ModuleKind::Empty => {
                if debug {
                    surface.stroke_rect(rect, Color::WHITE, 1.0);
                }
                return;
            }
            ModuleKind::Construction => surface.fill_rect(rect, Color::WHITE),
            kind => {
                let drawn = kind
                    .descriptor()
                    .sprite
                    .map(|name| surface.draw_sprite(name, rect.x, rect.y, None))
                    .unwrap_or(false);
                if !drawn {
                    surface.fill_rect(rect, module_color(kind));
                }
            }
        }

        let overlay = if module.repairing {
            Some(Color::rgba(1.0, 1.0, 0.0, 0.2))
        } else {
            match module.condition {
                Condition::Normal => None,
                Condition::Damaged => Some(Color::rgba(1.0, 0.5, 0.0, 0.2)),
                Condition::Broken => Some(Color::rgba(0.0, 0.0, 1.0, 0.2)),
            }
        };
        if let Some(color) = overlay {
            surface.fill_rect(rect, color);
        }
    }

    /// Second pass: pieces that must sit in front of every neighbouring module.
    fn draw_late(surface: &mut dyn Surface, module: &ShipModule, rect: Rect) {
        match module.kind {
            ModuleKind::Hull => {
                if module.links.hull_above && !surface.draw_sprite("top_hull", rect.x, rect.y, None) {
                    surface.fill_rect(Rect::new(rect.x, rect.y - 2.0, rect.width, 4.0), Color::rgb(0.35, 0.2, 0.1));
                }
                if module.links.hull_right && !surface.draw_sprite("side_hull", rect.x, rect.y, None) {
                    let seam = Rect::new(rect.x + rect.width - 2.0, rect.y, 4.0, rect.height);
                    surface.fill_rect(seam, Color::rgb(0.35, 0.2, 0.1));
                }
            }
            ModuleKind::Balloon => {
                if !surface.draw_sprite("balloon_envelope", rect.x, rect.y, None) {
                    let center = Vec2::new(rect.center().x, rect.y + rect.height * 0.35);
                    let color = module_color(ModuleKind::Balloon)
                        .with_alpha(module.condition.efficiency().max(0.3));
                    surface.fill_circle(center, rect.width * 0.45, color);
                }
            }
            _ => {}
        }
    }
}

impl Default for ShipEntity {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for ShipEntity {
    fn name(&self) -> &'static str {
        "Ship"
    }

    fn flags(&self) -> &EntityFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut EntityFlags {
        &mut self.flags
    }

    fn tick(&mut self, ctx: &mut GameContext, dt: f64, now: f64) {
        if !ctx.state.running {
            return;
        }
        let env = TickEnv {
            draught: ctx.state.draught,
            difficulty: ctx.state.difficulty(&ctx.tuning),
            dt_ms: dt,
            tuning: &ctx.tuning,
        };
        ctx.state.ship.tick(&env, &mut ctx.rng);
        for event in ctx.state.ship.drain_events() {
            Self::cue(ctx, event, now);
        }
    }

    fn render(&mut self, ctx: &GameContext, surface: &mut dyn Surface, frame: &FrameInfo) {
        let (phase, magnitude) = bob::SHIP;
        let dy = bob_offset(frame.since_start, phase, magnitude);
        let ship = &ctx.state.ship;
        let draught = ctx.state.draught;
        let debug = ctx.state.debug;
        let rect_of = |x, y| slot_rect(ctx.canvas, draught, x, y).offset(0.0, dy);

        if debug {
            let rows = ship.stack_rows() as f32;
            let base = rect_of(0, 0);
            let outline = Rect::new(
                base.x,
                base.y + MODULE_HEIGHT - rows * MODULE_HEIGHT,
                ship.columns() as f32 * MODULE_WIDTH,
                rows * MODULE_HEIGHT,
            );
            surface.stroke_rect(outline, Color::RED, 1.0);
        }

        // Top row first, right to left, so lower-left modules overlap their neighbours.
        for y in (0..ship.row_count()).rev() {
            for x in (0..ship.columns()).rev() {
                let Some(module) = ship.get_module(x, y, None) else {
                    continue;
                };
                let rect = rect_of(x, y);
                Self::draw_module(surface, module, rect, debug);
                if debug {
                    surface.text(
                        &format!("{}, {}", x, y),
                        Vec2::new(rect.x + 4.0, rect.y + 14.0),
                        12.0,
                        Color::BLACK,
                        TextAlign::Left,
                    );
                }
            }
        }

        for module in ship.modules().filter(|m| m.descriptor().late_render) {
            Self::draw_late(surface, module, rect_of(module.x, module.y));
        }
    }

    fn hit_test(&self, ctx: &GameContext, x: f32, y: f32) -> bool {
        Self::slot_at(ctx, x, y)
            .map(|(mx, my)| {
                let ship = &ctx.state.ship;
                ship.get_module(mx, my, None)
                    .map(|m| !m.is_empty())
                    .unwrap_or(false)
                    || ship.is_build_slot(mx, my)
            })
            .unwrap_or(false)
    }

    fn on_click(&mut self, ctx: &mut GameContext, x: f32, y: f32) {
        let Some((mx, my)) = Self::slot_at(ctx, x, y) else {
            return;
        };
        let broken = ctx
            .state
            .ship
            .get_module(mx, my, None)
            .map(|m| m.condition == Condition::Broken)
            .unwrap_or(false);

        if broken {
            if let Err(err) = actions::begin_repair(ctx, mx, my) {
                log::warn!("Repair refused: {}", err);
            }
            return;
        }

        if ctx.state.ship.is_build_slot(mx, my) {
            let options = ctx.state.ship.buildable_kinds(mx, my);
            if options.is_empty() {
                log::debug!("Nothing buildable at ({}, {})", mx, my);
                return;
            }
            ctx.build_menu = Some(BuildMenu {
                x: mx,
                y: my,
                options,
            });
            ctx.state.paused = true;
        }
    }
}
