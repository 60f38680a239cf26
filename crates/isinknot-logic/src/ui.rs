//! On-canvas UI: the action buttons, the distance HUD, and the debug overlay.

use crate::actions;
use crate::clock::FrameInfo;
use crate::constants::{layers, BUTTON_MARGIN, BUTTON_SIZE};
use crate::context::GameContext;
use crate::entity::{Entity, EntityFlags};
use crate::surface::{Color, Surface, TextAlign};
use crate::vector::{Rect, Vec2};

const CORNSILK: Color = Color::rgb(1.0, 0.97, 0.86);
const HIGHLIGHT: Color = Color::rgb(1.0, 0.92, 0.6);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    Bail,
    Row,
    Debug,
}

impl ButtonKind {
    pub fn all() -> &'static [ButtonKind] {
        &[ButtonKind::Bail, ButtonKind::Row, ButtonKind::Debug]
    }

    pub fn label(self) -> &'static str {
        match self {
            ButtonKind::Bail => "Bail",
            ButtonKind::Row => "Row",
            ButtonKind::Debug => "Dbg",
        }
    }
}

pub struct Button {
    flags: EntityFlags,
    pub kind: ButtonKind,
    pub rect: Rect,
    hovered: bool,
}

impl Button {
    /// The `index`-th button in the column down the left edge.
    pub fn new(kind: ButtonKind, index: usize) -> Self {
        let y = BUTTON_MARGIN + index as f32 * (BUTTON_SIZE + BUTTON_MARGIN);
        Self {
            flags: EntityFlags::new(layers::BUTTONS),
            kind,
            rect: Rect::new(BUTTON_MARGIN, y, BUTTON_SIZE, BUTTON_SIZE),
            hovered: false,
        }
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }
}

impl Entity for Button {
    fn name(&self) -> &'static str {
        "Button"
    }

    fn flags(&self) -> &EntityFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut EntityFlags {
        &mut self.flags
    }

    fn render(&mut self, ctx: &GameContext, surface: &mut dyn Surface, _frame: &FrameInfo) {
        let fill = if ctx.state.cooldown_ms > 0.0 {
            Color::GREY
        } else if self.hovered {
            HIGHLIGHT
        } else {
            CORNSILK
        };
        surface.fill_rect(self.rect, fill);
        surface.stroke_rect(self.rect, Color::BLACK, 1.0);
        surface.text(
            self.kind.label(),
            Vec2::new(self.rect.center().x, self.rect.y + 31.0),
            16.0,
            Color::BLACK,
            TextAlign::Center,
        );
    }

    fn hit_test(&self, _ctx: &GameContext, x: f32, y: f32) -> bool {
        self.rect.contains(x, y)
    }

    fn on_click(&mut self, ctx: &mut GameContext, _x: f32, _y: f32) {
        let result = match self.kind {
            ButtonKind::Bail => actions::begin_bail(ctx),
            ButtonKind::Row => actions::begin_row(ctx),
            ButtonKind::Debug => {
                ctx.state.debug = !ctx.state.debug;
                log::info!("Debug overlay {}", if ctx.state.debug { "on" } else { "off" });
                Ok(())
            }
        };
        if let Err(err) = result {
            log::warn!("{:?} refused: {}", self.kind, err);
        }
    }

    fn on_hover_enter(&mut self, _ctx: &mut GameContext) {
        self.hovered = true;
    }

    fn on_hover_exit(&mut self, _ctx: &mut GameContext) {
        self.hovered = false;
    }
}

/// Distance travelled, top right.
pub struct Hud {
    flags: EntityFlags,
}

impl Hud {
    pub fn new() -> Self {
        Self {
            flags: EntityFlags::new(layers::HUD),
        }
    }
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for Hud {
    fn name(&self) -> &'static str {
        "Hud"
    }

    fn flags(&self) -> &EntityFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut EntityFlags {
        &mut self.flags
    }

    fn render(&mut self, ctx: &GameContext, surface: &mut dyn Surface, _frame: &FrameInfo) {
        let text = format!("{}m", ctx.state.distance.floor());
        surface.text(
            &text,
            Vec2::new(ctx.canvas.x - 10.0, 42.0),
            32.0,
            Color::WHITE,
            TextAlign::Right,
        );
    }
}

pub struct DebugDisplay {
    flags: EntityFlags,
}

impl DebugDisplay {
    pub fn new() -> Self {
        Self {
            flags: EntityFlags::new(layers::DEBUG),
        }
    }

    /// `key = value` lines describing the session.
    pub fn lines(ctx: &GameContext) -> Vec<String> {
        let state = &ctx.state;
        let stats = state.ship.stats(state.draught);
        let pending = state
            .pending
            .map(|a| format!("{:?}", a))
            .unwrap_or_else(|| "none".to_string());
        vec![
            format!("draught = {:.2}", state.draught),
            format!("distance = {:.2}", state.distance),
            format!("elapsed = {:.2}", state.elapsed_secs()),
            format!("speed = {:.2}", state.speed),
            format!("speed_boost = {:.2}", state.speed_boost),
            format!("cooldown = {:.2}", state.cooldown_ms),
            format!("pending = {}", pending),
            format!("paused = {}", state.paused),
            format!("difficulty = {:.2}", state.difficulty(&ctx.tuning)),
            format!("weight = {:.2}", stats.weight),
            format!("buoyancy = {:.2}", stats.buoyancy),
            format!("flood = {:.2}", state.ship.flood()),
            format!("ship_height = {:.2}", state.ship.stack_height()),
        ]
    }
}

impl Default for DebugDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for DebugDisplay {
    fn name(&self) -> &'static str {
        "DebugDisplay"
    }

    fn flags(&self) -> &EntityFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut EntityFlags {
        &mut self.flags
    }

    fn render(&mut self, ctx: &GameContext, surface: &mut dyn Surface, _frame: &FrameInfo) {
        if !ctx.state.debug {
            return;
        }
        for (i, line) in Self::lines(ctx).iter().enumerate() {
            surface.text(
                line,
                Vec2::new(ctx.canvas.x - 10.0, 74.0 + i as f32 * 26.0),
                24.0,
                Color::BLACK,
                TextAlign::Right,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Sound;
    use crate::config::Tuning;
    use crate::entity::Registry;
    use crate::state::PendingAction;
    use crate::surface::{DrawCommand, RecordingSurface};

    fn ctx() -> GameContext {
        GameContext::new(Tuning::default(), 6, Vec2::new(1280.0, 720.0))
    }

    #[test]
    fn test_button_layout() {
        let buttons: Vec<Button> = ButtonKind::all()
            .iter()
            .enumerate()
            .map(|(i, kind)| Button::new(*kind, i))
            .collect();
        assert_eq!(buttons[0].rect, Rect::new(20.0, 20.0, 50.0, 50.0));
        assert_eq!(buttons[1].rect, Rect::new(20.0, 90.0, 50.0, 50.0));
        assert_eq!(buttons[2].rect, Rect::new(20.0, 160.0, 50.0, 50.0));
    }

    #[test]
    fn test_bail_button_starts_cooldown() {
        let mut ctx = ctx();
        let mut button = Button::new(ButtonKind::Bail, 0);
        button.on_click(&mut ctx, 30.0, 30.0);
        assert_eq!(ctx.state.pending, Some(PendingAction::Bail));
        assert_eq!(ctx.state.cooldown_ms, 1000.0);
    }

    #[test]
    fn test_row_button_boosts() {
        let mut ctx = ctx();
        let mut button = Button::new(ButtonKind::Row, 1);
        button.on_click(&mut ctx, 30.0, 100.0);
        assert_eq!(ctx.state.speed_boost, 1.0);
        assert_eq!(ctx.drain_sounds(), vec![Sound::Row]);
    }

    #[test]
    fn test_debug_button_toggles_without_cooldown() {
        let mut ctx = ctx();
        let mut button = Button::new(ButtonKind::Debug, 2);
        button.on_click(&mut ctx, 30.0, 170.0);
        assert!(ctx.state.debug);
        assert!(!ctx.state.is_busy());
        button.on_click(&mut ctx, 30.0, 170.0);
        assert!(!ctx.state.debug);
    }

    #[test]
    fn test_button_grey_during_cooldown() {
        let mut ctx = ctx();
        let mut button = Button::new(ButtonKind::Row, 0);
        let mut surface = RecordingSurface::new(1280.0, 720.0);
        ctx.state.cooldown_ms = 300.0;
        button.render(&ctx, &mut surface, &FrameInfo::default());
        assert_eq!(
            surface.commands()[0],
            DrawCommand::FillRect {
                rect: button.rect,
                color: Color::GREY
            }
        );
    }

    #[test]
    fn test_button_hover_highlight() {
        let mut ctx = ctx();
        let mut registry = Registry::new();
        registry.register(Box::new(Button::new(ButtonKind::Bail, 0)));
        registry.dispatch_hover(&mut ctx, 40.0, 40.0);

        let mut surface = RecordingSurface::new(1280.0, 720.0);
        registry.render_all(&ctx, &mut surface, &FrameInfo::default());
        assert!(matches!(
            surface.commands()[0],
            DrawCommand::FillRect { color, .. } if color == HIGHLIGHT
        ));
    }

    #[test]
    fn test_hud_shows_whole_meters() {
        let mut ctx = ctx();
        ctx.state.distance = 123.9;
        let mut hud = Hud::new();
        let mut surface = RecordingSurface::new(1280.0, 720.0);
        hud.render(&ctx, &mut surface, &FrameInfo::default());
        assert_eq!(surface.texts().collect::<Vec<_>>(), vec!["123m"]);
    }

    #[test]
    fn test_debug_display_only_in_debug() {
        let mut ctx = ctx();
        let mut overlay = DebugDisplay::new();
        let mut surface = RecordingSurface::new(1280.0, 720.0);
        overlay.render(&ctx, &mut surface, &FrameInfo::default());
        assert!(surface.commands().is_empty());

        ctx.state.debug = true;
        overlay.render(&ctx, &mut surface, &FrameInfo::default());
        assert!(surface.contains_text("draught = 10.00"));
        assert!(surface.contains_text("pending = none"));
    }
}
