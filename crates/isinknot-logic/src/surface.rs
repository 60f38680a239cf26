//! The drawing surface the entities render onto.
//!
//! Hosts implement [`Surface`] over whatever they draw with. The
//! [`RecordingSurface`] keeps a list of [`DrawCommand`]s instead of drawing,
//! which is what the tests inspect and what the Bevy viewer replays each
//! frame.

use serde::{Deserialize, Serialize};

use crate::art::SpriteAtlas;
use crate::vector::{Rect, Vec2};

/// Straight (non-premultiplied) RGBA, each channel in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const SKY: Color = Color::rgb(0.53, 0.81, 0.92);
    pub const WATER: Color = Color::rgba(0.0, 0.0, 128.0 / 255.0, 0.7);
    pub const YELLOW: Color = Color::rgb(1.0, 1.0, 0.0);
    pub const ORANGE: Color = Color::rgb(1.0, 0.65, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREY: Color = Color::rgb(0.5, 0.5, 0.5);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

pub trait Surface {
    /// Canvas size in px.
    fn size(&self) -> Vec2;
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color);
    /// Draw a line of text with its baseline at `pos`.
    fn text(&mut self, text: &str, pos: Vec2, font_size: f32, color: Color, align: TextAlign);
    /// Draw a named sprite anchored at (x, y). Returns false if the sprite is
    /// unknown, so the caller can draw a fallback.
    fn draw_sprite(&mut self, name: &str, x: f32, y: f32, size: Option<Vec2>) -> bool;
    fn sprite_size(&self, name: &str) -> Option<Vec2>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
        line_width: f32,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Text {
        text: String,
        pos: Vec2,
        font_size: f32,
        color: Color,
        align: TextAlign,
    },
    Sprite {
        name: String,
        source: Rect,
        dest: Rect,
    },
}

pub struct RecordingSurface {
    size: Vec2,
    atlas: SpriteAtlas,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self::with_atlas(width, height, SpriteAtlas::with_ship_sheet())
    }

    pub fn with_atlas(width: f32, height: f32, atlas: SpriteAtlas) -> Self {
        Self {
            size: Vec2::new(width, height),
            atlas,
            commands: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.size = Vec2::new(width, height);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Every text string drawn so far, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Vec2 {
        self.size
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32) {
        self.commands.push(DrawCommand::StrokeRect {
            rect,
            color,
            line_width,
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn text(&mut self, text: &str, pos: Vec2, font_size: f32, color: Color, align: TextAlign) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            pos,
            font_size,
            color,
            align,
        });
    }

    fn draw_sprite(&mut self, name: &str, x: f32, y: f32, size: Option<Vec2>) -> bool {
        let Some(region) = self.atlas.get(name) else {
            return false;
        };
        let command = DrawCommand::Sprite {
            name: name.to_string(),
            source: region.source_rect(),
            dest: region.dest_rect(x, y, size),
        };
        self.commands.push(command);
        true
    }

    fn sprite_size(&self, name: &str) -> Option<Vec2> {
        self.atlas
            .get(name)
            .map(|region| Vec2::new(region.width, region.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let mut surface = RecordingSurface::new(100.0, 50.0);
        surface.fill_rect(Rect::new(0.0, 0.0, 100.0, 50.0), Color::SKY);
        surface.text("hi", Vec2::new(1.0, 2.0), 12.0, Color::BLACK, TextAlign::Left);
        assert_eq!(surface.commands().len(), 2);
        assert!(matches!(surface.commands()[0], DrawCommand::FillRect { .. }));
        assert!(surface.contains_text("hi"));
        assert_eq!(surface.size(), Vec2::new(100.0, 50.0));
    }

    #[test]
    fn test_unknown_sprite_reports_miss() {
        let mut surface = RecordingSurface::new(100.0, 50.0);
        assert!(!surface.draw_sprite("castle", 0.0, 0.0, None));
        assert!(surface.commands().is_empty());
        assert!(surface.sprite_size("castle").is_none());
    }

    #[test]
    fn test_sprite_uses_anchor() {
        let mut surface = RecordingSurface::new(100.0, 50.0);
        assert!(surface.draw_sprite("hull", 128.0, 100.0, Some(Vec2::new(128.0, 128.0))));
        assert_eq!(surface.sprite_size("hull"), Some(Vec2::new(184.0, 146.0)));
        match &surface.commands()[0] {
            DrawCommand::Sprite { dest, .. } => {
                assert_eq!(*dest, Rect::new(100.0, 92.0, 128.0, 128.0));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_take_commands_clears() {
        let mut surface = RecordingSurface::new(10.0, 10.0);
        surface.fill_circle(Vec2::ZERO, 1.0, Color::WHITE);
        assert_eq!(surface.take_commands().len(), 1);
        assert!(surface.commands().is_empty());
    }
}
