//! Sky, the scrolling parallax hills, and the water line.

use crate::clock::{bob_offset, FrameInfo, MAX_FRAME_MS};
use crate::constants::{bob, layers, WATER_HEIGHT};
use crate::context::GameContext;
use crate::entity::{Entity, EntityFlags};
use crate::surface::{Color, Surface};
use crate::vector::Rect;

/// One scrolling background strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallaxLayer {
    pub sprite: &'static str,
    pub color: Color,
    /// Scroll rate relative to the distance accumulator.
    pub rate: f32,
    /// Vertical offset of the strip image.
    pub y_offset: f32,
    /// Width of one tile when no art is loaded.
    pub tile_width: f32,
    /// Height of the fallback hills above the water line.
    pub hill_height: f32,
}

pub const PARALLAX_LAYERS: [ParallaxLayer; 3] = [
    ParallaxLayer {
        sprite: "parallax_yellow",
        color: Color::YELLOW,
        rate: 0.01,
        y_offset: -200.0,
        tile_width: 640.0,
        hill_height: 260.0,
    },
    ParallaxLayer {
        sprite: "parallax_orange",
        color: Color::ORANGE,
        rate: 0.05,
        y_offset: -400.0,
        tile_width: 480.0,
        hill_height: 180.0,
    },
    ParallaxLayer {
        sprite: "parallax_red",
        color: Color::RED,
        rate: 0.1,
        y_offset: -800.0,
        tile_width: 320.0,
        hill_height: 100.0,
    },
];

impl ParallaxLayer {
    /// Horizontal scroll of this layer, in [0, tile width).
    pub fn scroll(&self, bg_distance: f32, tile_width: f32) -> f32 {
        (bg_distance * 100.0 * self.rate).rem_euclid(tile_width)
    }
}

pub struct Background {
    flags: EntityFlags,
    /// Render-paced distance used only for scrolling.
    bg_distance: f32,
}

impl Background {
    pub fn new() -> Self {
        Self {
            flags: EntityFlags::new(layers::BACKGROUND),
            bg_distance: 0.0,
        }
    }

    pub fn bg_distance(&self) -> f32 {
        self.bg_distance
    }

    fn draw_layer(&self, layer: &ParallaxLayer, surface: &mut dyn Surface) {
        let canvas = surface.size();
        let tile_width = surface
            .sprite_size(layer.sprite)
            .map(|size| size.x)
            .filter(|w| *w > 0.0)
            .unwrap_or(layer.tile_width);
        let scroll = layer.scroll(self.bg_distance, tile_width);
        let tiles = (canvas.x / tile_width).ceil() as usize + 1;
        let horizon = canvas.y - WATER_HEIGHT;

        for i in 0..tiles {
            let x = i as f32 * tile_width - scroll;
            if surface.draw_sprite(layer.sprite, x, layer.y_offset, None) {
                continue;
            }
            let hill = Rect::new(
                x + tile_width * 0.15,
                horizon - layer.hill_height,
                tile_width * 0.7,
                layer.hill_height,
            );
            surface.fill_rect(hill, layer.color);
        }
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for Background {
    fn name(&self) -> &'static str {
        "Background"
    }

    fn flags(&self) -> &EntityFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut EntityFlags {
        &mut self.flags
    }

    fn render(&mut self, ctx: &GameContext, surface: &mut dyn Surface, frame: &FrameInfo) {
        let size = surface.size();
        surface.fill_rect(Rect::new(0.0, 0.0, size.x, size.y), Color::SKY);
        for layer in &PARALLAX_LAYERS {
            self.draw_layer(layer, surface);
        }
        // Advanced per frame, not per tick.
        let since_last = frame.since_last.min(MAX_FRAME_MS) as f32;
        self.bg_distance += since_last * (ctx.state.speed + ctx.state.speed_boost) / 1000.0;
    }
}

pub struct Water {
    flags: EntityFlags,
}

impl Water {
    pub fn new() -> Self {
        Self {
            flags: EntityFlags::new(layers::WATER),
        }
    }

    /// Top edge of the water at frame time `t`.
    pub fn surface_y(canvas_height: f32, t: f64) -> f32 {
        let (phase, magnitude) = bob::WATER;
        canvas_height - WATER_HEIGHT + bob_offset(t, phase, magnitude)
    }
}

impl Default for Water {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity for Water {
    fn name(&self) -> &'static str {
        "Water"
    }

    fn flags(&self) -> &EntityFlags {
        &self.flags
    }

    fn flags_mut(&mut self) -> &mut EntityFlags {
        &mut self.flags
    }

    fn render(&mut self, _ctx: &GameContext, surface: &mut dyn Surface, frame: &FrameInfo) {
        let size = surface.size();
        let top = Self::surface_y(size.y, frame.since_start);
        surface.fill_rect(Rect::new(0.0, top, size.x, size.y - top), Color::WATER);
    }
}
