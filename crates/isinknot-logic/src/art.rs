//! Sprite sheets and the prioritised atlas that resolves sprite names.
//!
//! A sheet maps names to source regions of one image. Each region carries an
//! anchor: the point inside the region that lands on the requested
//! destination position. The atlas queries its sheets in insertion order and
//! the first sheet that knows a name wins.

use std::collections::HashMap;

use crate::vector::{Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub anchor_x: f32,
    pub anchor_y: f32,
}

impl SpriteRegion {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            anchor_x: 0.0,
            anchor_y: 0.0,
        }
    }

    pub fn with_anchor(mut self, anchor_x: f32, anchor_y: f32) -> Self {
        self.anchor_x = anchor_x;
        self.anchor_y = anchor_y;
        self
    }

    pub fn source_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Where the sprite lands when drawn at (x, y). An explicit size stretches
    /// the sprite; the anchor offset is never scaled.
    pub fn dest_rect(&self, x: f32, y: f32, size: Option<Vec2>) -> Rect {
        let size = size.unwrap_or(Vec2::new(self.width, self.height));
        Rect::new(x - self.anchor_x, y - self.anchor_y, size.x, size.y)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteSheet {
    /// Image path the host loads.
    pub image: String,
    sprites: HashMap<String, SpriteRegion>,
}

impl SpriteSheet {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            sprites: HashMap::new(),
        }
    }

    /// Register (or replace) a named region.
    pub fn create_sprite(&mut self, name: impl Into<String>, region: SpriteRegion) -> &SpriteRegion {
        let name = name.into();
        self.sprites.insert(name.clone(), region);
        &self.sprites[&name]
    }

    pub fn get(&self, name: &str) -> Option<&SpriteRegion> {
        self.sprites.get(name)
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

/// The ship sprite sheet.
pub fn ship_sheet() -> SpriteSheet {
    let mut sheet = SpriteSheet::new("art/ship-spritesheet.png");
    sheet.create_sprite(
        "hull",
        SpriteRegion::new(34.0, 824.0, 184.0, 146.0).with_anchor(28.0, 8.0),
    );
    sheet.create_sprite("propeller", SpriteRegion::new(61.0, 63.0, 79.0, 199.0));
    sheet.create_sprite("sail", SpriteRegion::new(279.0, 37.0, 145.0, 225.0));
    sheet
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpriteAtlas {
    sheets: Vec<SpriteSheet>,
}

impl SpriteAtlas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atlas holding just the ship sheet.
    pub fn with_ship_sheet() -> Self {
        let mut atlas = Self::new();
        atlas.push(ship_sheet());
        atlas
    }

    /// Append a sheet at the lowest priority.
    pub fn push(&mut self, sheet: SpriteSheet) {
        self.sheets.push(sheet);
    }

    pub fn sheets(&self) -> &[SpriteSheet] {
        &self.sheets
    }

    /// First sheet (in priority order) that defines `name`.
    pub fn find(&self, name: &str) -> Option<(&SpriteSheet, &SpriteRegion)> {
        self.sheets
            .iter()
            .find_map(|sheet| sheet.get(name).map(|region| (sheet, region)))
    }

    pub fn get(&self, name: &str) -> Option<&SpriteRegion> {
        self.find(name).map(|(_, region)| region)
    }
}
