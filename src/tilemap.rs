//! Map subsystem: the `MapSource` trait, map data and geometry, the two
//! built-in map formats, and the camera that follows the player.

use crate::error::MapError;
use crate::types::{Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Object names with special meaning in a map.
pub mod names {
    pub const PLAYER: &str = "player";
    pub const WALL: &str = "wall";
    pub const MOB: &str = "mob";
    pub const APPLE: &str = "apple";
    /// Non-pickable level goal marker.
    pub const GOAL: &str = "goal";

    /// Object names that spawn as items. Other names are ignored on load.
    pub const ITEM_KINDS: &[&str] = &[APPLE, GOAL];
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Anything that can produce level data: map geometry plus named spawn
/// objects in pixel coordinates.
pub trait MapSource: Send + Sync {
    fn load(&self) -> Result<MapData, MapError>;

    /// Short human-readable label for logs.
    fn describe(&self) -> String;
}

// ---------------------------------------------------------------------------
// Map data
// ---------------------------------------------------------------------------

/// A named object placed on the map. Walls use the full rectangle; every
/// other object spawns at the rectangle's centre.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapObject {
    pub name: String,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
}

impl MapObject {
    pub fn new(name: impl Into<String>, rect: Rect) -> Self {
        Self {
            name: name.into(),
            x: rect.x,
            y: rect.y,
            width: rect.w,
            height: rect.h,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        self.rect().center()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapData {
    pub tile_size: f32,
    /// World width in pixels.
    pub width: f32,
    /// World height in pixels.
    pub height: f32,
    pub objects: Vec<MapObject>,
    /// Walls from tile glyphs are drawn; object-map walls are collision only.
    #[serde(default)]
    pub visible_walls: bool,
}

impl MapData {
    pub fn geometry(&self) -> MapGeometry {
        MapGeometry::new(self.tile_size, self.width, self.height)
    }

    pub fn objects_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MapObject> + 'a {
        self.objects.iter().filter(move |o| o.name == name)
    }
}

/// Immutable world dimensions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MapGeometry {
    pub tile_size: f32,
    pub tile_width: usize,
    pub tile_height: usize,
    pub width: f32,
    pub height: f32,
}

impl MapGeometry {
    pub fn new(tile_size: f32, width: f32, height: f32) -> Self {
        Self {
            tile_size,
            tile_width: (width / tile_size).ceil() as usize,
            tile_height: (height / tile_size).ceil() as usize,
            width,
            height,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn tile_rect(&self, col: usize, row: usize) -> Rect {
        Rect::new(
            col as f32 * self.tile_size,
            row as f32 * self.tile_size,
            self.tile_size,
            self.tile_size,
        )
    }
}

// ---------------------------------------------------------------------------
// Text grid maps
// ---------------------------------------------------------------------------

/// Character grid map: one row per line.
///
/// | Glyph       | Object            |
/// |-------------|-------------------|
/// | `1`         | wall tile         |
/// | `P`         | player spawn      |
/// | `M`         | mob               |
/// | `A`         | apple             |
/// | `G`         | goal marker       |
/// | `.` / space | floor             |
pub struct TextGridMap {
    rows: Vec<String>,
    tile_size: f32,
    label: String,
}

impl TextGridMap {
    pub fn parse(text: &str, tile_size: f32) -> Self {
        let mut rows: Vec<String> = text.lines().map(|l| l.trim_end().to_string()).collect();
        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }
        Self {
            rows,
            tile_size,
            label: "inline text map".into(),
        }
    }

    pub fn from_file(path: impl AsRef<Path>, tile_size: f32) -> Result<Self, MapError> {
        let path = path.as_ref();
        let text = read_map_file(path)?;
        let mut map = Self::parse(&text, tile_size);
        map.label = format!("text map {}", path.display());
        Ok(map)
    }
}

impl MapSource for TextGridMap {
    fn load(&self) -> Result<MapData, MapError> {
        let tile_width = self.rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        if self.rows.is_empty() || tile_width == 0 {
            return Err(MapError::Empty);
        }

        let geometry = MapGeometry::new(
            self.tile_size,
            tile_width as f32 * self.tile_size,
            self.rows.len() as f32 * self.tile_size,
        );

        let mut objects = Vec::new();
        for (row, line) in self.rows.iter().enumerate() {
            for (col, glyph) in line.chars().enumerate() {
                let name = match glyph {
                    '.' | ' ' => continue,
                    '1' => names::WALL,
                    'P' => names::PLAYER,
                    'M' => names::MOB,
                    'A' => names::APPLE,
                    'G' => names::GOAL,
                    other => {
                        return Err(MapError::UnknownGlyph {
                            glyph: other,
                            row,
                            col,
                        })
                    }
                };
                objects.push(MapObject::new(name, geometry.tile_rect(col, row)));
            }
        }

        Ok(MapData {
            tile_size: self.tile_size,
            width: geometry.width,
            height: geometry.height,
            objects,
            visible_walls: true,
        })
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

// ---------------------------------------------------------------------------
// Object maps (JSON)
// ---------------------------------------------------------------------------

/// Object-layer map in JSON: explicit pixel size plus named rectangles.
/// Walls here are invisible collision obstacles.
pub struct ObjectMap {
    data: MapData,
    label: String,
}

impl ObjectMap {
    pub fn from_json(json: &str) -> Result<Self, MapError> {
        let mut data: MapData = serde_json::from_str(json)?;
        data.visible_walls = false;
        Ok(Self {
            data,
            label: "inline object map".into(),
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let path = path.as_ref();
        let mut map = Self::from_json(&read_map_file(path)?)?;
        map.label = format!("object map {}", path.display());
        Ok(map)
    }
}

impl MapSource for ObjectMap {
    fn load(&self) -> Result<MapData, MapError> {
        if self.data.objects.is_empty() {
            return Err(MapError::Empty);
        }
        Ok(self.data.clone())
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

fn read_map_file(path: &Path) -> Result<String, MapError> {
    std::fs::read_to_string(path).map_err(|source| MapError::Io {
        path: path.display().to_string(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

/// Screen-sized viewport that follows the player.
///
/// `offset` translates world coordinates into screen coordinates. On an axis
/// where the world is at least as large as the screen, the viewport is kept
/// inside the world; on a smaller axis it stays centred on the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub width: f32,
    pub height: f32,
    world_width: f32,
    world_height: f32,
    offset: Vec2,
}

impl Camera {
    pub fn new(width: f32, height: f32, geometry: &MapGeometry) -> Self {
        Self {
            width,
            height,
            world_width: geometry.width,
            world_height: geometry.height,
            offset: Vec2::ZERO,
        }
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// The visible part of the world, in world coordinates.
    pub fn viewport(&self) -> Rect {
        Rect::new(-self.offset.x, -self.offset.y, self.width, self.height)
    }

    /// Map a world rectangle to screen space.
    pub fn apply(&self, rect: Rect) -> Rect {
        rect.translated(self.offset)
    }

    pub fn follow(&mut self, target: Vec2) {
        self.offset = Vec2::new(
            follow_axis(target.x, self.width, self.world_width),
            follow_axis(target.y, self.height, self.world_height),
        );
    }
}

fn follow_axis(target: f32, screen: f32, world: f32) -> f32 {
    let centred = screen / 2.0 - target;
    if world < screen {
        return centred;
    }
    centred.min(0.0).max(screen - world)
}
