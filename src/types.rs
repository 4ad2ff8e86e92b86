//! Core world types shared across all modules.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Sub};

// ---------------------------------------------------------------------------
// Basic math
// ---------------------------------------------------------------------------

/// A point or offset in pixel space. `+y` points down the screen.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    /// Unit vector for a heading in degrees.
    ///
    /// 0° points along `+x`, 90° points up the screen (`-y`). Quarter turns
    /// yield exact axis vectors so grid-aligned moves land on exact pixels.
    pub fn from_heading(degrees: f32) -> Self {
        let d = normalize_degrees(degrees);
        if d == 0.0 {
            Self::new(1.0, 0.0)
        } else if d == 90.0 {
            Self::new(0.0, -1.0)
        } else if d == 180.0 {
            Self::new(-1.0, 0.0)
        } else if d == 270.0 {
            Self::new(0.0, 1.0)
        } else {
            let r = d.to_radians();
            Self::new(r.cos(), -r.sin())
        }
    }

    /// Heading (degrees, `[0, 360)`) of this vector; zero vector maps to 0.
    pub fn heading(self) -> f32 {
        if self == Self::ZERO {
            return 0.0;
        }
        normalize_degrees((-self.y).atan2(self.x).to_degrees())
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl std::fmt::Display for Vec2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// Wrap an angle into `[0, 360)`.
pub fn normalize_degrees(degrees: f32) -> f32 {
    let d = degrees.rem_euclid(360.0);
    // rem_euclid can round tiny negatives up to exactly 360.0
    if d >= 360.0 {
        0.0
    } else {
        d
    }
}

/// Shortest signed rotation from `from` to `to`, in `(-180, 180]`.
pub fn shortest_delta(from: f32, to: f32) -> f32 {
    let d = (to - from).rem_euclid(360.0);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

// ---------------------------------------------------------------------------
// Rectangles
// ---------------------------------------------------------------------------

/// Axis-aligned rectangle, top-left origin, pixel units.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_center(center: Vec2, w: f32, h: f32) -> Self {
        Self::new(center.x - w / 2.0, center.y - h / 2.0, w, h)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict overlap: rectangles that only share an edge do not collide.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// `true` when `other` lies entirely inside `self` (edges inclusive).
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y, self.w, self.h)
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:.1},{:.1} {:.1}x{:.1}]",
            self.x, self.y, self.w, self.h
        )
    }
}

// ---------------------------------------------------------------------------
// Stats & config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SimulationStats {
    pub total_ticks: u64,
    pub commands_accepted: u64,
    pub commands_rejected: u64,
    pub items_in_world: usize,
    pub inventory_len: usize,
    pub walls: usize,
    pub player_pos: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Screen (viewport) width in pixels.
    pub screen_width: f32,
    /// Screen (viewport) height in pixels.
    pub screen_height: f32,
    /// Target tick rate.
    pub fps: f32,
    /// Upper bound on a single tick's Δt in seconds.
    pub max_frame_dt: f32,
    /// Side of one map tile in pixels.
    pub tile_size: f32,
    /// Keyboard movement speed (px/s).
    pub player_speed: f32,
    /// Keyboard rotation speed (deg/s).
    pub player_rot_speed: f32,
    pub player_hit_width: f32,
    pub player_hit_height: f32,
    pub inventory_size: usize,
    /// Minimum gap between keyboard drops (ms).
    pub drop_interval_ms: u64,
    /// Vertical bob amplitude for items (px).
    pub item_bob_range: f32,
    /// Bob step advanced per tick.
    pub item_bob_speed: f32,
    /// Goal-following speed (px/s).
    pub robot_speed: f32,
    /// Goal-following rotation speed (deg/s).
    pub robot_rot_speed: f32,
    /// Radius within which status reports items as `near`.
    pub robot_sense_dist: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            screen_width: 960.0,
            screen_height: 736.0,
            fps: 60.0,
            max_frame_dt: 0.1,
            tile_size: 32.0,
            player_speed: 400.0,
            player_rot_speed: 250.0,
            player_hit_width: 20.0,
            player_hit_height: 20.0,
            inventory_size: 3,
            drop_interval_ms: 500,
            item_bob_range: 8.0,
            item_bob_speed: 0.2,
            robot_speed: 100.0,
            robot_rot_speed: 60.0,
            robot_sense_dist: 150.0,
        }
    }
}

impl SimConfig {
    /// Reject values that would stall goals or panic the tick loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("screen_width", self.screen_width),
            ("screen_height", self.screen_height),
            ("fps", self.fps),
            ("max_frame_dt", self.max_frame_dt),
            ("tile_size", self.tile_size),
            ("player_speed", self.player_speed),
            ("player_rot_speed", self.player_rot_speed),
            ("player_hit_width", self.player_hit_width),
            ("player_hit_height", self.player_hit_height),
            ("robot_speed", self.robot_speed),
            ("robot_rot_speed", self.robot_rot_speed),
            ("robot_sense_dist", self.robot_sense_dist),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        let non_negative = [
            ("item_bob_range", self.item_bob_range),
            ("item_bob_speed", self.item_bob_speed),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Negative { field, value });
            }
        }
        Ok(())
    }
}
