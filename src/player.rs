//! Player – the single controllable actor.
//!
//! The player either follows a goal set by a robot command or, while idle,
//! live keyboard input. Each tick runs in a fixed order:
//!
//! 1. pick velocity / angular velocity (goal law, else input)
//! 2. integrate heading
//! 3. integrate X and resolve X collisions
//! 4. integrate Y and resolve Y collisions
//! 5. settle the goal and report its outcome
//!
//! Resolving the axes separately keeps the player from tunnelling through
//! corners or catching on them when moving diagonally.

use crate::entity::{layers, DrawCommand, Drawable, SpriteKind, World};
use crate::error::CommandError;
use crate::protocol::{outcome, SenseReport, SensedItem, StatusReport};
use crate::tilemap::Camera;
use crate::types::{normalize_degrees, shortest_delta, Rect, SimConfig, Vec2};
use log::debug;

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Goal {
    /// Drive to this point (player centre).
    Position(Vec2),
    /// Rotate to this heading, `[0, 360)`.
    Heading(f32),
}

/// Terminal event of a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalOutcome {
    Reached,
    HitWall,
    AngleReached,
}

impl GoalOutcome {
    pub fn message(self) -> &'static str {
        match self {
            GoalOutcome::Reached => outcome::GOAL_REACHED,
            GoalOutcome::HitWall => outcome::HIT_A_WALL,
            GoalOutcome::AngleReached => outcome::ANGLE_GOAL_REACHED,
        }
    }
}

/// Keyboard state for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub turn_left: bool,
    pub turn_right: bool,
    pub forward: bool,
    pub backward: bool,
    pub pick: bool,
    pub drop: bool,
    pub quit: bool,
}

/// Desired motion for the current tick.
struct Motion {
    velocity: Vec2,
    spin: f32,
    snap_pos: Option<Vec2>,
    snap_rot: Option<f32>,
}

impl Motion {
    fn still() -> Self {
        Self {
            velocity: Vec2::ZERO,
            spin: 0.0,
            snap_pos: None,
            snap_rot: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

pub struct Player {
    pos: Vec2,
    rot: f32,
    vel: Vec2,
    spin: f32,
    hit_width: f32,
    hit_height: f32,
    inventory: Vec<String>,
    goal: Option<Goal>,
    config: SimConfig,
}

impl Player {
    pub fn new(pos: Vec2, config: &SimConfig) -> Self {
        Self {
            pos,
            rot: 0.0,
            vel: Vec2::ZERO,
            spin: 0.0,
            hit_width: config.player_hit_width,
            hit_height: config.player_hit_height,
            inventory: Vec::with_capacity(config.inventory_size),
            goal: None,
            config: config.clone(),
        }
    }

    pub fn with_heading(mut self, degrees: f32) -> Self {
        self.rot = normalize_degrees(degrees);
        self
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn rot(&self) -> f32 {
        self.rot
    }

    pub fn velocity(&self) -> Vec2 {
        self.vel
    }

    pub fn angular_velocity(&self) -> f32 {
        self.spin
    }

    pub fn goal(&self) -> Option<Goal> {
        self.goal
    }

    pub fn is_idle(&self) -> bool {
        self.goal.is_none()
    }

    pub fn inventory(&self) -> &[String] {
        &self.inventory
    }

    pub fn hit_rect(&self) -> Rect {
        Rect::from_center(self.pos, self.hit_width, self.hit_height)
    }

    // -----------------------------------------------------------------------
    // Goal commands
    // -----------------------------------------------------------------------

    /// Start moving `tiles` tiles along the current heading.
    pub fn start_forward(&mut self, tiles: f32) {
        let target = self.pos + Vec2::from_heading(self.rot) * (tiles * self.config.tile_size);
        debug!("Player goal: move {} -> {}", self.pos, target);
        self.goal = Some(Goal::Position(target));
    }

    /// Start rotating to the absolute heading `angle`.
    pub fn start_turn(&mut self, angle: f32) {
        let target = normalize_degrees(angle);
        debug!("Player goal: rotate {:.1} -> {:.1}", self.rot, target);
        self.goal = Some(Goal::Heading(target));
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Advance one tick. Returns the goal outcome on the tick a goal ends.
    pub fn advance(&mut self, dt: f32, input: &InputState, walls: &[Rect]) -> Option<GoalOutcome> {
        let motion = match self.goal {
            Some(Goal::Position(target)) => self.steer_to(target, dt),
            Some(Goal::Heading(target)) => self.rotate_to(target, dt),
            None => self.steer_manual(input),
        };

        self.vel = motion.velocity;
        self.spin = motion.spin;
        self.rot = match motion.snap_rot {
            Some(target) => target,
            None => normalize_degrees(self.rot + self.spin * dt),
        };

        let next = motion.snap_pos.unwrap_or(self.pos + self.vel * dt);
        let hit_x = self.move_x(next.x, walls);
        let hit_y = self.move_y(next.y, walls);

        self.settle_goal(hit_x || hit_y)
    }

    fn steer_to(&self, target: Vec2, dt: f32) -> Motion {
        let remaining = target - self.pos;
        let dist = remaining.length();
        let speed = self.config.robot_speed;
        let velocity = if dist > 0.0 {
            remaining * (speed / dist)
        } else {
            Vec2::ZERO
        };
        Motion {
            velocity,
            snap_pos: (dist <= speed * dt).then_some(target),
            ..Motion::still()
        }
    }

    fn rotate_to(&self, target: f32, dt: f32) -> Motion {
        let delta = shortest_delta(self.rot, target);
        let spin = self.config.robot_rot_speed.copysign(delta);
        Motion {
            spin,
            snap_rot: ((spin * dt).abs() >= delta.abs()).then_some(target),
            ..Motion::still()
        }
    }

    fn steer_manual(&self, input: &InputState) -> Motion {
        let mut spin = 0.0;
        if input.turn_left {
            spin += self.config.player_rot_speed;
        }
        if input.turn_right {
            spin -= self.config.player_rot_speed;
        }

        let facing = Vec2::from_heading(self.rot);
        let mut velocity = Vec2::ZERO;
        if input.forward {
            velocity = facing * self.config.player_speed;
        }
        if input.backward {
            velocity = facing * (-self.config.player_speed / 2.0);
        }

        Motion {
            velocity,
            spin,
            ..Motion::still()
        }
    }

    fn move_x(&mut self, x: f32, walls: &[Rect]) -> bool {
        self.pos.x = x;
        let hit = self.hit_rect();
        let Some(wall) = walls.iter().find(|w| hit.overlaps(w)) else {
            return false;
        };
        if self.vel.x > 0.0 {
            self.pos.x = wall.left() - self.hit_width / 2.0;
        } else if self.vel.x < 0.0 {
            self.pos.x = wall.right() + self.hit_width / 2.0;
        }
        self.vel.x = 0.0;
        true
    }

    fn move_y(&mut self, y: f32, walls: &[Rect]) -> bool {
        self.pos.y = y;
        let hit = self.hit_rect();
        let Some(wall) = walls.iter().find(|w| hit.overlaps(w)) else {
            return false;
        };
        if self.vel.y > 0.0 {
            self.pos.y = wall.top() - self.hit_height / 2.0;
        } else if self.vel.y < 0.0 {
            self.pos.y = wall.bottom() + self.hit_height / 2.0;
        }
        self.vel.y = 0.0;
        true
    }

    /// Goals complete on exact equality; the goal laws snap on the final tick.
    fn settle_goal(&mut self, collided: bool) -> Option<GoalOutcome> {
        let outcome = match self.goal? {
            Goal::Position(_) if collided => GoalOutcome::HitWall,
            Goal::Position(target) if self.pos == target => GoalOutcome::Reached,
            Goal::Heading(target) if self.rot == target => GoalOutcome::AngleReached,
            _ => return None,
        };
        debug!("Player goal ended: {} at {}", outcome.message(), self.pos);
        self.goal = None;
        self.vel = Vec2::ZERO;
        self.spin = 0.0;
        Some(outcome)
    }

    // -----------------------------------------------------------------------
    // Immediate commands
    // -----------------------------------------------------------------------

    /// Would `forward(tiles)` complete without touching a wall?
    ///
    /// Sweeps the hit-rectangle along the path in steps no longer than half
    /// its shorter side, stopping once it has left the world.
    pub fn can_forward(&self, tiles: f32, walls: &[Rect], bounds: &Rect) -> bool {
        let path = Vec2::from_heading(self.rot) * (tiles * self.config.tile_size);
        let max_step = (self.hit_width.min(self.hit_height) / 2.0).max(f32::EPSILON);
        let steps = (path.length() / max_step).ceil().max(1.0) as u64;

        for i in 1..=steps {
            let at = self.pos + path * (i as f32 / steps as f32);
            let rect = Rect::from_center(at, self.hit_width, self.hit_height);
            if walls.iter().any(|w| rect.overlaps(w)) {
                return false;
            }
            if !bounds.overlaps(&rect) {
                break;
            }
        }
        true
    }

    /// Value snapshot of position, heading, inventory and nearby items.
    pub fn status(&self, world: &World) -> StatusReport {
        let hit = self.hit_rect();
        let mut sense = SenseReport::default();

        for (_, item) in world.entities.items() {
            let sensed = SensedItem {
                kind: item.kind.clone(),
                offset: item.pos - self.pos,
            };
            if item.hit_rect().overlaps(&hit) {
                sense.on.push(sensed);
            } else if sensed.offset.length() <= self.config.robot_sense_dist {
                sense.near.push(sensed);
            }
        }

        StatusReport {
            pos: self.pos,
            rot: self.rot,
            inventory: self.inventory.clone(),
            sense,
        }
    }

    /// Pick up the first overlapping pickable item matching `kind`.
    pub fn pick(&mut self, kind: &str, world: &mut World) -> Result<String, CommandError> {
        let capacity = self.config.inventory_size;
        if self.inventory.len() >= capacity {
            return Err(CommandError::InventoryFull { capacity });
        }

        let hit = self.hit_rect();
        let (id, found) = world
            .entities
            .items()
            .find(|(_, item)| {
                item.pickable
                    && (kind == outcome::ANYTHING || item.kind == kind)
                    && item.hit_rect().overlaps(&hit)
            })
            .map(|(id, item)| (id, item.kind.clone()))
            .ok_or(CommandError::ItemNotFound)?;

        world.entities.remove(id);
        debug!("Player picked {} ({})", found, id);
        self.inventory.push(found);
        Ok(outcome::OK.to_string())
    }

    /// Drop inventory entry `index` as a new item at the player's position.
    pub fn drop_item(&mut self, index: i64, world: &mut World) -> Result<String, CommandError> {
        let len = self.inventory.len();
        let slot = usize::try_from(index)
            .ok()
            .filter(|i| *i < len)
            .ok_or(CommandError::InventoryIndexOutOfRange { index, len })?;

        let kind = self.inventory.remove(slot);
        let id = world.spawn_item(&kind, self.pos);
        debug!("Player dropped {} as {} at {}", kind, id, self.pos);
        Ok(format!("Dropped {}", kind))
    }
}

impl Drawable for Player {
    fn draw(&self, camera: &Camera) -> Option<DrawCommand> {
        let size = self.config.tile_size;
        Some(DrawCommand {
            sprite: SpriteKind::Player,
            rect: camera.apply(Rect::from_center(self.pos, size, size)),
            rotation: self.rot,
            layer: layers::PLAYER,
        })
    }
}
