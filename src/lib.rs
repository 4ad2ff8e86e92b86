//! Medomed
//!
//! A real-time tile world in which robot programs, each on its own thread,
//! steer a single avatar through high-level commands while a fixed-rate
//! loop simulates and renders the world.
//!
//! ## Architecture
//!
//! ```text
//! SimulationRunner  (runner.rs)   ← tick loop, render sink, input, shutdown
//!   └── Simulation  (service.rs)  ← dispatch, tick order, stats
//!         ├── Player  (player.rs) ← goal state machine, collisions, items
//!         ├── World   (entity.rs) ← walls / items / mobs arena, camera
//!         │     └── MapSource (tilemap.rs)
//!         └── SimulationEnd (channel.rs)
//!                 ⇅ RawCommand / Response
//! Robot + RobotProgram (robot.rs) ← one OS thread per program
//! ```
//!
//! Robot threads never touch world state: everything they learn arrives as
//! an owned [`protocol::Response`], and the simulation accepts at most one
//! command at a time.

// Simulation core is always available.
pub mod channel;
pub mod entity;
pub mod error;
pub mod player;
pub mod protocol;
pub mod robot;
pub mod service;
pub mod tilemap;
pub mod types;

// The async tick loop requires the `runtime` feature.
#[cfg(feature = "runtime")]
pub mod runner;

// Convenience re-exports
pub use channel::{command_channel, RobotEnd, SimulationEnd};
pub use entity::{Entity, EntityArena, EntityId, Item, Mob, Wall, World};
pub use error::{ChannelError, CommandError, ConfigError, MapError, SetupError};
pub use player::{Goal, GoalOutcome, InputState, Player};
pub use protocol::{Command, RawCommand, Response, SenseReport, SensedItem, StatusReport};
pub use robot::{Robot, RobotProgram};
pub use service::{Simulation, TickEvents};
pub use tilemap::{Camera, MapData, MapGeometry, MapObject, MapSource, ObjectMap, TextGridMap};
pub use types::{Rect, SimConfig, SimulationStats, Vec2};

#[cfg(feature = "runtime")]
pub use runner::{ControlMode, RunnerConfig, SimulationRunner};
