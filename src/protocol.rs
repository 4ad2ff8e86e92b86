//! Robot command protocol.
//!
//! This module owns **every message that crosses the command channel**
//! between a robot program and the simulation loop.
//!
//! ## Shape
//!
//! | Direction            | Type           | Notes                                 |
//! |----------------------|----------------|---------------------------------------|
//! | robot → simulation   | [`RawCommand`] | verb string + JSON arguments          |
//! | simulation (parsed)  | [`Command`]    | closed enum, one `match` to dispatch  |
//! | simulation → robot   | [`Response`]   | exactly one per accepted command      |
//!
//! ## Design rules
//!
//! 1. The wire form stays stringly so unknown verbs can be reported back as
//!    errors instead of failing to compile on the robot side.
//! 2. Status reports are owned values; nothing aliases live world state.
//! 3. Positions in sense reports are offsets from the player, never
//!    absolute world coordinates.

use crate::error::CommandError;
use crate::types::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Verbs and outcome strings
// ---------------------------------------------------------------------------

/// Every verb understood by the simulation.
pub mod verbs {
    pub const FORWARD: &str = "forward";
    pub const TURN: &str = "turn";
    pub const STATUS: &str = "status";
    pub const PICK: &str = "pick";
    pub const DROP: &str = "drop";
    pub const CAN_FORWARD: &str = "can_forward";
}

/// Fixed response texts.
pub mod outcome {
    pub const GOAL_REACHED: &str = "goal reached";
    pub const HIT_A_WALL: &str = "hit a wall";
    pub const ANGLE_GOAL_REACHED: &str = "angle goal reached";
    pub const OK: &str = "OK";

    /// Matches any pickable item kind in a `pick` command.
    pub const ANYTHING: &str = "anything";
}

// ---------------------------------------------------------------------------
// Raw (wire) command
// ---------------------------------------------------------------------------

/// A command as issued by a robot program: `(verb, args...)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawCommand {
    pub verb: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl RawCommand {
    pub fn new(verb: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            verb: verb.into(),
            args,
        }
    }

    pub fn forward(tiles: f32) -> Self {
        Self::new(verbs::FORWARD, vec![Value::from(tiles)])
    }

    pub fn turn(angle: f32) -> Self {
        Self::new(verbs::TURN, vec![Value::from(angle)])
    }

    pub fn status() -> Self {
        Self::new(verbs::STATUS, Vec::new())
    }

    pub fn pick(kind: &str) -> Self {
        Self::new(verbs::PICK, vec![Value::from(kind)])
    }

    pub fn drop(index: usize) -> Self {
        Self::new(verbs::DROP, vec![Value::from(index)])
    }

    pub fn can_forward(tiles: f32) -> Self {
        Self::new(verbs::CAN_FORWARD, vec![Value::from(tiles)])
    }
}

impl std::fmt::Display for RawCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.verb)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}

// ---------------------------------------------------------------------------
// Parsed command
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Move `tiles` tiles along the current heading.
    Forward { tiles: f32 },
    /// Rotate to an absolute heading in degrees.
    Turn { angle: f32 },
    Status,
    /// Pick an overlapping item of `kind` (or [`outcome::ANYTHING`]).
    Pick { kind: String },
    /// Drop the inventory entry at `index`. Negative indices are kept so the
    /// player can report them as out of range.
    Drop { index: i64 },
    /// Would `forward(tiles)` complete without hitting a wall?
    CanForward { tiles: f32 },
}

impl Command {
    pub fn verb(&self) -> &'static str {
        match self {
            Command::Forward { .. } => verbs::FORWARD,
            Command::Turn { .. } => verbs::TURN,
            Command::Status => verbs::STATUS,
            Command::Pick { .. } => verbs::PICK,
            Command::Drop { .. } => verbs::DROP,
            Command::CanForward { .. } => verbs::CAN_FORWARD,
        }
    }
}

impl TryFrom<&RawCommand> for Command {
    type Error = CommandError;

    fn try_from(raw: &RawCommand) -> Result<Self, Self::Error> {
        let verb = raw.verb.as_str();
        match verb {
            verbs::FORWARD => Ok(Command::Forward {
                tiles: single_number(raw)?,
            }),
            verbs::TURN => Ok(Command::Turn {
                angle: single_number(raw)?,
            }),
            verbs::STATUS => {
                expect_arity(raw, 0)?;
                Ok(Command::Status)
            }
            verbs::PICK => {
                expect_arity(raw, 1)?;
                let kind = raw.args[0]
                    .as_str()
                    .ok_or_else(|| CommandError::malformed(verb, "item kind must be a string"))?;
                Ok(Command::Pick {
                    kind: kind.to_string(),
                })
            }
            verbs::DROP => {
                expect_arity(raw, 1)?;
                let index = raw.args[0].as_i64().ok_or_else(|| {
                    CommandError::malformed(verb, "inventory index must be an integer")
                })?;
                Ok(Command::Drop { index })
            }
            verbs::CAN_FORWARD => Ok(Command::CanForward {
                tiles: single_number(raw)?,
            }),
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }
}

fn expect_arity(raw: &RawCommand, n: usize) -> Result<(), CommandError> {
    if raw.args.len() == n {
        Ok(())
    } else {
        Err(CommandError::malformed(
            &raw.verb,
            format!("expected {} argument(s), got {}", n, raw.args.len()),
        ))
    }
}

fn single_number(raw: &RawCommand) -> Result<f32, CommandError> {
    expect_arity(raw, 1)?;
    let value = raw.args[0]
        .as_f64()
        .map(|v| v as f32)
        .ok_or_else(|| CommandError::malformed(&raw.verb, "argument must be a number"))?;
    // Values beyond f32 range become infinite and would leave a goal unreachable.
    if !value.is_finite() {
        return Err(CommandError::malformed(
            &raw.verb,
            format!("argument {} is out of range", raw.args[0]),
        ));
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Response {
    /// Textual outcome ("goal reached", "OK", "Dropped apple", …).
    Message(String),
    Status(StatusReport),
    /// Answer to `can_forward`.
    Flag(bool),
    /// A command error rendered as text.
    Error(String),
}

impl Response {
    pub fn message(text: impl Into<String>) -> Self {
        Response::Message(text.into())
    }

    /// Text of a message or error response.
    pub fn text(&self) -> Option<&str> {
        match self {
            Response::Message(s) | Response::Error(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }
}

impl From<CommandError> for Response {
    fn from(err: CommandError) -> Self {
        Response::Error(err.to_string())
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Response::Message(s) => write!(f, "{}", s),
            Response::Error(s) => write!(f, "error: {}", s),
            Response::Flag(b) => write!(f, "{}", b),
            Response::Status(s) => write!(
                f,
                "status pos={} rot={:.1} inventory={:?} on={} near={}",
                s.pos,
                s.rot,
                s.inventory,
                s.sense.on.len(),
                s.sense.near.len()
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Status snapshot
// ---------------------------------------------------------------------------

/// Value snapshot of the player returned by `status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusReport {
    pub pos: Vec2,
    /// Heading in degrees, `[0, 360)`.
    pub rot: f32,
    pub inventory: Vec<String>,
    pub sense: SenseReport,
}

/// Items around the player, split by proximity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SenseReport {
    /// Items whose rectangle overlaps the player's hit-rectangle.
    pub on: Vec<SensedItem>,
    /// Items within the sense radius that are not under the player.
    pub near: Vec<SensedItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensedItem {
    pub kind: String,
    /// Vector from the player to the item.
    pub offset: Vec2,
}
