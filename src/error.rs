//! Error types for each boundary of the simulation.
//!
//! [`CommandError`] never escapes the dispatch boundary: the simulation turns
//! it into a [`Response::Error`](crate::protocol::Response::Error) so a
//! misbehaving robot program cannot stop the tick loop. [`MapError`] and
//! [`ConfigError`] are fatal and only occur at startup.

use thiserror::Error;

/// Domain errors raised while handling a robot command.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Malformed command '{verb}': {reason}")]
    Malformed { verb: String, reason: String },

    #[error("Inventory full ({capacity} items)")]
    InventoryFull { capacity: usize },

    #[error("Not found")]
    ItemNotFound,

    #[error("Inventory index {index} out of range (inventory holds {len} items)")]
    InventoryIndexOutOfRange { index: i64, len: usize },
}

impl CommandError {
    pub(crate) fn malformed(verb: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            verb: verb.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failures while loading or validating a level map.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read map file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid object map: {0}")]
    Json(#[from] serde_json::Error),

    #[error("map is empty")]
    Empty,

    #[error("unknown map glyph '{glyph}' at row {row}, column {col}")]
    UnknownGlyph { glyph: char, row: usize, col: usize },

    #[error("map has no player spawn")]
    MissingPlayer,

    #[error("wall {rect} lies outside the {width}x{height} world")]
    WallOutOfBounds {
        rect: crate::types::Rect,
        width: f32,
        height: f32,
    },
}

/// A `SimConfig` value that would break the tick loop.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("config field '{field}' must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("config field '{field}' must be a finite number >= 0, got {value}")]
    Negative { field: &'static str, value: f32 },
}

/// Anything that stops a simulation from being built.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Map(#[from] MapError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Controller-side failures when talking to the simulation.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("simulation is no longer running")]
    Disconnected,

    #[error("unexpected response to '{verb}': {response}")]
    UnexpectedResponse { verb: String, response: String },
}
