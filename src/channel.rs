//! Command channel – the only link between robot threads and the
//! simulation loop.
//!
//! ## Threading model
//!
//! ```text
//! Robot thread(s)             │  Simulation loop (tick)
//! ─────────────────────────── │ ─────────────────────────────
//! Robot::send(cmd)            │
//!   → drain stale responses   │
//!   → commands.send(cmd)      │  if ready: commands.try_recv()
//!   → responses.recv()  ⏳    │    → begin() (ready = false)
//!                             │    … one or more ticks …
//!                             │    → respond(resp) (ready = true)
//! ```
//!
//! The simulation never blocks on a robot; a robot blocks only while waiting
//! for the response to its own command. World state never crosses the
//! channel, only owned [`RawCommand`]s and [`Response`]s.

use crate::error::ChannelError;
use crate::protocol::{RawCommand, Response};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use log::debug;

/// Create a connected pair of channel ends.
pub fn command_channel() -> (RobotEnd, SimulationEnd) {
    let (command_tx, command_rx) = crossbeam_channel::unbounded::<RawCommand>();
    let (response_tx, response_rx) = crossbeam_channel::unbounded::<Response>();

    (
        RobotEnd {
            commands: command_tx,
            responses: response_rx,
        },
        SimulationEnd {
            commands: command_rx,
            responses: response_tx,
            ready: true,
        },
    )
}

// ---------------------------------------------------------------------------
// Robot side
// ---------------------------------------------------------------------------

/// Controller end. Cheap to clone; clones share both queues.
#[derive(Clone)]
pub struct RobotEnd {
    commands: Sender<RawCommand>,
    responses: Receiver<Response>,
}

impl RobotEnd {
    /// Enqueue a command without waiting.
    pub fn post(&self, command: RawCommand) -> Result<(), ChannelError> {
        self.commands
            .send(command)
            .map_err(|_| ChannelError::Disconnected)
    }

    /// Block until the next response arrives.
    pub fn wait_response(&self) -> Result<Response, ChannelError> {
        self.responses.recv().map_err(|_| ChannelError::Disconnected)
    }

    /// Non-blocking check for a response.
    pub fn try_response(&self) -> Option<Response> {
        self.responses.try_recv().ok()
    }

    /// Discard responses left over from an earlier exchange.
    pub fn drain_stale(&self) -> usize {
        let mut dropped = 0;
        while let Ok(stale) = self.responses.try_recv() {
            debug!("Discarding stale response: {}", stale);
            dropped += 1;
        }
        dropped
    }
}

// ---------------------------------------------------------------------------
// Simulation side
// ---------------------------------------------------------------------------

/// Simulation end. Owns the readiness flag; only the tick loop writes it.
pub struct SimulationEnd {
    commands: Receiver<RawCommand>,
    responses: Sender<Response>,
    ready: bool,
}

impl SimulationEnd {
    /// `true` when no command is in flight.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Take at most one queued command, and only while ready.
    pub fn poll(&self) -> Option<RawCommand> {
        if !self.ready {
            return None;
        }
        match self.commands.try_recv() {
            Ok(command) => Some(command),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Mark a command as in flight.
    pub fn begin(&mut self) {
        self.ready = false;
    }

    /// Deliver the single response for the current command and become ready.
    pub fn respond(&mut self, response: Response) {
        if self.responses.send(response).is_err() {
            debug!("Response dropped: no robot is listening");
        }
        self.ready = true;
    }

    /// Number of commands waiting to be dispatched.
    pub fn pending(&self) -> usize {
        self.commands.len()
    }
}
