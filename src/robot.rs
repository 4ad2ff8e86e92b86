//! Robot programs – controller logic running on its own OS thread.
//!
//! A program only ever sees a [`Robot`] handle. Every call on it is a full
//! request/response exchange: stale responses are drained, the command is
//! posted, and the calling thread blocks until the simulation answers.

use crate::channel::RobotEnd;
use crate::error::ChannelError;
use crate::protocol::{verbs, RawCommand, Response, StatusReport};
use log::{info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Blocking command API for robot programs.
///
/// Clones share one exchange lock, so even several threads driving the same
/// robot keep at most one command outstanding.
#[derive(Clone)]
pub struct Robot {
    link: RobotEnd,
    exchange: Arc<Mutex<()>>,
}

impl Robot {
    pub fn new(link: RobotEnd) -> Self {
        Self {
            link,
            exchange: Arc::new(Mutex::new(())),
        }
    }

    /// The underlying channel end, for controllers that poll instead of
    /// blocking.
    pub fn link(&self) -> &RobotEnd {
        &self.link
    }

    /// Send one command and wait for its response.
    pub fn send(&self, command: RawCommand) -> Result<Response, ChannelError> {
        let _guard = self.exchange.lock();
        self.link.drain_stale();
        self.link.post(command)?;
        self.link.wait_response()
    }

    /// Move `tiles` tiles ahead; answers "goal reached" or "hit a wall".
    pub fn forward(&self, tiles: f32) -> Result<Response, ChannelError> {
        self.send(RawCommand::forward(tiles))
    }

    /// Rotate to an absolute heading in degrees.
    pub fn turn(&self, angle: f32) -> Result<Response, ChannelError> {
        self.send(RawCommand::turn(angle))
    }

    pub fn status(&self) -> Result<StatusReport, ChannelError> {
        match self.send(RawCommand::status())? {
            Response::Status(report) => Ok(report),
            other => Err(unexpected(verbs::STATUS, &other)),
        }
    }

    pub fn pick(&self, kind: &str) -> Result<Response, ChannelError> {
        self.send(RawCommand::pick(kind))
    }

    pub fn drop(&self, index: usize) -> Result<Response, ChannelError> {
        self.send(RawCommand::drop(index))
    }

    pub fn can_forward(&self, tiles: f32) -> Result<bool, ChannelError> {
        match self.send(RawCommand::can_forward(tiles))? {
            Response::Flag(flag) => Ok(flag),
            other => Err(unexpected(verbs::CAN_FORWARD, &other)),
        }
    }
}

fn unexpected(verb: &str, response: &Response) -> ChannelError {
    ChannelError::UnexpectedResponse {
        verb: verb.to_string(),
        response: response.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Programs
// ---------------------------------------------------------------------------

/// Controller logic. `run` returns when the program is done or the
/// simulation has gone away.
pub trait RobotProgram: Send {
    fn name(&self) -> &str;
    fn run(&mut self, robot: &Robot) -> Result<(), ChannelError>;
}

/// Walks a staircase: one tile ahead, quarter turn, one tile ahead, quarter
/// turn, alternating the turn direction each round.
pub struct ZigZagProgram {
    pub pause: Duration,
}

impl RobotProgram for ZigZagProgram {
    fn name(&self) -> &str {
        "zigzag"
    }

    fn run(&mut self, robot: &Robot) -> Result<(), ChannelError> {
        let mut sign = -1.0;
        loop {
            for _ in 0..2 {
                robot.forward(1.0)?;
                let heading = robot.status()?.rot + 90.0 * sign;
                robot.turn(heading)?;
            }
            sign = -sign;
            thread::sleep(self.pause);
        }
    }
}

/// Steps one tile forward, then waits.
pub struct ForwardProgram {
    pub pause: Duration,
}

impl RobotProgram for ForwardProgram {
    fn name(&self) -> &str {
        "forward"
    }

    fn run(&mut self, robot: &Robot) -> Result<(), ChannelError> {
        loop {
            let response = robot.forward(1.0)?;
            info!("forward: {}", response);
            thread::sleep(self.pause);
        }
    }
}

/// Logs the status report as pretty JSON, then waits.
pub struct StatusProgram {
    pub pause: Duration,
}

impl RobotProgram for StatusProgram {
    fn name(&self) -> &str {
        "status"
    }

    fn run(&mut self, robot: &Robot) -> Result<(), ChannelError> {
        loop {
            let report = robot.status()?;
            match serde_json::to_string_pretty(&report) {
                Ok(json) => info!("status:\n{}", json),
                Err(e) => warn!("Failed to serialise status: {}", e),
            }
            thread::sleep(self.pause);
        }
    }
}

/// Names accepted by [`program_by_name`].
pub const PROGRAM_NAMES: &[&str] = &["zigzag", "forward", "status"];

pub fn program_by_name(name: &str, pause: Duration) -> Option<Box<dyn RobotProgram>> {
    match name {
        "zigzag" => Some(Box::new(ZigZagProgram { pause })),
        "forward" => Some(Box::new(ForwardProgram { pause })),
        "status" => Some(Box::new(StatusProgram { pause })),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Spawning
// ---------------------------------------------------------------------------

/// Run `program` on a dedicated, named thread.
///
/// The thread ends when the program returns; a disconnected simulation is
/// the normal way for an endless program to stop.
pub fn spawn(
    mut program: Box<dyn RobotProgram>,
    robot: Robot,
) -> std::io::Result<thread::JoinHandle<()>> {
    let name = format!("robot-{}", program.name());
    thread::Builder::new().name(name).spawn(move || {
        info!("Robot program '{}' started", program.name());
        match program.run(&robot) {
            Ok(()) => info!("Robot program '{}' finished", program.name()),
            Err(ChannelError::Disconnected) => {
                info!("Robot program '{}' stopped: simulation ended", program.name())
            }
            Err(e) => warn!("Robot program '{}' failed: {}", program.name(), e),
        }
    })
}
