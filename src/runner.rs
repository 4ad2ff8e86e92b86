//! Runner – fixed-rate tick loop around a [`Simulation`].
//!
//! ## Per-tick contract
//!
//! | Step | Collaborator            | Effect                                   |
//! |------|-------------------------|------------------------------------------|
//! | 1    | [`InputSource::poll`]   | keyboard state (or quit request)         |
//! | 2    | [`Simulation::tick`]    | dispatch, motion, animation, camera      |
//! | 3    | [`RenderSink::blit`]    | one call per draw command, layer ordered |
//! | 4    | [`RenderSink::present`] | once per tick                            |
//!
//! In [`ControlMode::Robot`] only the quit request is taken from the input
//! source; movement and pick/drop keys never reach the simulation.
//!
//! The loop stops on Ctrl-C, on a quit request from the input source, on a
//! [`ShutdownHandle`], or after `max_ticks`.

use crate::entity::DrawCommand;
use crate::player::InputState;
use crate::service::Simulation;
use crate::types::SimulationStats;
use anyhow::{ensure, Result};
use log::{info, trace};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Display backend. Asset lookup and blitting are up to the implementation.
pub trait RenderSink: Send {
    fn blit(&mut self, command: &DrawCommand);
    fn present(&mut self);
}

/// Keyboard backend.
pub trait InputSource: Send {
    fn poll(&mut self) -> InputState;
}

/// Which input drives the player for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    /// A robot program issues commands; keyboard input is ignored.
    Robot,
    /// Keyboard input drives the player directly.
    Manual,
}

/// Render sink that draws nothing and only counts.
#[derive(Debug, Default)]
pub struct HeadlessSink {
    blits: u64,
    frames: u64,
}

impl HeadlessSink {
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn blits(&self) -> u64 {
        self.blits
    }
}

impl RenderSink for HeadlessSink {
    fn blit(&mut self, command: &DrawCommand) {
        trace!("blit {:?} at {}", command.sprite, command.rect);
        self.blits += 1;
    }

    fn present(&mut self) {
        self.frames += 1;
    }
}

/// Input source with no keys held.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl InputSource for NoInput {
    fn poll(&mut self) -> InputState {
        InputState::default()
    }
}

/// Replays a fixed sequence of input states, one per tick, then idles.
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    frames: VecDeque<InputState>,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = InputState>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> InputState {
        self.frames.pop_front().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Config & handles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Tick rate in Hz.
    pub tick_rate_hz: f32,
    /// Stop after this many ticks (`None` runs until shutdown).
    pub max_ticks: Option<u64>,
    pub control: ControlMode,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 60.0,
            max_ticks: None,
            control: ControlMode::Robot,
        }
    }
}

/// Stops a running [`SimulationRunner`] from any thread.
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }
}

/// Final state of a finished run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub stats: SimulationStats,
    pub frames: u64,
}

// ---------------------------------------------------------------------------
// SimulationRunner
// ---------------------------------------------------------------------------

/// Drives a [`Simulation`] at a fixed tick rate.
///
/// Call [`SimulationRunner::run`] inside a Tokio runtime.
pub struct SimulationRunner {
    config: RunnerConfig,
    simulation: Simulation,
    sink: Box<dyn RenderSink>,
    input: Box<dyn InputSource>,
    shutdown_tx: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl SimulationRunner {
    pub fn new(
        config: RunnerConfig,
        simulation: Simulation,
        sink: Box<dyn RenderSink>,
        input: Box<dyn InputSource>,
    ) -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            config,
            simulation,
            sink,
            input,
            shutdown_tx: Arc::new(tx),
            shutdown_rx: rx,
        }
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: self.shutdown_tx.clone(),
        }
    }

    /// Run until shutdown. The simulation (and with it the command channel)
    /// is dropped on return, which stops any connected robot programs.
    pub async fn run(mut self) -> Result<RunSummary> {
        let hz = self.config.tick_rate_hz;
        ensure!(hz.is_finite() && hz > 0.0, "tick rate must be positive, got {}", hz);

        info!(
            "SimulationRunner active – ticking at {:.0}Hz ({:?} control)",
            hz, self.config.control
        );

        let mut timer = tokio::time::interval(std::time::Duration::from_secs_f32(1.0 / hz));
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let mut frames = 0u64;
        let mut last = Instant::now();

        loop {
            tokio::select! {
                _ = timer.tick() => {}
                _ = &mut ctrl_c => {
                    info!("SimulationRunner shutting down (SIGINT)");
                    break;
                }
                _ = self.shutdown_rx.changed() => {
                    info!("SimulationRunner shutting down (requested)");
                    break;
                }
            }

            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f32();
            last = now;

            let input = self.input.poll();
            if input.quit {
                info!("SimulationRunner shutting down (quit key)");
                break;
            }
            let input = match self.config.control {
                ControlMode::Manual => input,
                ControlMode::Robot => InputState::default(),
            };

            let span = tracing::debug_span!("tick", dt);
            let _entered = span.enter();

            let events = self.simulation.tick(dt, &input);
            for command in self.simulation.draw_list() {
                self.sink.blit(&command);
            }
            self.sink.present();
            frames += 1;

            if self.config.max_ticks.is_some_and(|max| events.tick >= max) {
                info!("SimulationRunner reached {} ticks", events.tick);
                break;
            }
        }

        let stats = self.simulation.stats();
        info!(
            "Run finished after {} ticks ({} commands, {} rejected)",
            stats.total_ticks, stats.commands_accepted, stats.commands_rejected
        );
        Ok(RunSummary { stats, frames })
    }
}
