//! Simulation – one tick of the world: command dispatch, player motion,
//! entity animation and camera follow.

use crate::channel::{command_channel, RobotEnd, SimulationEnd};
use crate::entity::{DrawCommand, Drawable, TickContext, World};
use crate::error::SetupError;
use crate::player::{GoalOutcome, InputState, Player};
use crate::protocol::{outcome, Command, RawCommand, Response};
use crate::robot::Robot;
use crate::tilemap::MapSource;
use crate::types::{Rect, SimConfig, SimulationStats};
use log::{debug, info, warn};

// ---------------------------------------------------------------------------
// Tick result
// ---------------------------------------------------------------------------

/// What happened during a single [`Simulation::tick`] call.
#[derive(Debug, Clone, Default)]
pub struct TickEvents {
    /// The tick counter that produced this set of events.
    pub tick: u64,
    /// Verb taken off the command queue this tick, if any.
    pub dispatched: Option<String>,
    /// Responses delivered to the robot this tick.
    pub responses: Vec<Response>,
    /// Goal that ended this tick.
    pub goal_outcome: Option<GoalOutcome>,
}

pub struct Simulation {
    config: SimConfig,
    world: World,
    player: Player,
    /// Wall rectangles, fixed after load.
    walls: Vec<Rect>,
    link: SimulationEnd,
    robot: Robot,
    tick_count: u64,
    /// Simulated seconds since start.
    clock: f32,
    last_manual_drop: Option<f32>,
    commands_accepted: u64,
    commands_rejected: u64,
}

impl Simulation {
    pub fn new(world: World, player: Player, config: SimConfig) -> Self {
        let (robot_end, link) = command_channel();
        let walls = world.wall_rects().collect();
        Self {
            config,
            world,
            player,
            walls,
            link,
            robot: Robot::new(robot_end),
            tick_count: 0,
            clock: 0.0,
            last_manual_drop: None,
            commands_accepted: 0,
            commands_rejected: 0,
        }
    }

    /// Load a level from `source` and place the player at its spawn point.
    ///
    /// The map's tile size replaces the configured one; the merged config is
    /// validated before anything is built.
    pub fn from_map(source: &dyn MapSource, mut config: SimConfig) -> Result<Self, SetupError> {
        let data = source.load()?;
        config.tile_size = data.tile_size;
        config.validate()?;
        let (world, spawn) = World::from_map(&data, &config)?;
        info!(
            "Loaded {} ({}x{} tiles, {} entities)",
            source.describe(),
            world.geometry.tile_width,
            world.geometry.tile_height,
            world.entities.len()
        );
        let player = Player::new(spawn, &config);
        Ok(Self::new(world, player, config))
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Handle for robot programs. All clones share one exchange lock.
    pub fn robot(&self) -> Robot {
        self.robot.clone()
    }

    /// Non-blocking channel end sharing the robot's queues.
    pub fn robot_end(&self) -> RobotEnd {
        self.robot.link().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.link.is_ready()
    }

    pub fn pending_commands(&self) -> usize {
        self.link.pending()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Main tick
    // -----------------------------------------------------------------------

    /// Advance the simulation by `dt` seconds (clamped to `max_frame_dt`).
    pub fn tick(&mut self, dt: f32, input: &InputState) -> TickEvents {
        self.tick_count += 1;
        // clamp() would panic on inverted or NaN bounds from an unvalidated config
        let dt = dt.min(self.config.max_frame_dt).max(0.0);
        self.clock += dt;

        let mut events = TickEvents {
            tick: self.tick_count,
            ..Default::default()
        };

        if let Some(raw) = self.link.poll() {
            self.dispatch(&raw, &mut events);
        }

        if self.player.is_idle() && self.link.is_ready() {
            self.manual_actions(input);
        }

        if let Some(ended) = self.player.advance(dt, input, &self.walls) {
            events.goal_outcome = Some(ended);
            self.deliver(Response::message(ended.message()), &mut events);
        }

        let ctx = TickContext {
            dt,
            player_pos: self.player.pos(),
            bob_range: self.config.item_bob_range,
            bob_speed: self.config.item_bob_speed,
        };
        self.world.update(&ctx);
        self.world.camera.follow(self.player.pos());

        events
    }

    fn deliver(&mut self, response: Response, events: &mut TickEvents) {
        debug!("Response: {}", response);
        events.responses.push(response.clone());
        self.link.respond(response);
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Run one command. Goal commands answer later, when the goal ends;
    /// everything else answers within this tick.
    fn dispatch(&mut self, raw: &RawCommand, events: &mut TickEvents) {
        let command = match Command::try_from(raw) {
            Ok(command) => command,
            Err(e) => {
                warn!("Rejected command {}: {}", raw, e);
                events.dispatched = Some(raw.verb.clone());
                self.commands_rejected += 1;
                self.deliver(e.into(), events);
                return;
            }
        };

        debug!("Dispatching {}", raw);
        events.dispatched = Some(command.verb().to_string());
        self.commands_accepted += 1;
        self.link.begin();

        let result = match command {
            Command::Forward { tiles } => {
                self.player.start_forward(tiles);
                return;
            }
            Command::Turn { angle } => {
                self.player.start_turn(angle);
                return;
            }
            Command::Status => Ok(Response::Status(self.player.status(&self.world))),
            Command::Pick { kind } => self
                .player
                .pick(&kind, &mut self.world)
                .map(Response::Message),
            Command::Drop { index } => self
                .player
                .drop_item(index, &mut self.world)
                .map(Response::Message),
            Command::CanForward { tiles } => {
                let bounds = self.world.geometry.bounds();
                Ok(Response::Flag(
                    self.player.can_forward(tiles, &self.walls, &bounds),
                ))
            }
        };

        let response = result.unwrap_or_else(|e| {
            debug!("Command {} failed: {}", raw, e);
            e.into()
        });
        self.deliver(response, events);
    }

    /// Keyboard pick/drop. Drops are rate limited by `drop_interval_ms`.
    fn manual_actions(&mut self, input: &InputState) {
        if input.pick {
            if let Err(e) = self.player.pick(outcome::ANYTHING, &mut self.world) {
                debug!("Manual pick: {}", e);
            }
        }

        if input.drop && !self.player.inventory().is_empty() {
            let interval = self.config.drop_interval_ms as f32 / 1000.0;
            let due = self
                .last_manual_drop
                .map_or(true, |last| self.clock - last >= interval);
            if due {
                let last = self.player.inventory().len() as i64 - 1;
                if let Err(e) = self.player.drop_item(last, &mut self.world) {
                    debug!("Manual drop: {}", e);
                }
                self.last_manual_drop = Some(self.clock);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Render & stats
    // -----------------------------------------------------------------------

    /// Screen-space draw commands for this frame, ordered by layer.
    pub fn draw_list(&self) -> Vec<DrawCommand> {
        let mut commands = self.world.draw_commands();
        commands.extend(self.player.draw(&self.world.camera));
        commands.sort_by_key(|c| c.layer);
        commands
    }

    pub fn stats(&self) -> SimulationStats {
        SimulationStats {
            total_ticks: self.tick_count,
            commands_accepted: self.commands_accepted,
            commands_rejected: self.commands_rejected,
            items_in_world: self.world.item_count(),
            inventory_len: self.player.inventory().len(),
            walls: self.walls.len(),
            player_pos: self.player.pos(),
        }
    }
}
