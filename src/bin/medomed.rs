//! medomed binary
//!
//! Loads a level, starts a robot program (or waits for keyboard input) and
//! runs the simulation until Ctrl-C.
//!
//! ## Configuration (flags / env / TOML via `config` crate)
//!
//! | Key                    | Default   | Description                            |
//! |------------------------|-----------|----------------------------------------|
//! | `MEDOMED_MAP`          | built-in  | Level file (`.txt` grid or `.json`)    |
//! | `MEDOMED_CONFIG`       | —         | TOML file with `SimConfig` overrides   |
//! | `MEDOMED_CONTROL`      | `robot`   | `robot` or `manual`                    |
//! | `MEDOMED_PROGRAM`      | `zigzag`  | Robot program (`zigzag`, `forward`, `status`) |
//! | `MEDOMED_PAUSE_MS`     | `1000`    | Pause between program rounds           |
//! | `MEDOMED_TICK_RATE_HZ` | `fps`     | Tick rate override                     |
//! | `MEDOMED_MAX_TICKS`    | —         | Stop after this many ticks             |
//! | `MEDOMED__<FIELD>`     | —         | Any `SimConfig` field, e.g. `MEDOMED__ROBOT_SPEED` |

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use medomed::{
    robot,
    runner::{ControlMode, HeadlessSink, NoInput, RunnerConfig, SimulationRunner},
    service::Simulation,
    tilemap::{MapSource, ObjectMap, TextGridMap},
    types::SimConfig,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Level used when no map file is given.
const DEMO_LEVEL: &str = "\
1111111111111111
1P.....1.......1
1......1...A...1
1..A...1.......1
1..............1
1.....M....G...1
1111111111111111
";

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ControlArg {
    Robot,
    Manual,
}

impl From<ControlArg> for ControlMode {
    fn from(arg: ControlArg) -> Self {
        match arg {
            ControlArg::Robot => ControlMode::Robot,
            ControlArg::Manual => ControlMode::Manual,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "medomed", about = "Medomed robot tile world", version)]
struct Args {
    /// Level file: character grid (.txt) or object map (.json)
    #[arg(long, env = "MEDOMED_MAP")]
    map: Option<PathBuf>,

    /// TOML file with simulation settings
    #[arg(long, env = "MEDOMED_CONFIG")]
    config: Option<PathBuf>,

    /// Who drives the player
    #[arg(long, env = "MEDOMED_CONTROL", value_enum, default_value_t = ControlArg::Robot)]
    control: ControlArg,

    /// Robot program to run in robot control mode
    #[arg(long, env = "MEDOMED_PROGRAM", default_value = "zigzag")]
    program: String,

    /// Pause between robot program rounds (ms)
    #[arg(long, env = "MEDOMED_PAUSE_MS", default_value_t = 1000)]
    pause_ms: u64,

    /// Tick rate (Hz); defaults to the configured fps
    #[arg(long, env = "MEDOMED_TICK_RATE_HZ")]
    tick_rate_hz: Option<f32>,

    /// Stop after this many ticks
    #[arg(long, env = "MEDOMED_MAX_TICKS")]
    max_ticks: Option<u64>,
}

fn load_config(path: Option<&Path>, tick_rate_hz: Option<f32>) -> Result<SimConfig> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }
    let mut config: SimConfig = builder
        .add_source(
            config::Environment::with_prefix("MEDOMED")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to read simulation config")?
        .try_deserialize()
        .context("Invalid simulation config")?;

    if let Some(hz) = tick_rate_hz {
        config.fps = hz;
    }
    config.validate().context("Invalid simulation config")?;
    Ok(config)
}

fn load_map(path: Option<&Path>, tile_size: f32) -> Result<Box<dyn MapSource>> {
    let Some(path) = path else {
        return Ok(Box::new(TextGridMap::parse(DEMO_LEVEL, tile_size)));
    };
    let is_json = path.extension().is_some_and(|ext| ext == "json");
    let source: Box<dyn MapSource> = if is_json {
        Box::new(ObjectMap::from_file(path)?)
    } else {
        Box::new(TextGridMap::from_file(path, tile_size)?)
    };
    Ok(source)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medomed=debug".parse()?),
        )
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref(), args.tick_rate_hz)?;

    let mode = ControlMode::from(args.control);
    log::info!(
        "Starting medomed (control={:?}, program='{}', fps={})",
        mode,
        args.program,
        config.fps,
    );

    let source = load_map(args.map.as_deref(), config.tile_size).context("Failed to load map")?;
    let simulation =
        Simulation::from_map(source.as_ref(), config.clone()).context("Failed to build level")?;

    match mode {
        ControlMode::Robot => {
            let pause = Duration::from_millis(args.pause_ms);
            let program = robot::program_by_name(&args.program, pause).with_context(|| {
                format!(
                    "Unknown robot program '{}' (expected one of {:?})",
                    args.program,
                    robot::PROGRAM_NAMES
                )
            })?;
            robot::spawn(program, simulation.robot()).context("Failed to spawn robot thread")?;
        }
        ControlMode::Manual => {
            log::info!("Manual control: the player follows keyboard input");
        }
    }

    let runner_config = RunnerConfig {
        tick_rate_hz: config.fps,
        max_ticks: args.max_ticks,
        control: mode,
    };

    // Run until shutdown
    let summary = SimulationRunner::new(
        runner_config,
        simulation,
        Box::new(HeadlessSink::default()),
        Box::new(NoInput),
    )
    .run()
    .await?;

    log::info!(
        "Final stats after {} frames: {}",
        summary.frames,
        serde_json::to_string(&summary.stats)?
    );
    Ok(())
}
