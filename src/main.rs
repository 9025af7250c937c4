use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use harthio_layout::config::{self, AppConfig};
use harthio_layout::device::{DeviceDescriptor, SharedViewport, Viewport};
use harthio_layout::events::EventBus;
use harthio_layout::orientation::{compute_layout, OrientationCoordinator};
use harthio_layout::AppError;

/// Log level for the application
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

/// harthio-layout command line arguments
#[derive(Parser, Debug)]
#[command(name = "harthio-layout")]
#[command(version, about = "Device-aware video call layout tooling", long_about = None)]
struct CliArgs {
    /// Configuration file (JSON); defaults to $HARTHIO_LAYOUT_CONFIG
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short = 'l', long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Viewport readings shared by the subcommands
#[derive(clap::Args, Debug, Clone)]
struct ViewportArgs {
    /// Viewport width in CSS pixels
    #[arg(long)]
    width: u32,

    /// Viewport height in CSS pixels
    #[arg(long)]
    height: u32,

    /// Browser user-agent string
    #[arg(long, default_value = "")]
    user_agent: String,

    /// Touch input is available
    #[arg(long)]
    touch: bool,
}

impl ViewportArgs {
    fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height, self.user_agent.clone(), self.touch)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a viewport and print its device descriptor
    Describe {
        #[command(flatten)]
        viewport: ViewportArgs,
    },

    /// Compute the video layout for a local/remote descriptor pair
    Layout {
        /// Local descriptor: inline JSON or a file path
        #[arg(long)]
        local: String,

        /// Remote descriptor: inline JSON or a file path
        #[arg(long)]
        remote: String,
    },

    /// Replay viewport changes through a live coordinator and print its events
    Simulate {
        #[command(flatten)]
        viewport: ViewportArgs,

        /// Viewport change as WIDTHxHEIGHT[@DELAY_MS], repeatable
        #[arg(long = "step", value_name = "STEP")]
        steps: Vec<Step>,
    },

    /// Print the effective configuration
    Config {
        /// Write the effective configuration to this file
        #[arg(long, value_name = "FILE")]
        write: Option<PathBuf>,
    },
}

/// One simulated viewport change
#[derive(Debug, Clone, Copy)]
struct Step {
    width: u32,
    height: u32,
    delay_ms: u64,
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (size, delay) = match s.split_once('@') {
            Some((size, delay)) => (size, Some(delay)),
            None => (s, None),
        };
        let (width, height) = size
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", size))?;
        let width = width.trim().parse().map_err(|_| format!("invalid width '{}'", width))?;
        let height = height.trim().parse().map_err(|_| format!("invalid height '{}'", height))?;
        let delay_ms = match delay {
            Some(delay) => delay.trim().parse().map_err(|_| format!("invalid delay '{}'", delay))?,
            None => 0,
        };
        Ok(Step {
            width,
            height,
            delay_ms,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_level, args.verbose);

    let config_path = config::resolve_config_path(args.config.clone());
    let app_config = config::load_or_default(config_path.as_deref())?;

    match args.command {
        Command::Describe { viewport } => {
            let descriptor = DeviceDescriptor::classify(&viewport.viewport());
            println!("{}", serde_json::to_string_pretty(&descriptor)?);
        }
        Command::Layout { local, remote } => {
            let local = read_descriptor(&local)?;
            let remote = read_descriptor(&remote)?;

            let max_age = chrono::Duration::seconds(app_config.freshness.max_age_secs as i64);
            if !remote.is_fresh_within(chrono::Utc::now(), max_age) {
                tracing::warn!(
                    "Remote descriptor is older than {}s, ask the peer for a fresh one",
                    app_config.freshness.max_age_secs
                );
            }

            let layout = compute_layout(&local, &remote);
            println!("{}", serde_json::to_string_pretty(&layout)?);
        }
        Command::Simulate { viewport, steps } => {
            simulate(&app_config, viewport.viewport(), &steps).await?;
        }
        Command::Config { write } => {
            if let Some(path) = write {
                config::save_config(&path, &app_config)?;
                tracing::info!("Configuration written to {}", path.display());
            }
            println!("{}", serde_json::to_string_pretty(&app_config)?);
        }
    }

    Ok(())
}

/// Drive a coordinator through `steps`, printing every event as a JSON line
async fn simulate(config: &AppConfig, initial: Viewport, steps: &[Step]) -> anyhow::Result<()> {
    let viewport = Arc::new(SharedViewport::new(initial));
    let events = Arc::new(EventBus::new());
    let coordinator = OrientationCoordinator::from_app_config(config, viewport.clone());
    coordinator.set_event_bus(events.clone());

    let mut rx = events.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::warn!("Failed to serialize event: {}", e),
            }
        }
    });

    coordinator.start();
    println!("{}", serde_json::to_string(&coordinator.current_state())?);

    for step in steps {
        tokio::time::sleep(Duration::from_millis(step.delay_ms)).await;
        tracing::debug!("Viewport -> {}x{}", step.width, step.height);
        viewport.resize(step.width, step.height);
    }

    // Let the last debounce and transition window play out
    let settle = config.coordinator.debounce_ms as u64 + config.coordinator.transition_duration_ms as u64 + 50;
    tokio::time::sleep(Duration::from_millis(settle)).await;

    let state = coordinator.current_state();
    coordinator.destroy();
    drop(events);
    printer.abort();

    println!("{}", serde_json::to_string(&state)?);
    Ok(())
}

/// Parse a descriptor given inline or as a file path
fn read_descriptor(value: &str) -> harthio_layout::Result<DeviceDescriptor> {
    let trimmed = value.trim();
    let json = if trimmed.starts_with('{') {
        trimmed.to_string()
    } else {
        std::fs::read_to_string(trimmed)
            .map_err(|e| AppError::BadRequest(format!("cannot read descriptor {}: {}", trimmed, e)))?
    };
    Ok(serde_json::from_str(&json)?)
}

/// Initialize logging with tracing
fn init_logging(level: LogLevel, verbose_count: u8) {
    // Verbose count overrides log level
    let effective_level = match verbose_count {
        0 => level,
        1 => LogLevel::Info,
        2 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };

    let filter = match effective_level {
        LogLevel::Error => "harthio_layout=error",
        LogLevel::Warn => "harthio_layout=warn",
        LogLevel::Info => "harthio_layout=info",
        LogLevel::Debug => "harthio_layout=debug",
        LogLevel::Trace => "harthio_layout=trace",
    };

    // Environment variable takes highest priority
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

    if let Err(err) = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
    {
        eprintln!("failed to initialize tracing: {}", err);
    }
}
