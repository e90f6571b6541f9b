use crate::config::{Config, LoggingConfig};
use crate::interpreter::{self, PooledExecutor};
use crate::process::{pipe, Effect, Process};
use crate::source::{self, FileSource};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Cadence - resumable processes with guaranteed cleanup", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter (overrides config file and env vars)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the lines of a file
    Lines {
        /// File to read
        path: PathBuf,

        /// Stop after this many lines (the file is still closed)
        #[arg(long)]
        take: Option<usize>,

        #[arg(long, value_enum, default_value = "simple")]
        engine: LinesEngine,

        /// Print the lines as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Emit timed ticks through the worker pool or the async interpreter
    Ticks {
        #[arg(long, default_value = "5")]
        count: u64,

        /// Delay before each tick in milliseconds
        #[arg(long, default_value = "100")]
        delay_ms: u64,

        /// Stop after this many ticks
        #[arg(long)]
        take: Option<usize>,

        #[arg(long, value_enum, default_value = "pooled")]
        engine: TicksEngine,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LinesEngine {
    /// Plain interpreter loop
    Simple,
    /// Stack-safe trampolined interpreter
    Trampoline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TicksEngine {
    /// Synchronous loop over a tokio worker pool
    Pooled,
    /// The process as a single future
    Async,
}

/// Run the CLI by parsing process arguments
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run_cli_with_args(cli)
}

/// Run the CLI with already parsed arguments
pub fn run_cli_with_args(cli: Cli) -> Result<()> {
    let config = Config::builder()
        .config_path(cli.config)
        .log_level(cli.log_level)
        .build()
        .context("Failed to load configuration")?;

    init_tracing(&config.logging)?;

    match cli.command {
        Commands::Lines {
            path,
            take,
            engine,
            json,
        } => {
            let name = path.to_string_lossy().into_owned();
            let process = limit(source::lines(name), take);
            let executor = FileSource::default();

            let lines = match engine {
                LinesEngine::Simple => interpreter::run(executor, process),
                LinesEngine::Trampoline => interpreter::run_trampolined(executor, process),
            }
            .with_context(|| format!("Failed to read {}", path.display()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&lines)?);
            } else {
                for line in lines {
                    println!("{line}");
                }
            }
        }

        Commands::Ticks {
            count,
            delay_ms,
            take,
            engine,
        } => {
            let process = limit(source::ticks(count, Duration::from_millis(delay_ms)), take);

            let ticks = match engine {
                TicksEngine::Pooled => {
                    let executor = PooledExecutor::new(&config.executor)
                        .context("Failed to start worker pool")?;
                    interpreter::run(executor, process)
                }
                TicksEngine::Async => {
                    let runtime = tokio::runtime::Builder::new_current_thread()
                        .enable_all()
                        .build()
                        .context("Failed to start async runtime")?;
                    runtime.block_on(interpreter::run_async(process))
                }
            }
            .context("Tick source failed")?;

            info!(ticks = ticks.len(), "tick source finished");
            for tick in ticks {
                println!("tick {tick}");
            }
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn limit<F, O>(process: Process<F, O>, take: Option<usize>) -> Process<F, O>
where
    F: Effect,
    O: 'static,
{
    match take {
        Some(n) => process.pipe(pipe::take(n)),
        None => process,
    }
}

/// Install the global subscriber; `RUST_LOG` wins over the configured level
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level)
            .with_context(|| format!("Invalid log level '{}'", logging.level))?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    if logging.json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()?;
    }
    Ok(())
}
