use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use memscape::{
    background::{BackgroundSetter, CommandBackgroundSetter},
    collector::LinuxProcessCollector,
    config::Config,
    notifier,
    pipeline::{Pipeline, RunOutcome},
    render::renderer_for,
};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "memscape", version, about = "Per-process memory wallpaper")]
struct Cli {
    #[arg(short, long, env = "MEMSCAPE_CONFIG")]
    config: Option<PathBuf>,
    /// Render the image but leave the desktop background alone.
    #[arg(long, action = ArgAction::SetTrue)]
    no_apply: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sample, render and apply once.
    Run,
    /// Repeat `run` every interval until interrupted.
    Watch {
        #[arg(long, default_value_t = 60)]
        interval_secs: u64,
    },
    /// Print the default configuration as TOML.
    DefaultConfig,
}

fn load_config(cli_path: Option<&PathBuf>) -> Result<Config> {
    match cli_path {
        Some(path) => Config::load(path),
        None => {
            let path = Config::config_path();
            if path.exists() {
                Config::load(&path).or_else(|e| {
                    warn!("Failed to load config: {:#}, using defaults", e);
                    Ok(Config::default())
                })
            } else {
                info!("No config file found, using defaults");
                Ok(Config::default())
            }
        }
    }
}

fn run_once(config: &Config, collector: &LinuxProcessCollector, apply: bool) -> Result<()> {
    let renderer = renderer_for(&config.paths.output_image);
    let setter = CommandBackgroundSetter::new(&config.background);
    let background: Option<&dyn BackgroundSetter> =
        if apply && config.background.enabled { Some(&setter) } else { None };

    let pipeline = Pipeline {
        config,
        collector,
        renderer: renderer.as_ref(),
        background,
    };
    match pipeline.run(rand::thread_rng())? {
        RunOutcome::Skipped => {}
        RunOutcome::Rendered { entries, .. } => {
            if config.alerts.enabled {
                notifier::check_high_memory(&entries, &config.alerts);
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    if let Some(Commands::DefaultConfig) = cli.command {
        let text = toml::to_string_pretty(&Config::default()).context("serializing default config")?;
        print!("{}", text);
        return Ok(());
    }

    let config = load_config(cli.config.as_ref())?;
    let collector = LinuxProcessCollector::new(Duration::from_millis(config.sampling.cpu_window_ms));
    let apply = !cli.no_apply;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Watch { interval_secs } => {
            info!("Refreshing every {}s", interval_secs);
            loop {
                if let Err(e) = run_once(&config, &collector, apply) {
                    error!("Run failed: {:#}", e);
                }
                thread::sleep(Duration::from_secs(interval_secs));
            }
        }
        _ => run_once(&config, &collector, apply),
    }
}
