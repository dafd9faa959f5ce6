//! # Tileplan Command Line Entry Point
//!
//! Plans one level with a chosen planner type and prints it as ASCII.

use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tileplan::{plan, AsciiDisplay, GenerationConfig, PlanResult, PlannerType, StaticCatalog};

/// Command line arguments for the level planner.
#[derive(Parser, Debug)]
#[command(name = "tileplan")]
#[command(about = "Plans procedural tile levels and prints them as ASCII")]
#[command(version)]
struct Args {
    /// Planner type to run
    #[arg(short, long, default_value = "small_rooms")]
    planner: String,

    /// Base random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Map width in tiles
    #[arg(long)]
    width: Option<i32>,

    /// Map height in tiles
    #[arg(long)]
    height: Option<i32>,

    /// Dungeon depth
    #[arg(short, long)]
    depth: Option<u32>,

    /// JSON configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// List planner types and exit
    #[arg(long)]
    list: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initializes `env_logger`; `RUST_LOG` takes precedence over the flag.
fn initialize_logging(log_level: &str) {
    let level = match log_level.to_lowercase().as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Warn,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_target(false)
        .init();
}

fn build_config(args: &Args) -> PlanResult<GenerationConfig> {
    let mut config = match &args.config {
        Some(path) => GenerationConfig::from_json_file(path)?,
        None => GenerationConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(depth) = args.depth {
        config.depth = depth;
    }
    Ok(config)
}

fn run(args: &Args) -> PlanResult<()> {
    if args.list {
        for planner in PlannerType::all() {
            println!("{}", planner.name);
        }
        return Ok(());
    }

    let planner = PlannerType::from_name(&args.planner)?;
    let config = build_config(args)?;
    info!("tileplan v{} running '{}'", tileplan::VERSION, planner.name);

    let outcome = plan(&planner, &config, Arc::new(StaticCatalog::builtin()))?;

    let display = AsciiDisplay::default();
    print!("{}", display.render_entity_plan(&outcome.entity_plan));
    println!(
        "{} seed={} attempts={}",
        AsciiDisplay::summary(&outcome.entity_plan),
        outcome.seed,
        outcome.attempts
    );
    Ok(())
}
