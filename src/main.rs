//! clayterm - render a layout engine's commands in the terminal
//!
//! Runs the built-in demo layout through the full decode, draw and flush
//! pipeline at a fixed frame rate.
//!
//! # Quick Start
//!
//! ```text
//! clayterm                     # Run until interrupted (Ctrl+C)
//! clayterm --fps 5             # Slower frame rate
//! clayterm --once              # Print a single frame and exit
//! clayterm --frames 100        # Stop after 100 frames
//! ```

use std::env;
use std::io;
use std::sync::Mutex;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use clayterm::config::Config;
use clayterm::demo::DemoEngine;
use clayterm::scheduler::{FrameScheduler, TerminalSize};
use clayterm::ui::TerminalGuard;

/// Command line overrides
#[derive(Debug, Default)]
struct Args {
    fps: Option<u32>,
    frames: Option<u64>,
    once: bool,
    per_side_borders: bool,
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    eprintln!("clayterm {}", VERSION);
}

fn print_help() {
    eprintln!("clayterm {} - terminal compositor for layout engine render commands", VERSION);
    eprintln!();
    eprintln!("Usage: clayterm [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --fps <N>             Frames per second (default: from config, 30)");
    eprintln!("  --frames <N>          Stop after N frames");
    eprintln!("  --once                Render a single frame and exit");
    eprintln!("  --per-side-borders    Honor per-side border widths");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Configuration: ~/.clayterm/config.toml");
    eprintln!("Log file:      ~/.clayterm/clayterm.log (filter with CLAYTERM_LOG)");
    eprintln!();
    eprintln!("Exit: Ctrl+C");
}

fn parse_number<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> Result<T, String> {
    let value = args
        .get(i)
        .ok_or_else(|| format!("Missing value for {}", flag))?;
    value
        .parse()
        .map_err(|_| format!("Invalid value for {}: {}", flag, value))
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "--fps" => {
                i += 1;
                let fps: u32 = parse_number(&args, i, "--fps")?;
                if fps == 0 {
                    return Err("--fps must be at least 1".to_string());
                }
                parsed.fps = Some(fps);
            }
            "--frames" => {
                i += 1;
                parsed.frames = Some(parse_number(&args, i, "--frames")?);
            }
            "--once" => {
                parsed.once = true;
            }
            "--per-side-borders" => {
                parsed.per_side_borders = true;
            }
            arg => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
        }
        i += 1;
    }

    Ok(parsed)
}

/// Log to `~/.clayterm/clayterm.log`. Stdout carries the frames, so
/// nothing is logged there.
fn init_logging(config: &Config) {
    let log_path = Config::config_dir()
        .map(|dir| dir.join("clayterm.log"))
        .unwrap_or_else(|| std::path::PathBuf::from("clayterm.log"));

    // Open log file (append mode)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_env("CLAYTERM_LOG")
            .or_else(|_| EnvFilter::try_new(&config.log_level))
            .unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() -> anyhow::Result<()> {
    let args = match parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    let mut config = Config::load();
    if let Some(fps) = args.fps {
        config.target_fps = fps;
    }
    if args.per_side_borders {
        config.border_sides = true;
    }

    init_logging(&config);
    info!("clayterm {} starting...", VERSION);

    let mut options = config.scheduler_options();
    options.frame_limit = if args.once { Some(1) } else { args.frames };

    // Only a long-running session takes over the screen
    let _guard = if config.alternate_screen && !args.once {
        Some(TerminalGuard::enter(true).context("Failed to prepare terminal")?)
    } else {
        None
    };

    let stdout = io::stdout();
    let mut scheduler =
        FrameScheduler::new(DemoEngine::new(), TerminalSize, stdout.lock(), options);
    scheduler.run();

    info!("clayterm exiting after {} frames", scheduler.frames());
    Ok(())
}
