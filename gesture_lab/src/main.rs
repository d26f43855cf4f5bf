//! gesture_lab — interactive entry point.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use gesture_core::GestureConfig;
use gesture_lab::app::{run, LabConfig};

#[derive(Parser, Debug)]
#[command(name = "gesture_lab", about = "Hand gesture interpreter test bench")]
struct Cli {
    /// TOML file with interpreter thresholds (defaults otherwise)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay a JSON-lines landmark recording instead of the keyboard hand
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Record every processed frame to this JSON-lines file
    #[arg(long)]
    record: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gesture_lab=info,gesture_core=info".into()),
        )
        .init();

    let gestures = match &cli.config {
        Some(path) => GestureConfig::load(path)?,
        None       => GestureConfig::default(),
    };

    if cli.dump_config {
        print!("{}", gestures.to_toml()?);
        return Ok(());
    }

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Gesture Lab — hand gesture interpreter bench        ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    match &cli.replay {
        Some(path) => println!("  Source: replay of {}", path.display()),
        None       => println!("  Source: keyboard hand  (P=pinch  G=grip  H=hide  U=unlock)"),
    }
    println!();

    info!("gesture_lab v{} starting", env!("CARGO_PKG_VERSION"));

    run(LabConfig {
        gestures,
        replay: cli.replay,
        record: cli.record,
    })
}
