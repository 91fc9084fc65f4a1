use std::path::PathBuf;

use clap::Parser;
use log::info;
use winit::event_loop::{ControlFlow, EventLoop};

use neuroslide::{App, AppError, DeckConfig};

/// Full-screen slide presentation with animated neural-network and digital-rain backdrops
#[derive(Parser, Debug)]
#[command(name = "neuroslide", version, long_about = None)]
struct Args {
    /// Deck file to present; the built-in deck is used when omitted
    deck: Option<PathBuf>,

    /// Seed for the backdrop animations
    #[arg(long)]
    seed: Option<u64>,

    /// Slide to open on (zero-based)
    #[arg(long)]
    start: Option<usize>,

    /// Write the built-in deck as TOML to this path and exit
    #[arg(long, value_name = "PATH")]
    write_default: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    if let Some(path) = &args.write_default {
        DeckConfig::default().save_toml(path)?;
        info!("Wrote built-in deck to {}", path.display());
        return Ok(());
    }

    let mut config = match &args.deck {
        Some(path) => {
            info!("Loading deck from {}", path.display());
            DeckConfig::from_toml_file(path)?
        }
        None => DeckConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.effects.seed = Some(seed);
    }
    if let Some(start) = args.start {
        config.start_slide = start;
        config.validate()?;
    }
    info!("{} slides", config.slides.len());

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    match app.take_error() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
