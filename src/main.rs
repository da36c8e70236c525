//! Celestial Hands viewer
//!
//! Renders the particle sculpture in a window, with the mouse and keyboard
//! standing in for the hand detector.
//!
//! # Usage
//!
//! ```bash
//! # Default texts, bold sans-serif system face
//! celestial-hands
//!
//! # Replace the first two texts (persisted for next time)
//! celestial-hands --text "STARS" --text "ORBIT"
//!
//! # Outline font for CJK text
//! celestial-hands --font /usr/share/fonts/noto/NotoSansCJK-Regular.ttc
//!
//! # Write the sampling raster for the first text and exit
//! celestial-hands --dump-raster raster.png
//! ```
//!
//! Move the cursor to steer (open hand repels), hold the left button to make
//! a fist (attracts), press `1`-`3` to pick a text and `Esc` to quit.

mod window;

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use winit::event_loop::{ControlFlow, EventLoop};

use celestial_hands::font::load_rasterizer;
use celestial_hands::greeting::{resolve_greeting, GreetingSource, NoGreetingService, StaticGreeting};
use celestial_hands::{
    FontSource, GlyphFieldSampler, Sculpture, SculptureConfig, TextStore, Viewport, TEXT_SLOTS,
};

#[derive(Parser, Debug)]
#[command(name = "celestial-hands")]
#[command(version, about = "Particle text sculpture steered by hand gestures", long_about = None)]
struct Cli {
    /// JSON config file (created with defaults if missing)
    #[arg(short, long, default_value = "celestial-hands.json")]
    config: PathBuf,

    /// File the three texts are persisted in
    #[arg(long, default_value = "celestial-hands-texts.json")]
    texts: PathBuf,

    /// Replace texts in order, up to three times
    #[arg(short, long = "text")]
    text: Vec<String>,

    /// Override the particle count
    #[arg(short = 'n', long)]
    particles: Option<usize>,

    /// TrueType/OpenType font file instead of the system face
    #[arg(short, long)]
    font: Option<PathBuf>,

    /// Fixed greeting line instead of the greeting service
    #[arg(long)]
    greeting: Option<String>,

    /// Write the raster sampled for the first text to this PNG and exit
    #[arg(long)]
    dump_raster: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Celestial Hands v{}", env!("CARGO_PKG_VERSION"));

    let mut config = if cli.config.exists() {
        SculptureConfig::load_or_default(&cli.config)
    } else {
        let config = SculptureConfig::default();
        if let Err(e) = config.save(&cli.config) {
            warn!(path = %cli.config.display(), error = %e, "could not write default config");
        }
        config
    };
    if let Some(count) = cli.particles {
        config.particle_count = count;
    }
    if let Some(path) = cli.font {
        config.font = FontSource::File { path };
    }

    let store = TextStore::new(&cli.texts);
    if store.path().exists() {
        config.texts = store.load();
    }

    if let Some(path) = &cli.dump_raster {
        let sampler = GlyphFieldSampler::new(load_rasterizer(&config.font), config.sampler);
        let viewport = Viewport::default();
        sampler.write_raster(&config.texts[0], viewport.aspect_ratio(), viewport.is_compact(), path)?;
        info!(path = %path.display(), text = %config.texts[0], "raster written");
        return Ok(());
    }

    let mut sculpture = Sculpture::new(config, Viewport::default());
    if !cli.text.is_empty() {
        for (slot, text) in cli.text.iter().take(TEXT_SLOTS).enumerate() {
            sculpture.set_text(slot, text);
        }
        if let Err(e) = store.save(sculpture.texts()) {
            warn!(path = %store.path().display(), error = %e, "could not persist texts");
        }
    }

    let (greeting_tx, greeting_rx) = mpsc::channel();
    let fixed_greeting = cli.greeting;
    thread::Builder::new()
        .name("greeting".into())
        .spawn(move || {
            let source: Box<dyn GreetingSource> = match fixed_greeting {
                Some(line) => Box::new(StaticGreeting(line)),
                None => Box::new(NoGreetingService),
            };
            let _ = greeting_tx.send(resolve_greeting(source.as_ref()));
        })?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = window::App::new(sculpture, greeting_rx);
    event_loop.run_app(&mut app)?;

    if let Some(e) = app.take_error() {
        return Err(e.into());
    }
    Ok(())
}
