// main.rs - Conway's Game of Life in an egui window
//
// Usage: conway_ui [CONFIG]      (defaults to ./conway.toml)
// Logging follows RUST_LOG, e.g. RUST_LOG=conway=debug

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use eframe::egui;
use egui::Color32;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use conway::{Config, Session};

mod ui;

const DEFAULT_CONFIG: &str = "conway.toml";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("conway=info,conway_ui=info")),
        )
        .init();

    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let session = Session::from_config(&config).context("starting session")?;

    let app = GameOfLife::new(session, &config);
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size(app.window_size()),
        ..Default::default()
    };

    eframe::run_native(
        "Conway's Game of Life",
        options,
        Box::new(move |_cc| Box::new(app)),
    )
    .map_err(|err| anyhow::anyhow!("window closed with an error: {err}"))
}

/// Window state wrapped around one [`Session`].
pub struct GameOfLife {
    session: Session,
    pattern_file: PathBuf,
    cell_size: f32,
    selected_pattern: String,

    pub last_update: Instant,
    pub update_interval: Duration,
    pub live_color: Color32,
    pub dead_color: Color32,
    pub background: Color32,
}

impl GameOfLife {
    pub fn new(session: Session, config: &Config) -> Self {
        Self {
            session,
            pattern_file: config.patterns.file.clone(),
            cell_size: config.grid.cell_size,
            selected_pattern: config.patterns.default.clone(),
            last_update: Instant::now(),
            update_interval: config.tick_interval(),
            live_color: Color32::BLACK,
            dead_color: Color32::from_gray(200),
            background: Color32::WHITE,
        }
    }

    /// Room for the grid plus the control rows above and below it.
    fn window_size(&self) -> [f32; 2] {
        let grid = self.session.grid();
        let width = grid.width() as f32 * self.cell_size + 32.0;
        let height = grid.height() as f32 * self.cell_size + 170.0;
        [width.max(720.0), height]
    }
}
