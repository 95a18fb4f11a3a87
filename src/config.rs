use std::path::PathBuf;

use clap::Parser;

use crate::color::Rgb;

#[derive(Parser, Debug, Clone)]
#[command(name = "skyburst", version, about = "Terminal fireworks show with a countdown opener")]
pub struct Config {
    /// Display refreshes per second; one simulation tick each.
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Seconds to count down before the opening salvo (0 skips the countdown).
    #[arg(long, default_value_t = 5)]
    pub countdown: u32,

    /// Background color as hex (e.g. --bg-color 1a1b26).
    #[arg(long, value_parser = Rgb::parse, default_value = "000000")]
    pub bg_color: Rgb,

    /// Virtual pixels per terminal column.
    #[arg(long, default_value_t = 8.0)]
    pub cell_width: f32,

    /// Virtual pixels per terminal row.
    #[arg(long, default_value_t = 16.0)]
    pub cell_height: f32,

    /// Width the device profile is computed from, instead of the terminal's.
    #[arg(long)]
    pub viewport_width: Option<f32>,

    /// Start the countdown at once instead of waiting for a key press.
    #[arg(long, default_value_t = false)]
    pub autostart: bool,

    /// Seed for a reproducible show.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Ring the terminal bell on bursts and countdown beeps.
    #[arg(long, default_value_t = false)]
    pub bell: bool,

    /// Write logs here; nothing is logged otherwise.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,
}

impl Config {
    /// Width the device profile sees for a terminal `cols` wide.
    pub fn viewport_width(&self, cols: u16) -> f32 {
        self.viewport_width
            .unwrap_or(cols as f32 * self.cell_width)
    }
}
