use std::io::{BufWriter, Stdout, Write, stdout};
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::{
    ExecutableCommand,
    cursor::{Hide, Show},
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers, MouseEventKind},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::audio::{Bell, Silent, SoundSink};
use crate::canvas::Canvas;
use crate::config::Config;
use crate::device::DeviceProfile;
use crate::sim::Simulation;

const START_PROMPT: &str = "press any key to start";

/// Restores the terminal however the show ends.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> anyhow::Result<Self> {
        terminal::enable_raw_mode().context("enable raw mode")?;
        let guard = Self;
        let mut out = stdout();
        out.execute(EnterAlternateScreen).context("enter alternate screen")?;
        out.execute(Clear(ClearType::All)).context("clear screen")?;
        out.execute(Hide).context("hide cursor")?;
        out.execute(EnableMouseCapture).context("enable mouse capture")?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = stdout();
        let _ = out.write_all(b"\x1b[0m");
        let _ = out.execute(DisableMouseCapture);
        let _ = out.execute(Show);
        let _ = out.execute(LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

pub fn run(cfg: Config) -> anyhow::Result<()> {
    let sound: Box<dyn SoundSink> = if cfg.bell { Box::new(Bell::new()) } else { Box::new(Silent) };
    let rng = match cfg.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };

    let _term = TerminalGuard::new()?;
    let mut out = BufWriter::with_capacity(1024 * 64, stdout());

    let (cols, rows) = terminal::size().context("get terminal size")?;
    let mut canvas = Canvas::new(cols, rows, cfg.cell_width, cfg.cell_height, cfg.bg_color);
    let profile = DeviceProfile::from_width(cfg.viewport_width(cols));
    tracing::info!(cols, rows, tier = ?profile.tier(), scale = profile.scale_factor(), "show starting");

    let mut sim = Simulation::new(
        cols as f32 * cfg.cell_width,
        rows as f32 * cfg.cell_height,
        profile,
        rng,
        sound,
    );
    if cfg.autostart {
        sim.arm_countdown(cfg.countdown);
    }

    show_loop(&cfg, &mut sim, &mut canvas, &mut out)?;
    tracing::info!(live = sim.particles().len(), "show stopped");
    Ok(())
}

fn show_loop<S: SoundSink>(
    cfg: &Config,
    sim: &mut Simulation<S>,
    canvas: &mut Canvas,
    out: &mut BufWriter<Stdout>,
) -> anyhow::Result<()> {
    let fixed_dt = Duration::from_secs_f32(1.0 / cfg.fps.max(1) as f32);
    let start = Instant::now();
    let mut last_frame = start;
    let mut accumulator = Duration::ZERO;

    loop {
        if event::poll(Duration::from_millis(1)).context("poll terminal events")? {
            match event::read().context("read terminal event")? {
                Event::Key(key) => {
                    let ctrl_c = key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
                    if key.code == KeyCode::Char('q') || key.code == KeyCode::Esc || ctrl_c {
                        break;
                    }
                    if !sim.armed() {
                        sim.arm_countdown(cfg.countdown);
                    } else if key.code == KeyCode::Char(' ') {
                        sim.launch_anywhere();
                    }
                }
                Event::Mouse(mouse) => {
                    if let MouseEventKind::Down(_) = mouse.kind {
                        if !sim.armed() {
                            sim.arm_countdown(cfg.countdown);
                        } else {
                            let x = (mouse.column as f32 + 0.5) * cfg.cell_width;
                            let y = (mouse.row as f32 + 0.5) * cfg.cell_height;
                            sim.launch_at(x, y);
                        }
                    }
                }
                Event::Resize(cols, rows) => {
                    *canvas = Canvas::new(cols, rows, cfg.cell_width, cfg.cell_height, cfg.bg_color);
                    let profile = DeviceProfile::from_width(cfg.viewport_width(cols));
                    sim.resize(cols as f32 * cfg.cell_width, rows as f32 * cfg.cell_height, profile);
                    out.execute(Clear(ClearType::All)).context("clear screen")?;
                }
                _ => {}
            }
        }

        let now = Instant::now();
        accumulator += now.duration_since(last_frame);
        last_frame = now;
        if accumulator > fixed_dt * 3 {
            accumulator = fixed_dt * 3;
        }

        while accumulator >= fixed_dt {
            sim.advance_to(now.duration_since(start));
            sim.frame(canvas);
            accumulator -= fixed_dt;
        }

        canvas.present(out, sim.countdown()).context("present frame")?;
        if !sim.armed() {
            let (cols, rows) = canvas.cell_size();
            let col = cols.saturating_sub(START_PROMPT.len()) / 2 + 1;
            write!(out, "\x1b[{};{}H\x1b[0m{START_PROMPT}", rows / 2 + 1, col).context("draw start prompt")?;
            out.flush().context("flush start prompt")?;
        }
    }

    Ok(())
}
