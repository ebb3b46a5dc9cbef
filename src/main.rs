mod app;
mod global_prefs;
mod handlers;
mod rain;
mod state;
mod ui;

use app::App;
use clap::Parser;
use crossterm::{
    event::{self, Event as CEvent},
    execute,
    terminal::{
        self as cterm, disable_raw_mode, enable_raw_mode, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use global_prefs::{global_prefs, init_global_prefs};
use rain::{probe, EnvSignals, SignalOverrides, SignalSource};
use ratatui::{backend::CrosstermBackend, Terminal};
use ratatui_image::picker::Picker;
use state::AppConfig;
use std::{error::Error, fs::File, io, path::PathBuf, sync::Mutex, time::Duration};
use tokio::sync::mpsc;
use tracing::{info, warn, Level};

/// Decorative matrix rain for the hackathon site, in your terminal.
#[derive(Parser, Debug)]
#[command(name = "hackrain", version, about)]
struct Args {
    /// Show the static background instead of the animation
    #[arg(long, conflicts_with = "motion")]
    reduced_motion: bool,
    /// Animate even if the environment asks for reduced motion
    #[arg(long)]
    motion: bool,
    /// Use the low-end profile regardless of the device probe
    #[arg(long, conflicts_with = "high_end")]
    low_end: bool,
    /// Use the high-end profile regardless of the device probe
    #[arg(long)]
    high_end: bool,
    /// Seed for the glyph and column randomness
    #[arg(long)]
    seed: Option<u64>,
    /// Preferences file (defaults to ~/.hackrain_prefs.json)
    #[arg(long)]
    prefs: Option<PathBuf>,
    /// Write logs here; nothing is logged to the screen
    #[arg(long)]
    log_file: Option<PathBuf>,
    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,
}

/// Application events
enum AppEvent {
    Terminal(CEvent),
    Tick,
}

fn flag(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

fn init_logging(args: &Args) -> io::Result<()> {
    if let Some(path) = &args.log_file {
        let file = File::create(path)?;
        tracing_subscriber::fmt()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_max_level(args.log_level)
            .init();
    }
    Ok(())
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
}

/// Runs its closure when dropped, so every exit path out of raw mode,
/// `?` included, puts the terminal back.
struct RestoreOnDrop<F: FnMut()>(F);

impl<F: FnMut()> Drop for RestoreOnDrop<F> {
    fn drop(&mut self) {
        (self.0)();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(&args)?;

    // Initialize global preferences
    init_global_prefs(args.prefs.clone());
    let (overrides, mut tuning) = {
        let prefs = global_prefs();
        let overrides = SignalOverrides {
            reduced_motion: flag(args.reduced_motion, args.motion).or(prefs.reduced_motion),
            low_end: flag(args.low_end, args.high_end).or(prefs.low_end),
        };
        (overrides, prefs.tuning())
    };
    if args.seed.is_some() {
        tuning.seed = args.seed;
    }
    let caps = probe(&EnvSignals::from_process(overrides).read());

    let config = AppConfig::default();

    // Enable terminal raw mode
    enable_raw_mode()?;
    let restore = RestoreOnDrop(restore_terminal);
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        default_hook(info);
    }));
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, crossterm::cursor::Hide)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let font_size = match Picker::from_query_stdio() {
        Ok(picker) => picker.font_size(),
        Err(e) => {
            warn!(error = ?e, "terminal font size query failed, using default cell size");
            config.default_font_size
        }
    };
    let viewport = cterm::size()?;
    info!(?caps, ?font_size, ?viewport, "starting");

    let mut app = App::new(caps, tuning, viewport, font_size);
    let refresh = Duration::from_millis(app.config.refresh_interval_ms);

    // Create event loop channels
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<AppEvent>();

    // Terminal input plus one tick per native refresh
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(refresh);
        loop {
            interval.tick().await;

            // Drain terminal events (non-blocking)
            while event::poll(Duration::from_millis(0)).unwrap_or(false) {
                match event::read() {
                    Ok(event) => {
                        if event_tx.send(AppEvent::Terminal(event)).is_err() {
                            return;
                        }
                    }
                    Err(_) => break,
                }
            }

            if event_tx.send(AppEvent::Tick).is_err() {
                return;
            }
        }
    });

    // Main application loop
    while !app.ui.should_quit {
        terminal.draw(|f| ui::ui(f, &app))?;

        match event_rx.recv().await {
            Some(AppEvent::Terminal(CEvent::Key(key))) => handlers::handle_key_event(key, &mut app),
            Some(AppEvent::Terminal(CEvent::Resize(cols, rows))) => app.on_resize(cols, rows),
            Some(AppEvent::Terminal(_)) => {}
            Some(AppEvent::Tick) => app.on_tick(),
            None => break,
        }
    }

    // Cleanup
    app.quit();
    drop(restore);
    info!("bye");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn size_query() -> io::Result<(u16, u16)> {
        Err(io::Error::other("not a tty"))
    }

    fn setup(restored: &Cell<u32>) -> io::Result<(u16, u16)> {
        let _restore = RestoreOnDrop(|| restored.set(restored.get() + 1));
        let viewport = size_query()?;
        Ok(viewport)
    }

    #[test]
    fn test_early_error_still_restores() {
        let restored = Cell::new(0);
        assert!(setup(&restored).is_err());
        assert_eq!(restored.get(), 1);
    }

    #[test]
    fn test_restore_runs_once_on_explicit_drop() {
        let restored = Cell::new(0);
        let restore = RestoreOnDrop(|| restored.set(restored.get() + 1));
        drop(restore);
        assert_eq!(restored.get(), 1);
    }

    #[test]
    fn test_motion_flags() {
        assert_eq!(flag(true, false), Some(true));
        assert_eq!(flag(false, true), Some(false));
        assert_eq!(flag(false, false), None);
    }
}
