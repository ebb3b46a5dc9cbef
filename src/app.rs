// src/app.rs

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::global_prefs::{global_prefs_mut, save_global_prefs};
use crate::rain::{
    Bounds, Capabilities, CellSurface, FrameQueue, HostSignal, LoopTuning, MountPhase, RainMount,
    SignalRegistry,
};
use crate::state::{AppConfig, UiState};
use crate::ui::backgrounds::BackgroundManager;

pub struct App {
    pub ui: UiState,
    pub config: AppConfig,
    pub rain: RainMount<FrameQueue, CellSurface>,
    pub signals: SignalRegistry,
    pub backgrounds: BackgroundManager,
    font_size: (u16, u16),
    started: Instant,
}

impl App {
    /// Mounts the rain on a viewport of `viewport` cells.
    pub fn new(
        caps: Capabilities,
        tuning: LoopTuning,
        viewport: (u16, u16),
        font_size: (u16, u16),
    ) -> App {
        let mut signals = SignalRegistry::new();
        let bounds = pixels(viewport, font_size);
        let rain = RainMount::mount(caps, tuning, bounds, FrameQueue::new(), &mut signals, |b| {
            CellSurface::acquire(b, font_size)
        });
        let mut app = App {
            ui: UiState::default(),
            config: AppConfig::default(),
            rain,
            signals,
            backgrounds: BackgroundManager::new(),
            font_size,
            started: Instant::now(),
        };
        app.sync_background();
        app
    }

    pub fn on_tick(&mut self) {
        let now = self.started.elapsed();
        self.on_tick_at(now);
    }

    /// Delivers every frame callback due on this refresh.
    pub fn on_tick_at(&mut self, now: Duration) {
        for handle in self.rain.scheduler_mut().take_due() {
            self.rain.on_frame(handle, now);
        }
    }

    pub fn on_resize(&mut self, cols: u16, rows: u16) {
        if !self.signals.is_subscribed(HostSignal::Resize) {
            return;
        }
        let bounds = pixels((cols, rows), self.font_size);
        self.rain.on_resize(bounds.width, bounds.height);
    }

    /// Applies a motion preference change without persisting it.
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        if !self.signals.is_subscribed(HostSignal::MotionPreference) {
            return;
        }
        self.rain.on_motion_preference(reduced);
        self.sync_background();
    }

    /// Flips the motion preference and remembers it for the next run.
    pub fn toggle_reduced_motion(&mut self) {
        let reduced = !self.rain.capabilities().reduced_motion;
        global_prefs_mut().reduced_motion = Some(reduced);
        if let Err(e) = save_global_prefs() {
            warn!(error = %e, "could not save preferences");
        }
        info!(reduced, "motion preference changed");
        self.set_reduced_motion(reduced);
    }

    pub fn quit(&mut self) {
        self.rain.unmount(&mut self.signals);
        self.sync_background();
        self.ui.quit();
    }

    fn sync_background(&mut self) {
        let name = match self.rain.phase() {
            MountPhase::Animated => "MatrixRain",
            MountPhase::Still | MountPhase::Unmounted => "Still",
        };
        self.backgrounds.set_background_by_name(name);
    }
}

fn pixels(cells: (u16, u16), font_size: (u16, u16)) -> Bounds {
    Bounds::new(
        cells.0 as f32 * font_size.0 as f32,
        cells.1 as f32 * font_size.1 as f32,
    )
}
