use std::time::Duration;

use rand::{rngs::StdRng, Rng, SeedableRng};
use ratatui::style::Color;
use tracing::{debug, trace};

use crate::rain::effect::EffectConfig;
use crate::rain::scheduler::{FrameHandle, FrameScheduler};
use crate::rain::surface::{Bounds, Surface};

pub const DEFAULT_GLYPHS: &str =
    "アイウエオカキクケコサシスセソタチツテトナニヌネノ0123456789ABCDEF<>{}[]#$%&";
pub const DEFAULT_RESET_CHANCE: f64 = 0.025;
pub const DEFAULT_FADE_ALPHA: f32 = 0.05;
const MIN_RESET_CHANCE: f64 = 0.001;
const MIN_FADE_ALPHA: f32 = 0.01;

const BACKGROUND: Color = Color::Rgb(0, 0, 0);
const HEAD_COLOR: Color = Color::Rgb(180, 255, 180);
const TRAIL_COLOR: Color = Color::Rgb(0, 255, 70);
const TRAIL_DIM: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped,
}

/// One vertical lane of falling glyphs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnState {
    pub position_y: f32,
    /// Pixels per drawn frame.
    pub fall_speed: f32,
    pub opacity: f32,
}

/// Knobs that shape the look without touching the device profile.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopTuning {
    /// Per-frame chance that a column past the bottom restarts at the top.
    pub reset_chance: f64,
    /// Opacity of the overlay painted before each frame.
    pub fade_alpha: f32,
    pub glyphs: Vec<char>,
    pub seed: Option<u64>,
}

impl Default for LoopTuning {
    fn default() -> Self {
        Self {
            reset_chance: DEFAULT_RESET_CHANCE,
            fade_alpha: DEFAULT_FADE_ALPHA,
            glyphs: DEFAULT_GLYPHS.chars().collect(),
            seed: None,
        }
    }
}

impl LoopTuning {
    /// Pulls every knob back into a range the loop can run with.
    pub fn sanitized(mut self) -> Self {
        self.reset_chance = if self.reset_chance.is_finite() {
            self.reset_chance.clamp(MIN_RESET_CHANCE, 1.0)
        } else {
            DEFAULT_RESET_CHANCE
        };
        self.fade_alpha = if self.fade_alpha.is_finite() {
            self.fade_alpha.clamp(MIN_FADE_ALPHA, 1.0)
        } else {
            DEFAULT_FADE_ALPHA
        };
        if self.glyphs.is_empty() {
            self.glyphs = DEFAULT_GLYPHS.chars().collect();
        }
        self
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, or the handle is not the one this loop is waiting on.
    Ignored,
    /// Arrived before the frame interval elapsed; rescheduled without drawing.
    Skipped,
    Drawn,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub accepted: u64,
    pub skipped: u64,
    pub resets: u64,
}

/// Frame-gated falling-glyph animation.
///
/// Owns the column states exclusively; they only change inside
/// [`RenderLoop::on_frame`].
pub struct RenderLoop {
    state: LoopState,
    config: EffectConfig,
    tuning: LoopTuning,
    interval: Duration,
    bounds: Bounds,
    columns: Vec<ColumnState>,
    last_accepted: Option<Duration>,
    pending: Option<FrameHandle>,
    rng: StdRng,
    stats: FrameStats,
}

impl RenderLoop {
    pub fn new(config: EffectConfig, tuning: LoopTuning, bounds: Bounds, mut rng: StdRng) -> Self {
        let tuning = tuning.sanitized();
        let columns = (0..config.column_count(bounds.width))
            .map(|_| ColumnState {
                position_y: -rng.gen_range(0.0..=bounds.height.max(0.0)),
                fall_speed: config.glyph_size_px * rng.gen_range(0.5..=1.0),
                opacity: rng.gen_range(0.5..=1.0),
            })
            .collect();
        Self {
            state: LoopState::Idle,
            interval: config.frame_interval(),
            config,
            tuning,
            bounds,
            columns,
            last_accepted: None,
            pending: None,
            rng,
            stats: FrameStats::default(),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> LoopState {
        self.state
    }

    #[cfg(test)]
    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    #[cfg(test)]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn columns(&self) -> &[ColumnState] {
        &self.columns
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// `Idle -> Running`. Returns false if the loop was already started.
    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) -> bool {
        if self.state != LoopState::Idle {
            return false;
        }
        self.state = LoopState::Running;
        self.pending = Some(scheduler.request_frame());
        debug!(columns = self.columns.len(), fps = self.config.target_fps, "rain loop started");
        true
    }

    /// Moves to `Stopped` and cancels the pending tick. Safe to call again.
    pub fn stop(&mut self, scheduler: &mut dyn FrameScheduler) -> bool {
        if self.state == LoopState::Stopped {
            return false;
        }
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
        self.state = LoopState::Stopped;
        debug!(stats = ?self.stats, "rain loop stopped");
        true
    }

    /// Re-measures the drawable area. Columns and config are left alone.
    pub fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        now: Duration,
        surface: &mut dyn Surface,
        scheduler: &mut dyn FrameScheduler,
    ) -> TickOutcome {
        if self.state != LoopState::Running || self.pending != Some(handle) {
            return TickOutcome::Ignored;
        }
        self.pending = None;

        if let Some(last) = self.last_accepted {
            if now.saturating_sub(last) < self.interval {
                self.stats.skipped += 1;
                self.pending = Some(scheduler.request_frame());
                return TickOutcome::Skipped;
            }
        }
        self.last_accepted = Some(now);
        self.stats.accepted += 1;

        self.draw(surface);
        self.advance();

        self.pending = Some(scheduler.request_frame());
        TickOutcome::Drawn
    }

    fn draw(&mut self, surface: &mut dyn Surface) {
        surface.fill_rect(self.bounds.full_rect(), BACKGROUND, self.tuning.fade_alpha);
        let glyph_size = self.config.glyph_size_px;
        for (i, column) in self.columns.iter().enumerate() {
            let x = self.config.column_x(i);
            let head = self.tuning.glyphs[self.rng.gen_range(0..self.tuning.glyphs.len())];
            // Trail goes first so the head wins when both land in one cell.
            if self.config.trails_enabled {
                let trail = self.tuning.glyphs[self.rng.gen_range(0..self.tuning.glyphs.len())];
                surface.draw_text(
                    trail,
                    x,
                    column.position_y - glyph_size,
                    TRAIL_COLOR,
                    column.opacity * TRAIL_DIM,
                );
            }
            surface.draw_text(head, x, column.position_y, HEAD_COLOR, column.opacity);
        }
    }

    fn advance(&mut self) {
        for column in &mut self.columns {
            column.position_y += column.fall_speed;
            let past_bottom = column.position_y > self.bounds.height;
            if past_bottom && self.rng.gen_bool(self.tuning.reset_chance) {
                column.position_y = 0.0;
                column.opacity = self.rng.gen_range(0.5..=1.0);
                self.stats.resets += 1;
                trace!(height = self.bounds.height, "column reset");
            }
        }
    }
}
