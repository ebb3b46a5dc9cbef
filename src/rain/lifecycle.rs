//! Wires the render loop to its host: surface acquisition, resize and
//! motion-preference listeners, and teardown.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::rain::effect::{select_effect, EffectConfig};
use crate::rain::probe::Capabilities;
use crate::rain::render_loop::{LoopTuning, RenderLoop, TickOutcome};
use crate::rain::scheduler::{FrameHandle, FrameScheduler};
use crate::rain::surface::{Bounds, Surface};
use crate::state::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostSignal {
    Resize,
    MotionPreference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

/// Host-side listener table. The host only dispatches a signal while
/// somebody is subscribed to it.
#[derive(Debug, Default)]
pub struct SignalRegistry {
    next_id: u64,
    active: Vec<(ListenerId, HostSignal)>,
}

impl SignalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, signal: HostSignal) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.active.push((id, signal));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.active.len();
        self.active.retain(|(active, _)| *active != id);
        self.active.len() != before
    }

    pub fn is_subscribed(&self, signal: HostSignal) -> bool {
        self.active.iter().any(|(_, s)| *s == signal)
    }

    #[cfg(test)]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountPhase {
    /// Render loop running on the surface.
    Animated,
    /// Static substitute: reduced motion, or no surface to draw on.
    Still,
    Unmounted,
}

/// One mounted rain background.
pub struct RainMount<S, D> {
    scheduler: S,
    surface: Option<D>,
    caps: Capabilities,
    config: EffectConfig,
    tuning: LoopTuning,
    bounds: Bounds,
    render_loop: Option<RenderLoop>,
    listeners: Vec<ListenerId>,
    phase: MountPhase,
}

impl<S, D> RainMount<S, D>
where
    S: FrameScheduler,
    D: Surface,
{
    /// Derives the effect profile, acquires the surface, subscribes to host
    /// signals and starts the loop unless motion is unwanted.
    pub fn mount<F>(
        caps: Capabilities,
        tuning: LoopTuning,
        bounds: Bounds,
        scheduler: S,
        registry: &mut SignalRegistry,
        acquire: F,
    ) -> Self
    where
        F: FnOnce(Bounds) -> AppResult<D>,
    {
        let config = select_effect(caps.is_low_end);
        let surface = match acquire(bounds) {
            Ok(surface) => Some(surface),
            Err(e) => {
                warn!(error = %e, "rain surface unavailable, falling back to static background");
                None
            }
        };
        let listeners = vec![
            registry.subscribe(HostSignal::Resize),
            registry.subscribe(HostSignal::MotionPreference),
        ];
        let mut mount = Self {
            scheduler,
            surface,
            caps,
            config,
            tuning: tuning.sanitized(),
            bounds,
            render_loop: None,
            listeners,
            phase: MountPhase::Still,
        };
        if !caps.reduced_motion {
            mount.animate();
        }
        info!(
            phase = ?mount.phase,
            low_end = caps.is_low_end,
            fps = config.target_fps,
            "rain mounted"
        );
        mount
    }

    fn animate(&mut self) -> bool {
        if self.surface.is_none() {
            return false;
        }
        let rng = self.tuning.rng();
        let mut render_loop = RenderLoop::new(self.config, self.tuning.clone(), self.bounds, rng);
        render_loop.start(&mut self.scheduler);
        self.render_loop = Some(render_loop);
        self.phase = MountPhase::Animated;
        true
    }

    /// Delivers one host frame callback.
    pub fn on_frame(&mut self, handle: FrameHandle, now: Duration) -> TickOutcome {
        match (self.render_loop.as_mut(), self.surface.as_mut()) {
            (Some(render_loop), Some(surface)) => {
                render_loop.on_frame(handle, now, surface, &mut self.scheduler)
            }
            _ => TickOutcome::Ignored,
        }
    }

    /// Stops the loop and cancels its pending tick. Idempotent.
    pub fn stop(&mut self) {
        if let Some(render_loop) = self.render_loop.as_mut() {
            render_loop.stop(&mut self.scheduler);
        }
        if self.phase == MountPhase::Animated {
            self.phase = MountPhase::Still;
        }
    }

    /// Re-measures the drawable area; the effect profile stays as mounted.
    pub fn on_resize(&mut self, width: f32, height: f32) {
        if self.phase == MountPhase::Unmounted {
            return;
        }
        self.bounds = Bounds::new(width, height);
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(width, height);
        }
        if let Some(render_loop) = self.render_loop.as_mut() {
            render_loop.resize(self.bounds);
        }
        debug!(width, height, "rain resized");
    }

    /// Swaps between the animation and the static substitute.
    pub fn on_motion_preference(&mut self, reduced_motion: bool) {
        if self.phase == MountPhase::Unmounted {
            return;
        }
        self.caps.reduced_motion = reduced_motion;
        match (reduced_motion, self.phase) {
            (true, MountPhase::Animated) => {
                self.stop();
                info!("reduced motion requested, rain stopped");
            }
            (false, MountPhase::Still) => {
                if self.animate() {
                    info!("motion allowed again, rain restarted");
                }
            }
            _ => {}
        }
    }

    /// Stops the loop and releases every listener. Returns false if already
    /// unmounted.
    pub fn unmount(&mut self, registry: &mut SignalRegistry) -> bool {
        if self.phase == MountPhase::Unmounted {
            return false;
        }
        self.stop();
        for id in self.listeners.drain(..) {
            registry.unsubscribe(id);
        }
        self.phase = MountPhase::Unmounted;
        info!("rain unmounted");
        true
    }

    pub fn phase(&self) -> MountPhase {
        self.phase
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    #[cfg(test)]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn surface(&self) -> Option<&D> {
        self.surface.as_ref()
    }

    pub fn render_loop(&self) -> Option<&RenderLoop> {
        self.render_loop.as_ref()
    }

    #[cfg(test)]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}
