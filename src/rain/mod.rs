//! Adaptive falling-glyph background: probe the device, pick an effect
//! profile, run a frame-gated loop and tear it down cleanly.

pub mod effect;
pub mod lifecycle;
pub mod probe;
pub mod render_loop;
pub mod scheduler;
pub mod surface;

pub use lifecycle::{HostSignal, MountPhase, RainMount, SignalRegistry};
pub use probe::{probe, Capabilities, EnvSignals, SignalOverrides, SignalSource};
pub use render_loop::LoopTuning;
pub use scheduler::FrameQueue;
pub use surface::{Bounds, CellSurface};
