//! One-shot read of the ambient device and user signals that decide how rich
//! the rain is allowed to be.

use tracing::debug;

/// At or below this many logical cores a device counts as low-end.
pub const LOW_END_CORE_THRESHOLD: usize = 4;

/// Coarse device class, the terminal's stand-in for a mobile user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Desktop,
    Constrained,
    Unknown,
}

/// Raw signals as read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbientSignals {
    /// `None` when the environment exposes no preference at all.
    pub reduced_motion: Option<bool>,
    pub device_class: DeviceClass,
    pub logical_cores: Option<usize>,
}

impl Default for AmbientSignals {
    fn default() -> Self {
        Self {
            reduced_motion: None,
            device_class: DeviceClass::Unknown,
            logical_cores: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub is_low_end: bool,
    pub reduced_motion: bool,
}

pub trait SignalSource {
    fn read(&self) -> AmbientSignals;
}

pub fn probe(signals: &AmbientSignals) -> Capabilities {
    let low_core = signals
        .logical_cores
        .map_or(false, |cores| cores <= LOW_END_CORE_THRESHOLD);
    let caps = Capabilities {
        is_low_end: signals.device_class == DeviceClass::Constrained || low_core,
        // Unknown preference fails open: motion stays on.
        reduced_motion: signals.reduced_motion.unwrap_or(false),
    };
    debug!(?signals, ?caps, "capability probe");
    caps
}

/// Overrides that win over anything the environment says.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalOverrides {
    pub reduced_motion: Option<bool>,
    pub low_end: Option<bool>,
}

/// Reads signals from process environment variables and the core count.
pub struct EnvSignals<F> {
    lookup: F,
    overrides: SignalOverrides,
    logical_cores: Option<usize>,
}

impl EnvSignals<fn(&str) -> Option<String>> {
    pub fn from_process(overrides: SignalOverrides) -> Self {
        Self {
            lookup: |key| std::env::var(key).ok(),
            overrides,
            logical_cores: std::thread::available_parallelism().ok().map(|n| n.get()),
        }
    }
}

impl<F> EnvSignals<F>
where
    F: Fn(&str) -> Option<String>,
{
    #[cfg(test)]
    pub fn with_lookup(
        lookup: F,
        overrides: SignalOverrides,
        logical_cores: Option<usize>,
    ) -> Self {
        Self {
            lookup,
            overrides,
            logical_cores,
        }
    }

    fn flag(&self, name: &str) -> Option<bool> {
        (self.lookup)(name).map(|v| {
            let v = v.trim().to_ascii_lowercase();
            !(v.is_empty() || v == "0" || v == "false" || v == "no" || v == "off")
        })
    }

    fn device_class(&self) -> DeviceClass {
        if (self.lookup)("SSH_CONNECTION").is_some() || (self.lookup)("SSH_TTY").is_some() {
            return DeviceClass::Constrained;
        }
        match (self.lookup)("TERM").as_deref() {
            None => DeviceClass::Unknown,
            Some("linux" | "vt100" | "vt220" | "dumb") => DeviceClass::Constrained,
            Some(_) => DeviceClass::Desktop,
        }
    }
}

impl<F> SignalSource for EnvSignals<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn read(&self) -> AmbientSignals {
        let reduced_motion = self
            .overrides
            .reduced_motion
            .or_else(|| self.flag("PREFERS_REDUCED_MOTION"))
            .or_else(|| self.flag("REDUCE_MOTION"));
        let (device_class, logical_cores) = match self.overrides.low_end {
            Some(true) => (DeviceClass::Constrained, self.logical_cores),
            // Forced high-end: drop the hints that could still mark it low-end.
            Some(false) => (DeviceClass::Desktop, None),
            None => (self.device_class(), self.logical_cores),
        };
        AmbientSignals {
            reduced_motion,
            device_class,
            logical_cores,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_preference_fails_open() {
        let caps = probe(&AmbientSignals::default());
        assert!(!caps.reduced_motion);
        assert!(!caps.is_low_end);
    }

    #[test]
    fn test_low_core_count_is_low_end() {
        let signals = AmbientSignals {
            device_class: DeviceClass::Desktop,
            logical_cores: Some(4),
            ..Default::default()
        };
        assert!(probe(&signals).is_low_end);
        let signals = AmbientSignals {
            logical_cores: Some(16),
            ..signals
        };
        assert!(!probe(&signals).is_low_end);
    }

    #[test]
    fn test_constrained_class_is_low_end() {
        let signals = AmbientSignals {
            device_class: DeviceClass::Constrained,
            logical_cores: Some(32),
            reduced_motion: Some(true),
        };
        let caps = probe(&signals);
        assert!(caps.is_low_end);
        assert!(caps.reduced_motion);
    }

    #[test]
    fn test_env_flags() {
        let src = EnvSignals::with_lookup(
            env(&[("TERM", "xterm-256color"), ("REDUCE_MOTION", "1")]),
            SignalOverrides::default(),
            Some(8),
        );
        let signals = src.read();
        assert_eq!(signals.reduced_motion, Some(true));
        assert_eq!(signals.device_class, DeviceClass::Desktop);

        let src = EnvSignals::with_lookup(
            env(&[("PREFERS_REDUCED_MOTION", "off"), ("REDUCE_MOTION", "1")]),
            SignalOverrides::default(),
            None,
        );
        assert_eq!(src.read().reduced_motion, Some(false));
        assert_eq!(src.read().device_class, DeviceClass::Unknown);
    }

    #[test]
    fn test_console_and_ssh_are_constrained() {
        for pairs in [
            &[("TERM", "linux")][..],
            &[("TERM", "xterm"), ("SSH_TTY", "/dev/pts/3")][..],
        ] {
            let src = EnvSignals::with_lookup(env(pairs), SignalOverrides::default(), Some(16));
            assert_eq!(src.read().device_class, DeviceClass::Constrained);
        }
    }

    #[test]
    fn test_overrides_win() {
        let overrides = SignalOverrides {
            reduced_motion: Some(false),
            low_end: Some(false),
        };
        let src = EnvSignals::with_lookup(
            env(&[("TERM", "linux"), ("REDUCE_MOTION", "yes")]),
            overrides,
            Some(2),
        );
        let caps = probe(&src.read());
        assert!(!caps.reduced_motion);
        assert!(!caps.is_low_end);
    }
}
