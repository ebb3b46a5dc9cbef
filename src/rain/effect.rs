use std::time::Duration;

/// Effect parameters derived once from the capability probe.
///
/// Immutable for the lifetime of a mount: resizes and preference toggles
/// never re-derive it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectConfig {
    pub glyph_size_px: f32,
    pub target_fps: u32,
    /// Fraction of glyph-wide slots that carry a column, in `(0, 1]`.
    pub column_density: f32,
    pub trails_enabled: bool,
}

pub const HIGH_END: EffectConfig = EffectConfig {
    glyph_size_px: 14.0,
    target_fps: 30,
    column_density: 1.0,
    trails_enabled: true,
};

pub const LOW_END: EffectConfig = EffectConfig {
    glyph_size_px: 20.0,
    target_fps: 15,
    column_density: 0.5,
    trails_enabled: false,
};

/// Picks the effect profile for a device class. No randomness.
pub fn select_effect(is_low_end: bool) -> EffectConfig {
    if is_low_end {
        LOW_END
    } else {
        HIGH_END
    }
}

impl EffectConfig {
    /// Minimum time between two drawn frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps.max(1) as f64)
    }

    /// Glyph-wide slots across `width`, whole slots only.
    pub fn slot_count(&self, width: f32) -> usize {
        if self.glyph_size_px <= 0.0 || width <= 0.0 {
            return 0;
        }
        (width / self.glyph_size_px).floor() as usize
    }

    /// Active columns for a surface `width` px wide.
    ///
    /// Rounds down: 5 slots at density 0.5 give 2 columns, not 3.
    pub fn column_count(&self, width: f32) -> usize {
        let density = self.column_density.clamp(0.0, 1.0);
        (self.slot_count(width) as f32 * density).floor() as usize
    }

    /// Left edge of column `index`. Sparse profiles skip slots so the
    /// columns still spread across the whole width.
    pub fn column_x(&self, index: usize) -> f32 {
        let density = self.column_density.clamp(f32::EPSILON, 1.0);
        let slot = (index as f32 / density).floor();
        slot * self.glyph_size_px
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_is_pure() {
        for low_end in [true, false] {
            let a = select_effect(low_end);
            let b = select_effect(low_end);
            assert_eq!(a, b);
            assert_eq!(a.glyph_size_px.to_bits(), b.glyph_size_px.to_bits());
            assert_eq!(a.column_density.to_bits(), b.column_density.to_bits());
        }
    }

    #[test]
    fn test_low_end_profile_is_cheaper() {
        let low = select_effect(true);
        let high = select_effect(false);
        assert!(low.glyph_size_px > high.glyph_size_px);
        assert!(low.target_fps < high.target_fps);
        assert_eq!(low.column_density, high.column_density / 2.0);
        assert!(!low.trails_enabled);
        assert!(high.trails_enabled);
    }

    #[test]
    fn test_column_count_rounds_down() {
        let dense = EffectConfig { glyph_size_px: 20.0, ..HIGH_END };
        let sparse = EffectConfig { glyph_size_px: 20.0, ..LOW_END };
        assert_eq!(dense.column_count(100.0), 5);
        assert_eq!(sparse.column_count(100.0), 2);
        assert_eq!(dense.column_count(19.0), 0);
        assert_eq!(dense.column_count(0.0), 0);
    }

    #[test]
    fn test_sparse_columns_spread_out() {
        let sparse = EffectConfig { glyph_size_px: 20.0, ..LOW_END };
        assert_eq!(sparse.column_x(0), 0.0);
        assert_eq!(sparse.column_x(1), 40.0);
        let last = sparse.column_count(100.0) - 1;
        assert!(sparse.column_x(last) + sparse.glyph_size_px <= 100.0);
    }

    #[test]
    fn test_frame_interval() {
        assert_eq!(LOW_END.frame_interval(), Duration::from_secs_f64(1.0 / 15.0));
        let zero = EffectConfig { target_fps: 0, ..HIGH_END };
        assert_eq!(zero.frame_interval(), Duration::from_secs(1));
    }
}
