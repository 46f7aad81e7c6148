//! Magnitude to colour mapping.

use crate::config::{Palette, SpectrogramConfig};

/// Alpha for a byte magnitude: `min(255, 2 * magnitude)`.
pub fn alpha_for(magnitude: u8) -> u8 {
    (u16::from(magnitude) * 2).min(255) as u8
}

/// Three-band colour classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorBands {
    palette: Palette,
    medium_threshold: u8,
    high_threshold: u8,
}

impl ColorBands {
    /// Build from the renderer configuration
    pub fn from_config(config: &SpectrogramConfig) -> Self {
        Self {
            palette: config.palette,
            medium_threshold: config.medium_threshold,
            high_threshold: config.high_threshold,
        }
    }

    /// RGB colour for a magnitude
    pub fn color_for(&self, magnitude: u8) -> [u8; 3] {
        if magnitude < self.medium_threshold {
            self.palette.low
        } else if magnitude < self.high_threshold {
            self.palette.medium
        } else {
            self.palette.high
        }
    }

    /// RGBA pixel for a magnitude
    pub fn pixel_for(&self, magnitude: u8) -> [u8; 4] {
        let [r, g, b] = self.color_for(magnitude);
        [r, g, b, alpha_for(magnitude)]
    }
}

impl Default for ColorBands {
    fn default() -> Self {
        Self::from_config(&SpectrogramConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_formula() {
        assert_eq!(alpha_for(0), 0);
        assert_eq!(alpha_for(1), 2);
        assert_eq!(alpha_for(127), 254);
        assert_eq!(alpha_for(128), 255);
        assert_eq!(alpha_for(255), 255);
    }

    #[test]
    fn test_band_boundaries() {
        let bands = ColorBands::default();
        assert_eq!(bands.color_for(0), [0, 102, 204]);
        assert_eq!(bands.color_for(99), [0, 102, 204]);
        assert_eq!(bands.color_for(100), [255, 255, 0]);
        assert_eq!(bands.color_for(169), [255, 255, 0]);
        assert_eq!(bands.color_for(170), [255, 0, 0]);
        assert_eq!(bands.color_for(255), [255, 0, 0]);
    }

    #[test]
    fn test_zero_magnitude_is_transparent() {
        let bands = ColorBands::default();
        assert_eq!(bands.pixel_for(0), [0, 102, 204, 0]);
    }

    #[test]
    fn test_custom_thresholds() {
        let config = SpectrogramConfig {
            medium_threshold: 10,
            high_threshold: 10,
            ..Default::default()
        };
        let bands = ColorBands::from_config(&config);
        // Equal thresholds skip the medium band entirely
        assert_eq!(bands.color_for(9), config.palette.low);
        assert_eq!(bands.color_for(10), config.palette.high);
    }
}
