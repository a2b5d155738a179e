//! Configuration options for the viewer.

use serde::{Deserialize, Serialize};

use crate::layout::DEFAULT_GAP;

/// Global viewer options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerOptions {
    /// Quiet period before the high-quality redraw, in milliseconds.
    pub debounce_ms: u64,

    /// Low-power device: skips the volume pass while interacting and
    /// starts with the slice panes hidden.
    pub low_power: bool,

    /// Upper bound on raycast samples.
    pub max_samples: u32,

    /// Upper bound on raycast samples on low-power devices.
    pub low_power_max_samples: u32,

    /// Sampling filter for the atlas texture.
    pub filter: AtlasFilter,

    /// Gap in pixels between stacked slice panes.
    pub slice_gap: u32,

    /// Frames timed by the speed test before samples are reduced.
    pub speed_test_frames: u32,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            debounce_ms: 250,
            low_power: false,
            max_samples: 1024,
            low_power_max_samples: 256,
            filter: AtlasFilter::Linear,
            slice_gap: DEFAULT_GAP,
            speed_test_frames: 5,
        }
    }
}

impl ViewerOptions {
    /// Options for a low-power device.
    pub fn low_power() -> Self {
        Self {
            low_power: true,
            ..Self::default()
        }
    }

    /// Sample ceiling for this device class.
    pub fn sample_ceiling(&self) -> u32 {
        if self.low_power {
            self.low_power_max_samples
        } else {
            self.max_samples
        }
    }

    /// Whether the volume pass runs during interaction.
    pub fn interactive(&self) -> bool {
        !self.low_power
    }

    /// Debounce delay.
    pub fn debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.debounce_ms)
    }
}

/// Texture filtering for the atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AtlasFilter {
    /// Linear interpolation.
    #[default]
    Linear,
    /// Nearest neighbour.
    Nearest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ViewerOptions::default();
        assert_eq!(options.debounce().as_millis(), 250);
        assert_eq!(options.sample_ceiling(), 1024);
        assert!(options.interactive());
        assert_eq!(ViewerOptions::low_power().sample_ceiling(), 256);
    }

    #[test]
    fn test_serde_round_trip_with_missing_fields() {
        let options: ViewerOptions = serde_json::from_str(r#"{"low_power": true}"#).unwrap();
        assert!(options.low_power);
        assert_eq!(options.slice_gap, DEFAULT_GAP);
        let text = serde_json::to_string(&options).unwrap();
        let back: ViewerOptions = serde_json::from_str(&text).unwrap();
        assert_eq!(options, back);
    }
}
