//! Configuration for the viewer and its software surface.

use std::ops::RangeInclusive;
use std::time::Duration;

use image::imageops::FilterType;

/// Tunables for a mounted viewer.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Allowed window width span. Input outside it is clamped.
    pub width_limits: RangeInclusive<f64>,
    /// Allowed window center. Input outside it is clamped.
    pub center_limits: RangeInclusive<f64>,
    /// Delay before the single retry when enabling races the element mount.
    pub enable_retry_delay: Duration,
    /// Wheel deltas with an absolute value at or below this are ignored.
    pub wheel_dead_zone: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width_limits: 1.0..=4000.0,
            center_limits: -2000.0..=2000.0,
            enable_retry_delay: Duration::from_millis(50),
            wheel_dead_zone: 0.0,
        }
    }
}

impl ViewerConfig {
    pub fn with_width_limits(mut self, limits: RangeInclusive<f64>) -> Self {
        self.width_limits = limits;
        self
    }

    pub fn with_center_limits(mut self, limits: RangeInclusive<f64>) -> Self {
        self.center_limits = limits;
        self
    }

    pub fn with_enable_retry_delay(mut self, delay: Duration) -> Self {
        self.enable_retry_delay = delay;
        self
    }

    pub fn with_wheel_dead_zone(mut self, dead_zone: f64) -> Self {
        self.wheel_dead_zone = dead_zone.abs();
        self
    }
}

/// Rendering options for the software canvas used by
/// [`DicomBackend`](crate::dicom_backend::DicomBackend).
#[derive(Debug, Clone, Copy)]
pub struct CanvasConfig {
    /// Gray level used for the letterbox around the frame.
    pub background: u8,
    /// Resampling filter when fitting a frame into the element.
    pub filter: FilterType,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            background: 0,
            // pixelated rendering
            filter: FilterType::Nearest,
        }
    }
}

impl CanvasConfig {
    pub fn smooth() -> Self {
        Self {
            filter: FilterType::Triangle,
            ..Self::default()
        }
    }

    pub fn with_background(mut self, background: u8) -> Self {
        self.background = background;
        self
    }
}
