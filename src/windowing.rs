//! Linear VOI windowing: maps raw sample intensity to display brightness.

use std::ops::RangeInclusive;

use rayon::prelude::*;

/// Window width (contrast span) and center (brightness midpoint).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowLevel {
    pub width: f64,
    pub center: f64,
}

impl WindowLevel {
    pub fn new(width: f64, center: f64) -> Self {
        Self { width, center }
    }

    /// Derive a window covering the full sample range.
    pub fn from_range(min: f64, max: f64) -> Self {
        Self {
            width: (max - min).max(1.0),
            center: (max + min) / 2.0,
        }
    }

    /// Map one sample to an 8-bit display value (DICOM linear function).
    #[inline]
    pub fn map(&self, value: f32) -> u8 {
        let width = self.width.max(1.0);
        let center = self.center - 0.5;
        let half = (width - 1.0) / 2.0;
        let value = value as f64;

        if value <= center - half {
            0
        } else if value > center + half {
            255
        } else if width <= 1.0 {
            // degenerate window collapses to a threshold
            255
        } else {
            (((value - center) / (width - 1.0) + 0.5) * 255.0)
                .clamp(0.0, 255.0)
                .round() as u8
        }
    }

    /// Apply the window to a whole frame.
    pub fn apply(&self, samples: &[f32]) -> Vec<u8> {
        samples.par_iter().map(|&v| self.map(v)).collect()
    }
}

/// Holds the per-viewer display mapping.
///
/// The mapping is seeded once per slice set from the first decoded frame and
/// afterwards only changes through explicit input.
#[derive(Debug, Clone)]
pub struct WindowingController {
    current: Option<WindowLevel>,
    width_limits: RangeInclusive<f64>,
    center_limits: RangeInclusive<f64>,
}

impl WindowingController {
    pub fn new(width_limits: RangeInclusive<f64>, center_limits: RangeInclusive<f64>) -> Self {
        Self {
            current: None,
            width_limits,
            center_limits,
        }
    }

    pub fn current(&self) -> Option<WindowLevel> {
        self.current
    }

    pub fn is_seeded(&self) -> bool {
        self.current.is_some()
    }

    pub fn width_limits(&self) -> &RangeInclusive<f64> {
        &self.width_limits
    }

    pub fn center_limits(&self) -> &RangeInclusive<f64> {
        &self.center_limits
    }

    /// Seed from frame defaults. Returns `false` if already seeded.
    pub fn seed(&mut self, defaults: WindowLevel) -> bool {
        if self.current.is_some() {
            return false;
        }
        self.current = Some(defaults);
        true
    }

    /// Forget the mapping so the next decoded frame seeds it again.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Adopt values restored by the surface, bypassing the limits.
    pub fn adopt(&mut self, level: WindowLevel) {
        self.current = Some(level);
    }

    /// Returns the new mapping, or `None` when nothing has been seeded yet.
    pub fn set_width(&mut self, value: f64) -> Option<WindowLevel> {
        let width = clamp(value, &self.width_limits);
        let current = self.current.as_mut()?;
        current.width = width;
        Some(*current)
    }

    pub fn set_center(&mut self, value: f64) -> Option<WindowLevel> {
        let center = clamp(value, &self.center_limits);
        let current = self.current.as_mut()?;
        current.center = center;
        Some(*current)
    }
}

fn clamp(value: f64, limits: &RangeInclusive<f64>) -> f64 {
    if value.is_nan() {
        return *limits.start();
    }
    value.clamp(*limits.start(), *limits.end())
}
