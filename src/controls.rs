//! Render-ready description of the viewer's user-facing controls.

use std::ops::RangeInclusive;

use crate::windowing::WindowLevel;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerView {
    /// No scan uploaded yet
    Empty,
    /// The backend could not start; replaces the whole panel
    Blocked { message: String },
    Slices(SliceControls),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SliceControls {
    /// "Slice i of N", 1-based
    pub counter: String,
    pub index: usize,
    pub count: usize,
    pub slider: RangeInclusive<usize>,
    pub previous_enabled: bool,
    pub next_enabled: bool,
    pub window: Option<WindowLevel>,
    pub width_range: RangeInclusive<f64>,
    pub center_range: RangeInclusive<f64>,
    pub reset_enabled: bool,
    /// Controls are hidden while an inline error is shown
    pub controls_visible: bool,
    pub error: Option<String>,
    pub loading: bool,
}

impl SliceControls {
    pub(crate) fn new(
        index: usize,
        count: usize,
        window: Option<WindowLevel>,
        width_range: RangeInclusive<f64>,
        center_range: RangeInclusive<f64>,
        error: Option<String>,
        loading: bool,
    ) -> Self {
        let last = count.saturating_sub(1);
        let controls_visible = count > 0 && error.is_none();
        Self {
            counter: format!("Slice {} of {count}", index + 1),
            index,
            count,
            slider: 0..=last,
            previous_enabled: controls_visible && index > 0,
            next_enabled: controls_visible && index < last,
            reset_enabled: controls_visible && window.is_some(),
            window,
            width_range,
            center_range,
            controls_visible,
            error,
            loading,
        }
    }
}
