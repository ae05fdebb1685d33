//! Scriptable in-memory backend for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use ndarray::Array2;

use crate::backend::{DecodeError, DecodeRenderBackend, DecodedFrame, DisplayElement, SurfaceError};
use crate::windowing::WindowLevel;

pub(crate) const DEFAULT_WINDOW: WindowLevel = WindowLevel {
    width: 400.0,
    center: 40.0,
};

#[derive(Default)]
struct Script {
    frames: HashMap<String, (f32, WindowLevel)>,
    failing: HashSet<String>,
    not_mounted_binds: usize,
}

#[derive(Default)]
struct Recorded {
    decode_calls: HashMap<String, usize>,
    bound: HashSet<u64>,
    bind_calls: usize,
    unbind_calls: usize,
    /// marker of every painted frame, in order
    painted: Vec<f32>,
    default_mapping: Option<WindowLevel>,
    mapping: Option<WindowLevel>,
    set_mapping_calls: Vec<WindowLevel>,
    mapped_paints: usize,
}

/// Frames are 2x2 and filled with a per-locator marker so tests can tell
/// which slice ended up on the surface.
#[derive(Default)]
pub(crate) struct MockBackend {
    script: Mutex<Script>,
    recorded: Mutex<Recorded>,
}

impl MockBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_frame(self, locator: &str, marker: f32, window: WindowLevel) -> Self {
        self.script()
            .frames
            .insert(locator.to_owned(), (marker, window));
        self
    }

    pub(crate) fn failing(self, locator: &str) -> Self {
        self.script().failing.insert(locator.to_owned());
        self
    }

    /// Make the next `count` binds fail as if the element were not mounted.
    pub(crate) fn not_mounted_for(self, count: usize) -> Self {
        self.script().not_mounted_binds = count;
        self
    }

    pub(crate) fn recover(&self, locator: &str) {
        self.script().failing.remove(locator);
    }

    pub(crate) fn decode_calls(&self, locator: &str) -> usize {
        self.recorded()
            .decode_calls
            .get(locator)
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn painted(&self) -> Vec<f32> {
        self.recorded().painted.clone()
    }

    pub(crate) fn last_painted(&self) -> Option<f32> {
        self.recorded().painted.last().copied()
    }

    pub(crate) fn mapping(&self) -> Option<WindowLevel> {
        self.recorded().mapping
    }

    pub(crate) fn set_mapping_calls(&self) -> Vec<WindowLevel> {
        self.recorded().set_mapping_calls.clone()
    }

    pub(crate) fn mapped_paints(&self) -> usize {
        self.recorded().mapped_paints
    }

    pub(crate) fn bind_calls(&self) -> usize {
        self.recorded().bind_calls
    }

    pub(crate) fn unbind_calls(&self) -> usize {
        self.recorded().unbind_calls
    }

    /// Bind an element behind the viewer's back.
    pub(crate) fn force_bind(&self, element: &DisplayElement) {
        self.recorded().bound.insert(element.id);
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().expect("script lock")
    }

    fn recorded(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().expect("recorded lock")
    }

    fn frame_for(&self, locator: &str) -> Result<DecodedFrame, DecodeError> {
        let script = self.script();
        if script.failing.contains(locator) {
            return Err(DecodeError::Malformed {
                locator: locator.to_owned(),
                reason: "scripted failure".to_owned(),
            });
        }
        let (marker, window) = script
            .frames
            .get(locator)
            .copied()
            .unwrap_or((0.0, DEFAULT_WINDOW));
        Ok(DecodedFrame::new(Array2::from_elem((2, 2), marker), window))
    }

    fn require_bound(&self, element: &DisplayElement) -> Result<(), SurfaceError> {
        if self.recorded().bound.contains(&element.id) {
            Ok(())
        } else {
            Err(SurfaceError::NotBound(element.id))
        }
    }
}

impl DecodeRenderBackend for MockBackend {
    async fn decode_frame(&self, locator: &str) -> Result<DecodedFrame, DecodeError> {
        *self
            .recorded()
            .decode_calls
            .entry(locator.to_owned())
            .or_default() += 1;
        self.frame_for(locator)
    }

    fn is_bound(&self, element: &DisplayElement) -> bool {
        self.recorded().bound.contains(&element.id)
    }

    fn bind_surface(&self, element: &DisplayElement) -> Result<(), SurfaceError> {
        {
            let mut script = self.script();
            if script.not_mounted_binds > 0 {
                script.not_mounted_binds -= 1;
                return Err(SurfaceError::NotMounted(element.id));
            }
        }
        let mut recorded = self.recorded();
        recorded.bind_calls += 1;
        if !recorded.bound.insert(element.id) {
            return Err(SurfaceError::AlreadyBound(element.id));
        }
        Ok(())
    }

    fn unbind_surface(&self, element: &DisplayElement) -> Result<(), SurfaceError> {
        let mut recorded = self.recorded();
        recorded.unbind_calls += 1;
        recorded.bound.remove(&element.id);
        Ok(())
    }

    fn paint(&self, element: &DisplayElement, frame: &DecodedFrame) -> Result<(), SurfaceError> {
        self.require_bound(element)?;
        let mut recorded = self.recorded();
        recorded.painted.push(frame.pixels[[0, 0]]);
        recorded.default_mapping = Some(frame.default_window);
        recorded.mapping = Some(frame.default_window);
        Ok(())
    }

    fn paint_mapped(
        &self,
        element: &DisplayElement,
        frame: &DecodedFrame,
        level: WindowLevel,
    ) -> Result<(), SurfaceError> {
        self.require_bound(element)?;
        let mut recorded = self.recorded();
        recorded.painted.push(frame.pixels[[0, 0]]);
        recorded.default_mapping = Some(frame.default_window);
        recorded.mapping = Some(level);
        recorded.mapped_paints += 1;
        Ok(())
    }

    fn current_mapping(&self, element: &DisplayElement) -> Result<WindowLevel, SurfaceError> {
        self.require_bound(element)?;
        self.recorded()
            .mapping
            .ok_or(SurfaceError::NothingPainted(element.id))
    }

    fn set_mapping(
        &self,
        element: &DisplayElement,
        level: WindowLevel,
    ) -> Result<(), SurfaceError> {
        self.require_bound(element)?;
        let mut recorded = self.recorded();
        recorded.set_mapping_calls.push(level);
        recorded.mapping = Some(level);
        Ok(())
    }

    fn restore_default_mapping(
        &self,
        element: &DisplayElement,
    ) -> Result<WindowLevel, SurfaceError> {
        self.require_bound(element)?;
        let mut recorded = self.recorded();
        let default = recorded
            .default_mapping
            .ok_or(SurfaceError::NothingPainted(element.id))?;
        recorded.mapping = Some(default);
        Ok(default)
    }
}
