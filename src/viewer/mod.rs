//! Viewer state and the decode-and-paint pipeline.
//!
//! Requests and completions are split so input never waits on a decode:
//! navigation returns a [`FrameRequest`], the host awaits it wherever it
//! likes, and hands the [`FrameResolution`] back to [`Viewer::complete`].
//! Only a resolution that still matches the current slice set and index is
//! painted (last requested state wins).

use std::future::Future;

use thiserror::Error;

use crate::backend::{DecodeError, DecodeRenderBackend, DisplayElement, SurfaceError};
use crate::config::ViewerConfig;
use crate::controls::{SliceControls, ViewerView};
use crate::decode_engine::{DecodeEngine, DecodeFuture, DecodeResult};
use crate::enums::{Direction, SurfaceState};
use crate::message::{Message, Update};
use crate::navigation::{self, InputEvent, NavigationIntent};
use crate::slice_set::SliceSet;
use crate::surface::{InitError, Surface};
use crate::windowing::{WindowLevel, WindowingController};


#[derive(Debug, Clone, Error, PartialEq)]
pub enum ViewerError {
    #[error(transparent)]
    Init(#[from] InitError),

    #[error("Failed to load slice {} of {total}", .index + 1)]
    Slice {
        index: usize,
        total: usize,
        #[source]
        source: DecodeError,
    },

    #[error("Failed to display slice {} of {total}: {source}", .index + 1)]
    Display {
        index: usize,
        total: usize,
        source: SurfaceError,
    },
}

impl ViewerError {
    /// Blocking errors take over the whole viewer panel.
    pub fn is_blocking(&self) -> bool {
        matches!(self, ViewerError::Init(_))
    }
}

/// Identifies the state a decode was requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTicket {
    slice_set: u64,
    index: usize,
    total: usize,
    locator: String,
}

impl FrameTicket {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn slice_set_identity(&self) -> u64 {
        self.slice_set
    }
}

/// A decode in flight for one `(slice set, index)` pair.
#[must_use = "a frame request does nothing until it is resolved and completed"]
pub struct FrameRequest {
    ticket: FrameTicket,
    decode: DecodeFuture,
}

impl FrameRequest {
    pub fn ticket(&self) -> &FrameTicket {
        &self.ticket
    }

    pub async fn resolve(self) -> FrameResolution {
        let result = self.decode.await;
        FrameResolution {
            ticket: self.ticket,
            result,
        }
    }
}

#[derive(Debug)]
pub struct FrameResolution {
    pub ticket: FrameTicket,
    pub result: DecodeResult,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintOutcome {
    Painted { index: usize, seeded: bool },
    /// The viewer moved on before the decode finished. Nothing changed.
    Stale,
    Failed(ViewerError),
    /// No request could be issued (empty set, surface not enabled).
    Skipped,
}

pub struct Viewer<B> {
    config: ViewerConfig,
    surface: Surface<B>,
    engine: Option<DecodeEngine<B>>,
    slice_set: SliceSet,
    current_index: usize,
    windowing: WindowingController,
    last_error: Option<ViewerError>,
    pending: Option<FrameTicket>,
    painted: Option<FrameTicket>,
    mounted: bool,
}

impl<B: DecodeRenderBackend> Viewer<B> {
    pub fn new(config: ViewerConfig) -> Self {
        let windowing =
            WindowingController::new(config.width_limits.clone(), config.center_limits.clone());
        Self {
            surface: Surface::new(config.enable_retry_delay),
            engine: None,
            slice_set: SliceSet::empty(),
            current_index: 0,
            windowing,
            last_error: None,
            pending: None,
            painted: None,
            mounted: true,
            config,
        }
    }

    /// Construct the backend and bind it to `element`.
    ///
    /// If slices were supplied before the backend was ready, the returned
    /// update carries the request for the current slice.
    pub async fn initialize<F>(&mut self, element: Option<DisplayElement>, setup: F) -> Update
    where
        F: Future<Output = Result<B, InitError>>,
    {
        if !self.mounted {
            return Update::none();
        }
        match self.surface.initialize(element, setup).await {
            Ok(backend) => {
                if self.engine.is_none() {
                    self.engine = Some(DecodeEngine::new(backend));
                }
                self.sync_surface().await
            }
            Err(err) => {
                self.last_error = Some(err.into());
                Update::none()
            }
        }
    }

    /// Provide the display element once it exists.
    pub async fn attach_element(&mut self, element: DisplayElement) -> Update {
        if !self.mounted {
            return Update::none();
        }
        self.surface.attach(element);
        self.sync_surface().await
    }

    /// Replace the slice set. A new identity resets index and windowing.
    pub async fn set_slice_set(&mut self, slice_set: SliceSet) -> Update {
        if !self.mounted || slice_set.same_identity(&self.slice_set) {
            return Update::none();
        }

        log::info!(
            "Loading slice set {} with {} slices",
            slice_set.identity(),
            slice_set.len()
        );
        if let Some(engine) = &self.engine {
            engine.clear();
        }
        self.slice_set = slice_set;
        self.current_index = 0;
        self.windowing.clear();
        self.pending = None;
        self.painted = None;
        if !matches!(self.last_error, Some(ViewerError::Init(_))) {
            self.last_error = None;
        }

        self.sync_surface().await
    }

    pub async fn update(&mut self, message: Message) -> Update {
        match message {
            Message::SetSlices(slice_set) => self.set_slice_set(slice_set).await,
            Message::AttachElement(element) => self.attach_element(element).await,
            Message::Input(event) => self.handle_input(event),
            Message::GoTo(index) => Update::request(self.go_to(index)),
            Message::Step(direction) => Update::request(self.step(direction)),
            Message::First => Update::request(self.go_to_first()),
            Message::Last => Update::request(self.go_to_last()),
            Message::SetWidth(value) => {
                self.set_width(value);
                Update::none()
            }
            Message::SetCenter(value) => {
                self.set_center(value);
                Update::none()
            }
            Message::ResetWindow => {
                self.reset_windowing();
                Update::none()
            }
            Message::Unmount => {
                self.unmount();
                Update::none()
            }
        }
    }

    pub fn handle_input(&mut self, event: InputEvent) -> Update {
        if !self.mounted {
            return Update::none();
        }
        let translated =
            navigation::translate(event, self.slice_set.len(), self.config.wheel_dead_zone);
        let request = translated
            .intent
            .and_then(|intent| self.navigate(intent));
        Update {
            request,
            prevent_default: translated.prevent_default,
        }
    }

    /// Whether the host should suppress its own handling of `event`.
    pub fn prevents_default(&self, event: &InputEvent) -> bool {
        self.mounted
            && navigation::translate(*event, self.slice_set.len(), self.config.wheel_dead_zone)
                .prevent_default
    }

    pub fn go_to(&mut self, index: usize) -> Option<FrameRequest> {
        let index = i64::try_from(index).unwrap_or(i64::MAX);
        self.navigate(NavigationIntent::GoTo(index))
    }

    pub fn step(&mut self, direction: Direction) -> Option<FrameRequest> {
        self.navigate(NavigationIntent::Step(direction))
    }

    pub fn go_to_first(&mut self) -> Option<FrameRequest> {
        self.navigate(NavigationIntent::First)
    }

    pub fn go_to_last(&mut self) -> Option<FrameRequest> {
        self.navigate(NavigationIntent::Last)
    }

    fn navigate(&mut self, intent: NavigationIntent) -> Option<FrameRequest> {
        if !self.mounted || self.is_blocked() {
            return None;
        }
        let target = navigation::resolve(intent, self.current_index, self.slice_set.len())?;
        if target == self.current_index {
            return None;
        }
        self.current_index = target;
        self.request_current()
    }

    /// Request the frame for the current state, if the surface can show it.
    pub fn request_current(&mut self) -> Option<FrameRequest> {
        if !self.mounted || self.is_blocked() || !self.surface.state().is_enabled() {
            return None;
        }
        let engine = self.engine.as_ref()?;
        let locator = self.slice_set.get(self.current_index)?;

        let ticket = FrameTicket {
            slice_set: self.slice_set.identity(),
            index: self.current_index,
            total: self.slice_set.len(),
            locator: locator.to_owned(),
        };
        let decode = engine.decode(locator);
        self.pending = Some(ticket.clone());
        Some(FrameRequest { ticket, decode })
    }

    /// Decode and paint slice `index` of `slice_set`, waiting for the result.
    ///
    /// The result is discarded if `slice_set`/`index` is not the viewer's
    /// state by the time the decode finishes.
    pub async fn show_frame(&mut self, slice_set: &SliceSet, index: usize) -> PaintOutcome {
        if !self.mounted || self.is_blocked() || !self.surface.state().is_enabled() {
            return PaintOutcome::Skipped;
        }
        let (Some(engine), Some(locator)) = (self.engine.as_ref(), slice_set.get(index)) else {
            return PaintOutcome::Skipped;
        };
        let request = FrameRequest {
            ticket: FrameTicket {
                slice_set: slice_set.identity(),
                index,
                total: slice_set.len(),
                locator: locator.to_owned(),
            },
            decode: engine.decode(locator),
        };
        let resolution = request.resolve().await;
        self.complete(resolution)
    }

    /// Apply a finished decode.
    pub fn complete(&mut self, resolution: FrameResolution) -> PaintOutcome {
        let FrameResolution { ticket, result } = resolution;

        if !self.is_current(&ticket) {
            log::debug!(
                "Discarding stale decode of {} (slice {})",
                ticket.locator,
                ticket.index + 1
            );
            return PaintOutcome::Stale;
        }
        if self.pending.as_ref() == Some(&ticket) {
            self.pending = None;
        }

        let frame = match result {
            Ok(frame) => frame,
            Err(source) => {
                let error = ViewerError::Slice {
                    index: ticket.index,
                    total: ticket.total,
                    source,
                };
                log::error!("{error}");
                self.last_error = Some(error.clone());
                return PaintOutcome::Failed(error);
            }
        };

        let active = self.windowing.current();
        let painted = match active {
            Some(level) => self.surface.paint_mapped(&frame, level),
            None => self.surface.paint(&frame),
        };
        if let Err(source) = painted {
            let error = ViewerError::Display {
                index: ticket.index,
                total: ticket.total,
                source,
            };
            log::error!("{error}");
            self.last_error = Some(error.clone());
            return PaintOutcome::Failed(error);
        }

        let seeded = active.is_none() && self.windowing.seed(frame.default_window);

        if !matches!(self.last_error, Some(ViewerError::Init(_))) {
            self.last_error = None;
        }
        log::debug!(
            "Showing slice {} of {}",
            ticket.index + 1,
            ticket.total
        );
        let index = ticket.index;
        self.painted = Some(ticket);
        PaintOutcome::Painted { index, seeded }
    }

    /// Set the window width. Applied to the live surface without decoding.
    pub fn set_width(&mut self, value: f64) -> Option<WindowLevel> {
        let level = self.windowing.set_width(value)?;
        self.apply_window(level);
        Some(level)
    }

    pub fn set_center(&mut self, value: f64) -> Option<WindowLevel> {
        let level = self.windowing.set_center(value)?;
        self.apply_window(level);
        Some(level)
    }

    /// Restore the painted frame's default window and adopt it.
    ///
    /// Does nothing until a frame of the current slice set is painted, so a
    /// frame left over from a replaced set can never seed the new one.
    pub fn reset_windowing(&mut self) -> Option<WindowLevel> {
        let identity = self.slice_set.identity();
        if !self
            .painted
            .as_ref()
            .is_some_and(|ticket| ticket.slice_set == identity)
        {
            log::debug!("Nothing of slice set {identity} painted yet, ignoring reset");
            return None;
        }
        match self.surface.reset() {
            Ok(level) => {
                self.windowing.adopt(level);
                Some(level)
            }
            Err(err) => {
                log::warn!("Cannot reset window: {err}");
                None
            }
        }
    }

    /// Tear down. Decodes that finish afterwards are ignored.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.surface.dispose();
        if let Some(engine) = &self.engine {
            engine.clear();
        }
        self.pending = None;
        self.painted = None;
        log::info!("Viewer unmounted");
    }

    pub fn view(&self) -> ViewerView {
        if let Some(error) = self.last_error.as_ref().filter(|e| e.is_blocking()) {
            return ViewerView::Blocked {
                message: error.to_string(),
            };
        }
        if self.slice_set.is_empty() {
            return ViewerView::Empty;
        }
        ViewerView::Slices(SliceControls::new(
            self.current_index,
            self.slice_set.len(),
            self.windowing.current(),
            self.windowing.width_limits().clone(),
            self.windowing.center_limits().clone(),
            self.last_error.as_ref().map(ToString::to_string),
            self.pending.is_some(),
        ))
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn slice_set(&self) -> &SliceSet {
        &self.slice_set
    }

    pub fn window(&self) -> Option<WindowLevel> {
        self.windowing.current()
    }

    pub fn last_error(&self) -> Option<&ViewerError> {
        self.last_error.as_ref()
    }

    pub fn surface_state(&self) -> SurfaceState {
        self.surface.state()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Index of the slice currently on the surface.
    pub fn painted_index(&self) -> Option<usize> {
        self.painted.as_ref().map(FrameTicket::index)
    }

    pub fn backend(&self) -> Option<&B> {
        self.surface.backend().map(|backend| &**backend)
    }

    pub fn decode_engine(&self) -> Option<&DecodeEngine<B>> {
        self.engine.as_ref()
    }

    fn is_blocked(&self) -> bool {
        self.last_error.as_ref().is_some_and(ViewerError::is_blocking)
    }

    fn is_current(&self, ticket: &FrameTicket) -> bool {
        self.mounted
            && ticket.slice_set == self.slice_set.identity()
            && ticket.index == self.current_index
    }

    fn apply_window(&self, level: WindowLevel) {
        if self.painted.is_none() {
            return;
        }
        if let Err(err) = self.surface.set_mapping(level) {
            log::warn!("Failed to apply window: {err}");
        }
    }

    /// Enable or disable the surface to match the slice set, then request
    /// the current frame when enabled.
    async fn sync_surface(&mut self) -> Update {
        if self.engine.is_none() || self.is_blocked() {
            return Update::none();
        }
        if self.slice_set.is_empty() {
            self.surface.disable();
            return Update::none();
        }
        if let Err(err) = self.surface.enable().await {
            self.last_error = Some(err.into());
            return Update::none();
        }
        Update::request(self.request_current())
    }
}
