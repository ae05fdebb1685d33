use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::backend::{DecodeRenderBackend, DecodedFrame, DisplayElement, SurfaceError};
use crate::enums::SurfaceState;
use crate::windowing::WindowLevel;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InitError {
    #[error("rendering backend failed to initialize: {0}")]
    Backend(String),

    #[error("surface has been disposed")]
    Disposed,

    #[error("surface could not be enabled: {0}")]
    Enable(#[from] SurfaceError),
}

/// Owns the single rendering surface of a viewer.
///
/// The backend handle and the display element live here for the whole
/// viewer lifetime; state transitions are the only way to touch them.
pub struct Surface<B> {
    state: SurfaceState,
    backend: Option<Arc<B>>,
    element: Option<DisplayElement>,
    retry_delay: Duration,
}

impl<B: DecodeRenderBackend> Surface<B> {
    pub fn new(retry_delay: Duration) -> Self {
        Self {
            state: SurfaceState::Uninitialized,
            backend: None,
            element: None,
            retry_delay,
        }
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn element(&self) -> Option<&DisplayElement> {
        self.element.as_ref()
    }

    pub fn backend(&self) -> Option<&Arc<B>> {
        self.backend.as_ref()
    }

    /// Run the backend setup once. Later calls are no-ops.
    ///
    /// `element` may be `None` when the display element does not exist yet;
    /// it can be supplied later with [`Surface::attach`].
    pub async fn initialize<F>(
        &mut self,
        element: Option<DisplayElement>,
        setup: F,
    ) -> Result<Arc<B>, InitError>
    where
        F: Future<Output = Result<B, InitError>>,
    {
        match self.state {
            SurfaceState::Disposed => return Err(InitError::Disposed),
            SurfaceState::Ready { .. } | SurfaceState::Initializing => {
                if let Some(backend) = &self.backend {
                    log::debug!("Surface already initialized");
                    return Ok(Arc::clone(backend));
                }
            }
            SurfaceState::Uninitialized => {}
        }

        if let Some(element) = element {
            self.element = Some(element);
        }

        self.state = SurfaceState::Initializing;
        match setup.await {
            Ok(backend) => {
                let backend = Arc::new(backend);
                self.backend = Some(Arc::clone(&backend));
                self.state = SurfaceState::Ready { enabled: false };
                log::info!("Rendering backend initialized");
                Ok(backend)
            }
            Err(err) => {
                log::error!("Rendering backend initialization failed: {err}");
                self.state = SurfaceState::Uninitialized;
                Err(err)
            }
        }
    }

    /// Supply or replace the display element. Only allowed while disabled.
    pub fn attach(&mut self, element: DisplayElement) {
        if self.state.is_enabled() {
            log::warn!("Ignoring element {} while surface is enabled", element.id);
            return;
        }
        self.element = Some(element);
    }

    /// Bind the surface so it accepts paints.
    ///
    /// A bind that reports the element as already bound is treated as done.
    /// A bind that races the element's mount is retried once after the
    /// configured delay.
    pub async fn enable(&mut self) -> Result<(), InitError> {
        match self.state {
            SurfaceState::Ready { enabled: true } => return Ok(()),
            SurfaceState::Ready { enabled: false } => {}
            SurfaceState::Disposed => return Err(InitError::Disposed),
            SurfaceState::Uninitialized | SurfaceState::Initializing => {
                return Err(InitError::Backend("backend not initialized".to_owned()));
            }
        }
        let (Some(backend), Some(element)) = (self.backend.clone(), self.element) else {
            log::debug!("No display element yet, deferring enable");
            return Ok(());
        };

        if backend.is_bound(&element) {
            log::debug!("Element {} already bound", element.id);
            self.state = SurfaceState::Ready { enabled: true };
            return Ok(());
        }

        let result = match backend.bind_surface(&element) {
            Err(SurfaceError::NotMounted(id)) => {
                log::warn!(
                    "Element {id} not mounted yet, retrying in {:?}",
                    self.retry_delay
                );
                tokio::time::sleep(self.retry_delay).await;
                backend.bind_surface(&element)
            }
            other => other,
        };

        match result {
            Ok(()) => {}
            Err(SurfaceError::AlreadyBound(id)) => {
                log::warn!("Element {id} was bound concurrently, keeping existing binding");
            }
            Err(err) => {
                log::error!("Failed to enable surface: {err}");
                return Err(err.into());
            }
        }

        self.state = SurfaceState::Ready { enabled: true };
        log::info!("Surface enabled on element {}", element.id);
        Ok(())
    }

    /// Release the binding. Safe to call when never enabled.
    pub fn disable(&mut self) {
        if !self.state.is_enabled() {
            return;
        }
        if let (Some(backend), Some(element)) = (&self.backend, &self.element) {
            if let Err(err) = backend.unbind_surface(element) {
                log::warn!("Failed to unbind element {}: {err}", element.id);
            }
        }
        self.state = SurfaceState::Ready { enabled: false };
        log::info!("Surface disabled");
    }

    /// Disable and refuse any further use.
    pub fn dispose(&mut self) {
        self.disable();
        self.state = SurfaceState::Disposed;
    }

    pub fn paint(&self, frame: &DecodedFrame) -> Result<(), SurfaceError> {
        let (backend, element) = self.bound()?;
        backend.paint(element, frame)
    }

    pub fn paint_mapped(
        &self,
        frame: &DecodedFrame,
        level: WindowLevel,
    ) -> Result<(), SurfaceError> {
        let (backend, element) = self.bound()?;
        backend.paint_mapped(element, frame, level)
    }

    pub fn set_mapping(&self, level: WindowLevel) -> Result<(), SurfaceError> {
        let (backend, element) = self.bound()?;
        backend.set_mapping(element, level)
    }

    pub fn current_mapping(&self) -> Result<WindowLevel, SurfaceError> {
        let (backend, element) = self.bound()?;
        backend.current_mapping(element)
    }

    /// Restore the backend's default mapping for the painted frame.
    pub fn reset(&self) -> Result<WindowLevel, SurfaceError> {
        let (backend, element) = self.bound()?;
        backend.restore_default_mapping(element)
    }

    fn bound(&self) -> Result<(&Arc<B>, &DisplayElement), SurfaceError> {
        match (&self.backend, &self.element) {
            (Some(backend), Some(element)) if self.state.is_enabled() => Ok((backend, element)),
            (_, Some(element)) => Err(SurfaceError::NotBound(element.id)),
            (_, None) => Err(SurfaceError::Backend("no display element".to_owned())),
        }
    }
}
