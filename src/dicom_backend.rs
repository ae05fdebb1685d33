//! [`DecodeRenderBackend`] for DICOM files on the local file system, painting
//! into in-memory gray canvases.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use image::GrayImage;

use crate::backend::{DecodeError, DecodeRenderBackend, DecodedFrame, DisplayElement, SurfaceError};
use crate::canvas::Canvas;
use crate::config::CanvasConfig;
use crate::frame_loader::FrameLoader;
use crate::windowing::WindowLevel;

#[derive(Debug, Default)]
pub struct DicomBackend {
    config: CanvasConfig,
    canvases: Mutex<HashMap<u64, Canvas>>,
}

impl DicomBackend {
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            config,
            canvases: Mutex::new(HashMap::new()),
        }
    }

    /// Copy of what is currently shown on `element`.
    pub fn snapshot(&self, element: &DisplayElement) -> Option<GrayImage> {
        self.canvases().get(&element.id).map(|canvas| canvas.image().clone())
    }

    fn canvases(&self) -> MutexGuard<'_, HashMap<u64, Canvas>> {
        self.canvases.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_canvas<T>(
        &self,
        element: &DisplayElement,
        f: impl FnOnce(&mut Canvas) -> Result<T, SurfaceError>,
    ) -> Result<T, SurfaceError> {
        let mut canvases = self.canvases();
        let canvas = canvases
            .get_mut(&element.id)
            .ok_or(SurfaceError::NotBound(element.id))?;
        f(canvas)
    }
}

impl DecodeRenderBackend for DicomBackend {
    fn decode_frame(
        &self,
        locator: &str,
    ) -> impl Future<Output = Result<DecodedFrame, DecodeError>> + Send {
        let locator = locator.to_owned();
        async move {
            let task_locator = locator.clone();
            let loaded = tokio::task::spawn_blocking(move || {
                FrameLoader::load(&task_locator)
                    .map_err(|err| err.into_decode_error(&task_locator))
            })
            .await;

            match loaded {
                Ok(result) => result,
                Err(join_error) => Err(DecodeError::Malformed {
                    locator,
                    reason: join_error.to_string(),
                }),
            }
        }
    }

    fn is_bound(&self, element: &DisplayElement) -> bool {
        self.canvases().contains_key(&element.id)
    }

    fn bind_surface(&self, element: &DisplayElement) -> Result<(), SurfaceError> {
        if element.width == 0 || element.height == 0 {
            return Err(SurfaceError::NotMounted(element.id));
        }
        let mut canvases = self.canvases();
        if canvases.contains_key(&element.id) {
            return Err(SurfaceError::AlreadyBound(element.id));
        }
        canvases.insert(element.id, Canvas::new(*element, self.config));
        log::debug!(
            "Bound canvas {}x{} to element {}",
            element.width,
            element.height,
            element.id
        );
        Ok(())
    }

    fn unbind_surface(&self, element: &DisplayElement) -> Result<(), SurfaceError> {
        self.canvases()
            .remove(&element.id)
            .map(|_| ())
            .ok_or(SurfaceError::NotBound(element.id))
    }

    fn paint(&self, element: &DisplayElement, frame: &DecodedFrame) -> Result<(), SurfaceError> {
        self.with_canvas(element, |canvas| {
            canvas.paint(frame);
            Ok(())
        })
    }

    fn paint_mapped(
        &self,
        element: &DisplayElement,
        frame: &DecodedFrame,
        level: WindowLevel,
    ) -> Result<(), SurfaceError> {
        self.with_canvas(element, |canvas| {
            canvas.paint_mapped(frame, level);
            Ok(())
        })
    }

    fn current_mapping(&self, element: &DisplayElement) -> Result<WindowLevel, SurfaceError> {
        self.with_canvas(element, |canvas| {
            canvas
                .mapping()
                .ok_or(SurfaceError::NothingPainted(element.id))
        })
    }

    fn set_mapping(
        &self,
        element: &DisplayElement,
        level: WindowLevel,
    ) -> Result<(), SurfaceError> {
        self.with_canvas(element, |canvas| {
            if canvas.set_mapping(level) {
                Ok(())
            } else {
                Err(SurfaceError::NothingPainted(element.id))
            }
        })
    }

    fn restore_default_mapping(
        &self,
        element: &DisplayElement,
    ) -> Result<WindowLevel, SurfaceError> {
        self.with_canvas(element, |canvas| {
            canvas
                .restore_default_mapping()
                .ok_or(SurfaceError::NothingPainted(element.id))
        })
    }
}
