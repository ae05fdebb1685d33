//! The decode/render capability the viewer is written against.
//!
//! Any concrete volumetric-image backend can be plugged in by implementing
//! [`DecodeRenderBackend`]. The viewer never talks to a concrete type.

use std::future::Future;

use ndarray::Array2;
use thiserror::Error;

use crate::windowing::WindowLevel;

/// An on-screen element a surface can be bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DisplayElement {
    pub id: u64,
    pub width: u32,
    pub height: u32,
}

impl DisplayElement {
    pub fn new(id: u64, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }
}

/// One decoded slice.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    /// Modality-rescaled samples, indexed `[row, column]`
    pub pixels: Array2<f32>,
    /// Window recommended by the frame's own metadata
    pub default_window: WindowLevel,
}

impl DecodedFrame {
    pub fn new(pixels: Array2<f32>, default_window: WindowLevel) -> Self {
        Self {
            pixels,
            default_window,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.ncols() as u32
    }

    pub fn height(&self) -> u32 {
        self.pixels.nrows() as u32
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{locator}: resource is unreachable ({reason})")]
    Unreachable { locator: String, reason: String },

    #[error("{locator}: malformed image ({reason})")]
    Malformed { locator: String, reason: String },

    #[error("{locator}: unsupported encoding ({reason})")]
    Unsupported { locator: String, reason: String },
}

impl DecodeError {
    pub fn locator(&self) -> &str {
        match self {
            DecodeError::Unreachable { locator, .. }
            | DecodeError::Malformed { locator, .. }
            | DecodeError::Unsupported { locator, .. } => locator,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("element {0} is already bound")]
    AlreadyBound(u64),

    #[error("element {0} is not mounted yet")]
    NotMounted(u64),

    #[error("element {0} is not bound")]
    NotBound(u64),

    #[error("nothing has been painted on element {0}")]
    NothingPainted(u64),

    #[error("surface backend failure: {0}")]
    Backend(String),
}

/// Decode and paint operations for one kind of image source.
///
/// Decoding must be safe to run concurrently for different locators.
pub trait DecodeRenderBackend: Send + Sync + 'static {
    fn decode_frame(
        &self,
        locator: &str,
    ) -> impl Future<Output = Result<DecodedFrame, DecodeError>> + Send;

    fn is_bound(&self, element: &DisplayElement) -> bool;

    fn bind_surface(&self, element: &DisplayElement) -> Result<(), SurfaceError>;

    fn unbind_surface(&self, element: &DisplayElement) -> Result<(), SurfaceError>;

    /// Display `frame`, mapped with the frame's default window.
    fn paint(&self, element: &DisplayElement, frame: &DecodedFrame) -> Result<(), SurfaceError>;

    /// Display `frame` mapped with `level`. The frame's default window stays
    /// what [`restore_default_mapping`](Self::restore_default_mapping) returns.
    fn paint_mapped(
        &self,
        element: &DisplayElement,
        frame: &DecodedFrame,
        level: WindowLevel,
    ) -> Result<(), SurfaceError> {
        self.paint(element, frame)?;
        self.set_mapping(element, level)
    }

    fn current_mapping(&self, element: &DisplayElement) -> Result<WindowLevel, SurfaceError>;

    fn set_mapping(&self, element: &DisplayElement, level: WindowLevel)
    -> Result<(), SurfaceError>;

    /// Restore the painted frame's default window and return it.
    fn restore_default_mapping(
        &self,
        element: &DisplayElement,
    ) -> Result<WindowLevel, SurfaceError>;
}
