//! # DICOM slice viewer
//!
//! This crate provides the core of an interactive viewer for a stack of
//! single-frame DICOM slices. It does not draw widgets itself. Instead it
//! keeps the viewer state (current slice, display window, errors) and tells
//! the host what to render and which decodes to wait for.
//!
//! The viewer is written against the [`DecodeRenderBackend`] trait. The
//! bundled [`DicomBackend`] decodes local files with the dicom-rs ecosystem
//! and paints into in-memory gray canvases using rayon.
//!
//! Main properties:
//!  - Every decode is cached per locator and concurrent requests for the same
//!    slice share one decode
//!  - Only the most recently requested slice is painted. Late decodes for a
//!    slice the user already scrolled past are dropped
//!  - The display window is taken from the first painted slice of a set and
//!    then stays put while scrolling until the user changes or resets it
//!  - Wheel, keyboard and slider input can never leave the slice bounds
//!
//! DICOM files are assumed to have the following attributes:
//!   - No multiframe (always the first frame is used)
//!   - Monochrome samples (the first sample of each pixel is used)
//!
//! # Examples
//!
//! ## Showing the middle slice of a directory
//!
//! ```no_run
//! # use dicom_slice_viewer::{
//! #     DicomBackend, DisplayElement, SliceSet, SortBy, Viewer, ViewerConfig,
//! # };
//! # async fn run() {
//! let slices = SliceSet::from_directory("dicom", SortBy::NumericName)
//!     .expect("should have found slices in directory");
//! let element = DisplayElement::new(1, 512, 512);
//!
//! let mut viewer = Viewer::new(ViewerConfig::default());
//! let _ = viewer
//!     .initialize(Some(element), async { Ok(DicomBackend::default()) })
//!     .await;
//! let _ = viewer.set_slice_set(slices.clone()).await;
//! if let Some(request) = viewer.go_to(slices.len() / 2) {
//!     let resolution = request.resolve().await;
//!     viewer.complete(resolution);
//! }
//!
//! let image = viewer
//!     .backend()
//!     .and_then(|backend| backend.snapshot(&element))
//!     .expect("should have painted the middle slice");
//! image.save("result.png");
//! # }
//! ```

pub mod backend;
mod canvas;
pub mod config;
pub mod controls;
pub mod decode_engine;
pub mod dicom_backend;
pub mod enums;
pub mod frame_loader;
pub mod message;
pub mod navigation;
pub mod session;
pub mod slice_set;
pub mod surface;
pub mod viewer;
pub mod windowing;

#[cfg(test)]
mod test_support;

pub use backend::{DecodeError, DecodeRenderBackend, DecodedFrame, DisplayElement, SurfaceError};
pub use config::{CanvasConfig, ViewerConfig};
pub use controls::{SliceControls, ViewerView};
pub use dicom_backend::DicomBackend;
pub use enums::{Direction, Key, SortBy, SurfaceState};
pub use message::{Message, Update};
pub use navigation::InputEvent;
pub use session::{SessionEvent, ViewerSession};
pub use slice_set::SliceSet;
pub use viewer::{PaintOutcome, Viewer, ViewerError};
pub use windowing::WindowLevel;
