//! Software rendering of a windowed frame into an element-sized gray image.

use image::{GrayImage, ImageBuffer, Luma, imageops};
use ndarray::ArrayView2;

use crate::backend::{DecodedFrame, DisplayElement};
use crate::config::CanvasConfig;
use crate::windowing::WindowLevel;

/// What is currently shown on one bound element.
#[derive(Debug)]
pub(crate) struct Canvas {
    element: DisplayElement,
    config: CanvasConfig,
    frame: Option<DecodedFrame>,
    mapping: Option<WindowLevel>,
    image: GrayImage,
}

impl Canvas {
    pub(crate) fn new(element: DisplayElement, config: CanvasConfig) -> Self {
        Self {
            element,
            config,
            frame: None,
            mapping: None,
            image: Self::blank(&element, config.background),
        }
    }

    pub(crate) fn paint(&mut self, frame: &DecodedFrame) {
        self.mapping = Some(frame.default_window);
        self.frame = Some(frame.clone());
        self.redraw();
    }

    /// Paint `frame` already mapped with `level`, rendering once.
    pub(crate) fn paint_mapped(&mut self, frame: &DecodedFrame, level: WindowLevel) {
        self.mapping = Some(level);
        self.frame = Some(frame.clone());
        self.redraw();
    }

    pub(crate) fn mapping(&self) -> Option<WindowLevel> {
        self.mapping
    }

    /// Re-render with `level`. `false` when nothing is painted.
    pub(crate) fn set_mapping(&mut self, level: WindowLevel) -> bool {
        if self.frame.is_none() {
            return false;
        }
        self.mapping = Some(level);
        self.redraw();
        true
    }

    pub(crate) fn restore_default_mapping(&mut self) -> Option<WindowLevel> {
        let default = self.frame.as_ref()?.default_window;
        self.set_mapping(default);
        Some(default)
    }

    pub(crate) fn image(&self) -> &GrayImage {
        &self.image
    }

    fn redraw(&mut self) {
        let (Some(frame), Some(mapping)) = (self.frame.as_ref(), self.mapping) else {
            return;
        };
        let rendered = match Self::frame_to_image(&frame.pixels.view(), mapping) {
            Some(rendered) => rendered,
            None => {
                log::warn!(
                    "Could not render {}x{} frame on element {}",
                    frame.width(),
                    frame.height(),
                    self.element.id
                );
                return;
            }
        };
        self.image = self.letterbox(&rendered);
    }

    fn frame_to_image(pixels: &ArrayView2<'_, f32>, level: WindowLevel) -> Option<GrayImage> {
        let (height, width) = pixels.dim();
        let pixel_data: Vec<u8> = match pixels.as_slice() {
            Some(samples) => level.apply(samples),
            // non-contiguous view
            None => level.apply(&pixels.iter().copied().collect::<Vec<_>>()),
        };
        ImageBuffer::from_raw(width as u32, height as u32, pixel_data)
    }

    /// Scale `rendered` to fit the element, keeping its aspect ratio, and
    /// center it on the background.
    fn letterbox(&self, rendered: &GrayImage) -> GrayImage {
        let mut target = Self::blank(&self.element, self.config.background);
        let (width, height) = fit(rendered.dimensions(), target.dimensions());
        if width == 0 || height == 0 {
            return target;
        }

        let scaled = if (width, height) == rendered.dimensions() {
            rendered.clone()
        } else {
            imageops::resize(rendered, width, height, self.config.filter)
        };
        let x = (target.width() - width) / 2;
        let y = (target.height() - height) / 2;
        imageops::replace(&mut target, &scaled, i64::from(x), i64::from(y));
        target
    }

    fn blank(element: &DisplayElement, background: u8) -> GrayImage {
        ImageBuffer::from_pixel(element.width, element.height, Luma([background]))
    }
}

/// Largest size with the aspect ratio of `source` that fits inside `bounds`.
fn fit(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (sw, sh) = source;
    let (bw, bh) = bounds;
    if sw == 0 || sh == 0 {
        return (0, 0);
    }
    let scale = (bw as f64 / sw as f64).min(bh as f64 / sh as f64);
    let width = ((sw as f64 * scale).round() as u32).clamp(1, bw.max(1));
    let height = ((sh as f64 * scale).round() as u32).clamp(1, bh.max(1));
    (width.min(bw), height.min(bh))
}
