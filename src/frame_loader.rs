use std::path::Path;

use dicom::{
    object::{FileDicomObject, InMemDicomObject, open_file},
    pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder},
};
use dicom_dictionary_std::tags;
use ndarray::{Array2, Array4, s};
use thiserror::Error;

use crate::backend::{DecodeError, DecodedFrame};
use crate::windowing::WindowLevel;

const WADO_URI_SCHEME: &str = "wadouri:";

#[derive(Debug, Error)]
pub enum FrameLoadError {
    #[error("remote locators are not supported")]
    Remote,

    #[error("DICOM error: {0}")]
    Dicom(#[from] dicom::object::ReadError),

    #[error("pixel data error: {0}")]
    PixelData(#[from] dicom::pixeldata::Error),

    #[error("frame has no pixels")]
    Empty,
}

impl FrameLoadError {
    pub(crate) fn into_decode_error(self, locator: &str) -> DecodeError {
        let locator = locator.to_owned();
        let reason = self.to_string();
        match self {
            FrameLoadError::Remote => DecodeError::Unsupported { locator, reason },
            FrameLoadError::Dicom(dicom::object::ReadError::OpenFile { .. }) => {
                DecodeError::Unreachable { locator, reason }
            }
            FrameLoadError::PixelData(_) => DecodeError::Unsupported { locator, reason },
            FrameLoadError::Dicom(_) | FrameLoadError::Empty => {
                DecodeError::Malformed { locator, reason }
            }
        }
    }
}

/// Loads single-frame DICOM files into [`DecodedFrame`]s.
pub struct FrameLoader;

impl FrameLoader {
    /// Turn a locator into a file path. `wadouri:` prefixes are stripped.
    pub fn resolve_locator(locator: &str) -> Result<&Path, FrameLoadError> {
        let path = locator.strip_prefix(WADO_URI_SCHEME).unwrap_or(locator);
        if path.starts_with("http://") || path.starts_with("https://") {
            return Err(FrameLoadError::Remote);
        }
        Ok(Path::new(path))
    }

    /// Load the first frame of the file behind `locator`.
    pub fn load(locator: &str) -> Result<DecodedFrame, FrameLoadError> {
        let path = Self::resolve_locator(locator)?;
        let object = open_file(path)?;
        Self::from_dicom_object(&object)
    }

    pub fn from_dicom_object(
        dicom_object: &FileDicomObject<InMemDicomObject>,
    ) -> Result<DecodedFrame, FrameLoadError> {
        let pixels = Self::decode_image(dicom_object)?;
        let default_window = Self::get_window(dicom_object)
            .unwrap_or_else(|| Self::window_from_pixels(&pixels));
        Ok(DecodedFrame::new(pixels, default_window))
    }

    fn decode_image(
        dicom_object: &FileDicomObject<InMemDicomObject>,
    ) -> Result<Array2<f32>, FrameLoadError> {
        let pixel_data = dicom_object.decode_pixel_data()?;
        let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::Default);
        let array = pixel_data.to_ndarray_with_options::<f32>(&options)?;
        Self::first_frame(array)
    }

    /// First frame, first sample of a `[frame, row, column, sample]` array.
    fn first_frame(array: Array4<f32>) -> Result<Array2<f32>, FrameLoadError> {
        let (frames, rows, columns, samples) = array.dim();
        if frames == 0 || rows == 0 || columns == 0 || samples == 0 {
            return Err(FrameLoadError::Empty);
        }
        Ok(array.slice_move(s![0, .., .., 0]))
    }

    /// First window stored in the object, if any.
    fn get_window(dicom_object: &FileDicomObject<InMemDicomObject>) -> Option<WindowLevel> {
        let center = dicom_object
            .element(tags::WINDOW_CENTER)
            .ok()?
            .to_multi_float64()
            .ok()?;
        let width = dicom_object
            .element(tags::WINDOW_WIDTH)
            .ok()?
            .to_multi_float64()
            .ok()?;

        match (width.first(), center.first()) {
            (Some(&width), Some(&center)) if width > 0.0 => Some(WindowLevel::new(width, center)),
            _ => None,
        }
    }

    fn window_from_pixels(pixels: &Array2<f32>) -> WindowLevel {
        let (min, max) = pixels
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &v| {
                (min.min(v), max.max(v))
            });
        WindowLevel::from_range(min as f64, max as f64)
    }
}
