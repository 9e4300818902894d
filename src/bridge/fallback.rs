// In: src/bridge/fallback.rs

//! Generic image I/O for non-FLIF extensions, backed by the `image` crate.

use std::path::Path;

use image::{DynamicImage, ImageBuffer, Luma, Rgb, Rgba};
use ndarray::{Array2, Array3, ArrayViewD};

use crate::error::FlifError;
use crate::traits::Element;
use crate::types::{PixelBuffer, PixelFormat, PixelView};

fn shape_error(e: ndarray::ShapeError) -> FlifError {
    FlifError::Internal(format!("Fallback reshape failed: {}", e))
}

fn gray<T: Element>(width: u32, height: u32, samples: Vec<T>) -> Result<PixelBuffer, FlifError> {
    let array = Array2::from_shape_vec((height as usize, width as usize), samples).map_err(shape_error)?;
    Ok(T::into_buffer(array.into_dyn()))
}

fn color<T: Element>(width: u32, height: u32, channels: usize, samples: Vec<T>) -> Result<PixelBuffer, FlifError> {
    let array = Array3::from_shape_vec((height as usize, width as usize, channels), samples)
        .map_err(shape_error)?;
    Ok(T::into_buffer(array.into_dyn()))
}

/// Reads any format the `image` crate recognizes. Gray, RGB and RGBA keep
/// their layout and bit depth; everything else is converted to RGBA8.
pub fn read_image(path: &Path) -> Result<PixelBuffer, FlifError> {
    let decoded = image::open(path)?;
    let (width, height) = (decoded.width(), decoded.height());
    log::debug!("Read {:?} ({:?}) through the generic fallback", path, decoded.color());

    match decoded {
        DynamicImage::ImageLuma8(buf) => gray(width, height, buf.into_raw()),
        DynamicImage::ImageLuma16(buf) => gray(width, height, buf.into_raw()),
        DynamicImage::ImageRgb8(buf) => color(width, height, 3, buf.into_raw()),
        DynamicImage::ImageRgba8(buf) => color(width, height, 4, buf.into_raw()),
        DynamicImage::ImageRgb16(buf) => color(width, height, 3, buf.into_raw()),
        DynamicImage::ImageRgba16(buf) => color(width, height, 4, buf.into_raw()),
        other => color(width, height, 4, other.to_rgba8().into_raw()),
    }
}

fn packed<T: Element>(view: &ArrayViewD<'_, T>) -> Vec<T> {
    view.iter().copied().collect()
}

/// Writes `pixels` in the format implied by the extension of `path`.
///
/// Accepts the same shapes and element types as the FLIF encoder.
pub fn write_image(path: &Path, pixels: PixelView<'_>) -> Result<(), FlifError> {
    let format = PixelFormat::negotiate(pixels.shape(), pixels.element_type())?;
    let shape = pixels.shape();
    if shape.iter().any(|&len| len == 0) {
        return Err(FlifError::EmptyImage {
            shape: shape.to_vec(),
        });
    }
    let height = u32::try_from(shape[0]).map_err(|_| FlifError::DimensionOverflow { value: shape[0] })?;
    let width = u32::try_from(shape[1]).map_err(|_| FlifError::DimensionOverflow { value: shape[1] })?;
    let mismatch = || FlifError::Internal(format!("Sample count does not match shape {:?}", shape));

    match (format, &pixels) {
        (PixelFormat::Gray8, PixelView::U8(view)) => {
            ImageBuffer::<Luma<u8>, _>::from_raw(width, height, packed(view))
                .ok_or_else(mismatch)?
                .save(path)?
        }
        (PixelFormat::Gray16, PixelView::U16(view)) => {
            ImageBuffer::<Luma<u16>, _>::from_raw(width, height, packed(view))
                .ok_or_else(mismatch)?
                .save(path)?
        }
        (PixelFormat::Rgb8, PixelView::U8(view)) => {
            ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, packed(view))
                .ok_or_else(mismatch)?
                .save(path)?
        }
        (PixelFormat::Rgba8, PixelView::U8(view)) => {
            ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, packed(view))
                .ok_or_else(mismatch)?
                .save(path)?
        }
        _ => {
            return Err(FlifError::Internal(format!(
                "Pixel format {} does not match buffer element type {}",
                format,
                pixels.element_type()
            )))
        }
    }
    log::debug!("Wrote {:?} through the generic fallback", path);
    Ok(())
}
