// In: src/bridge/stateless_api.rs

//! One-call read/write helpers that pick the FLIF codec or the generic
//! fallback from the file extension.

use std::path::Path;

use crate::bridge::decoder::Decoder;
use crate::bridge::encoder::Encoder;
use crate::config::EncoderConfig;
use crate::error::FlifError;
use crate::ffi::FlifApi;
use crate::types::{PixelBuffer, PixelView};

/// True when `path` has a `.flif` extension, in any letter case.
pub fn is_flif_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("flif"))
}

/// Writes a single image with the default encoder configuration.
pub fn write_image_with<'a>(
    api: &'static FlifApi,
    path: impl AsRef<Path>,
    pixels: impl Into<PixelView<'a>>,
) -> Result<(), FlifError> {
    let path = path.as_ref();
    let pixels = pixels.into();
    if is_flif_path(path) {
        return Encoder::scoped(api, path, &EncoderConfig::default(), |encoder| {
            encoder.add_pixels(pixels)
        });
    }
    write_fallback(path, pixels)
}

/// Reads the first frame of a file.
pub fn read_image_with(api: &'static FlifApi, path: impl AsRef<Path>) -> Result<PixelBuffer, FlifError> {
    let path = path.as_ref();
    if is_flif_path(path) {
        return Decoder::scoped(api, path, |decoder| decoder.get_image(0));
    }
    read_fallback(path)
}

/// Writes every frame of an animation, in order, with `config`.
///
/// Non-FLIF targets accept exactly one frame.
pub fn write_images_with<'a, I>(
    api: &'static FlifApi,
    path: impl AsRef<Path>,
    frames: I,
    config: &EncoderConfig,
) -> Result<(), FlifError>
where
    I: IntoIterator,
    I::Item: Into<PixelView<'a>>,
{
    let path = path.as_ref();
    if is_flif_path(path) {
        return Encoder::scoped(api, path, config, |encoder| {
            frames
                .into_iter()
                .try_for_each(|frame| encoder.add_pixels(frame))
        });
    }

    let mut frames = frames.into_iter();
    match (frames.next(), frames.next()) {
        (Some(frame), None) => write_fallback(path, frame.into()),
        _ => Err(FlifError::NotFlifFile {
            path: path.to_path_buf(),
        }),
    }
}

/// Reads every frame of a file, in order.
pub fn read_images_with(api: &'static FlifApi, path: impl AsRef<Path>) -> Result<Vec<PixelBuffer>, FlifError> {
    let path = path.as_ref();
    if is_flif_path(path) {
        return Decoder::scoped(api, path, |decoder| decoder.read_all());
    }
    read_fallback(path).map(|image| vec![image])
}

//==================================================================================
// System Library Entry Points
//==================================================================================

/// Writes `pixels` to `path` using the system `libflif`.
#[cfg(feature = "system")]
pub fn imwrite<'a>(path: impl AsRef<Path>, pixels: impl Into<PixelView<'a>>) -> Result<(), FlifError> {
    write_image_with(FlifApi::system(), path, pixels)
}

/// Reads the first frame of `path` using the system `libflif`.
#[cfg(feature = "system")]
pub fn imread(path: impl AsRef<Path>) -> Result<PixelBuffer, FlifError> {
    read_image_with(FlifApi::system(), path)
}

//==================================================================================
// Generic Fallback
//==================================================================================

#[cfg(feature = "fallback")]
fn write_fallback(path: &Path, pixels: PixelView<'_>) -> Result<(), FlifError> {
    crate::bridge::fallback::write_image(path, pixels)
}

#[cfg(not(feature = "fallback"))]
fn write_fallback(path: &Path, _pixels: PixelView<'_>) -> Result<(), FlifError> {
    Err(FlifError::NotFlifFile {
        path: path.to_path_buf(),
    })
}

#[cfg(feature = "fallback")]
fn read_fallback(path: &Path) -> Result<PixelBuffer, FlifError> {
    crate::bridge::fallback::read_image(path)
}

#[cfg(not(feature = "fallback"))]
fn read_fallback(path: &Path) -> Result<PixelBuffer, FlifError> {
    Err(FlifError::NotFlifFile {
        path: path.to_path_buf(),
    })
}
