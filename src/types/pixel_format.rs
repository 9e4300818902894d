//! This module defines the pixel format negotiator: the mapping between an
//! array's (dimensionality, channel count, element width) and the discrete set
//! of pixel layouts the native library can import and export.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::FlifError;
use crate::ffi::{ImageOps, ImportFn, ReadRowFn};

/// The sample width of a pixel buffer.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    U8,
    U16,
}

impl ElementType {
    /// Size of one sample in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
        }
    }

    /// Bit depth as reported by the native library.
    pub fn depth(self) -> u8 {
        match self {
            Self::U8 => 8,
            Self::U16 => 16,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8 => write!(f, "uint8"),
            Self::U16 => write!(f, "uint16"),
        }
    }
}

//==================================================================================
// 1. Encode Side: array descriptor -> native importer
//==================================================================================

/// A pixel layout the native library can import.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Gray8,
    Gray16,
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    /// Selects the pixel format for an array of the given shape and element type.
    ///
    /// | ndim | channels | element types | format |
    /// |---|---|---|---|
    /// | 2 | (1) | u8, u16 | GRAY8 / GRAY16 |
    /// | 3 | 3 | u8 | RGB8 |
    /// | 3 | 4 | u8 | RGBA8 |
    ///
    /// Every other combination is an [`FlifError::UnsupportedFormat`].
    pub fn negotiate(shape: &[usize], dtype: ElementType) -> Result<Self, FlifError> {
        let format = match (shape.len(), shape.get(2).copied(), dtype) {
            (2, _, ElementType::U8) => Some(Self::Gray8),
            (2, _, ElementType::U16) => Some(Self::Gray16),
            (3, Some(3), ElementType::U8) => Some(Self::Rgb8),
            (3, Some(4), ElementType::U8) => Some(Self::Rgba8),
            _ => None,
        };

        match format {
            Some(format) => {
                log::info!("Importing {} image", format);
                Ok(format)
            }
            None => Err(FlifError::UnsupportedFormat {
                shape: shape.to_vec(),
                dtype,
            }),
        }
    }

    /// Number of interleaved samples per pixel.
    pub fn channels(self) -> usize {
        match self {
            Self::Gray8 | Self::Gray16 => 1,
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }

    pub fn element_type(self) -> ElementType {
        match self {
            Self::Gray16 => ElementType::U16,
            Self::Gray8 | Self::Rgb8 | Self::Rgba8 => ElementType::U8,
        }
    }

    /// The native import entry point for this layout.
    pub(crate) fn importer(self, ops: &ImageOps) -> ImportFn {
        match self {
            Self::Gray8 => ops.import_image_gray,
            Self::Gray16 => ops.import_image_gray16,
            Self::Rgb8 => ops.import_image_rgb,
            Self::Rgba8 => ops.import_image_rgba,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gray8 => "GRAY8",
            Self::Gray16 => "GRAY16",
            Self::Rgb8 => "RGB8",
            Self::Rgba8 => "RGBA8",
        };
        f.write_str(name)
    }
}

//==================================================================================
// 2. Decode Side: native image attributes -> row reader
//==================================================================================

/// The row-reading entry point chosen for a decoded image.
///
/// Multi-channel images are always materialized with four samples per pixel;
/// callers drop the padding channels afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowReader {
    Gray8,
    Gray16,
    Rgba8,
    Rgba16,
}

impl RowReader {
    /// Selects the reader for a decoded image's channel count and bit depth.
    pub fn for_image(channels: u8, depth: u8) -> Result<Self, FlifError> {
        match (channels, depth) {
            (1, 8) => Ok(Self::Gray8),
            (1, 16) => Ok(Self::Gray16),
            (2..=4, 8) => Ok(Self::Rgba8),
            (2..=4, 16) => Ok(Self::Rgba16),
            _ => Err(FlifError::UnsupportedDecodedLayout { channels, depth }),
        }
    }

    pub fn element_type(self) -> ElementType {
        match self {
            Self::Gray8 | Self::Rgba8 => ElementType::U8,
            Self::Gray16 | Self::Rgba16 => ElementType::U16,
        }
    }

    /// Samples per pixel written by the native reader.
    pub fn stored_channels(self) -> usize {
        match self {
            Self::Gray8 | Self::Gray16 => 1,
            Self::Rgba8 | Self::Rgba16 => 4,
        }
    }

    pub(crate) fn function(self, ops: &ImageOps) -> ReadRowFn {
        match self {
            Self::Gray8 => ops.read_row_gray8,
            Self::Gray16 => ops.read_row_gray16,
            Self::Rgba8 => ops.read_row_rgba8,
            Self::Rgba16 => ops.read_row_rgba16,
        }
    }
}
