//! Caller-visible pixel arrays.
//!
//! A frame is an `ndarray` array shaped `(height, width)` for single-channel
//! images or `(height, width, channels)` for multi-channel images, holding
//! `u8` or `u16` samples. `PixelBuffer` owns its samples; `PixelView` borrows
//! them with arbitrary strides.

use ndarray::{Array, ArrayD, ArrayView, ArrayViewD, Dimension};

use crate::types::ElementType;

/// An owned pixel array of either supported sample width.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelBuffer {
    U8(ArrayD<u8>),
    U16(ArrayD<u16>),
}

/// A borrowed pixel array of either supported sample width.
#[derive(Debug, Clone)]
pub enum PixelView<'a> {
    U8(ArrayViewD<'a, u8>),
    U16(ArrayViewD<'a, u16>),
}

impl PixelBuffer {
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::U8(a) => a.shape(),
            Self::U16(a) => a.shape(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            Self::U8(_) => ElementType::U8,
            Self::U16(_) => ElementType::U16,
        }
    }

    /// Samples per pixel: 1 for 2-D arrays, the last axis length otherwise.
    pub fn channels(&self) -> usize {
        channels_of(self.shape())
    }

    pub fn view(&self) -> PixelView<'_> {
        match self {
            Self::U8(a) => PixelView::U8(a.view()),
            Self::U16(a) => PixelView::U16(a.view()),
        }
    }

    pub fn as_u8(&self) -> Option<&ArrayD<u8>> {
        match self {
            Self::U8(a) => Some(a),
            Self::U16(_) => None,
        }
    }

    pub fn as_u16(&self) -> Option<&ArrayD<u16>> {
        match self {
            Self::U16(a) => Some(a),
            Self::U8(_) => None,
        }
    }

    pub fn into_u8(self) -> Option<ArrayD<u8>> {
        match self {
            Self::U8(a) => Some(a),
            Self::U16(_) => None,
        }
    }

    pub fn into_u16(self) -> Option<ArrayD<u16>> {
        match self {
            Self::U16(a) => Some(a),
            Self::U8(_) => None,
        }
    }
}

impl<'a> PixelView<'a> {
    pub fn shape(&self) -> &[usize] {
        match self {
            Self::U8(v) => v.shape(),
            Self::U16(v) => v.shape(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            Self::U8(_) => ElementType::U8,
            Self::U16(_) => ElementType::U16,
        }
    }

    pub fn channels(&self) -> usize {
        channels_of(self.shape())
    }

    /// Copies the viewed samples into an owned buffer.
    pub fn to_buffer(&self) -> PixelBuffer {
        match self {
            Self::U8(v) => PixelBuffer::U8(v.to_owned()),
            Self::U16(v) => PixelBuffer::U16(v.to_owned()),
        }
    }
}

fn channels_of(shape: &[usize]) -> usize {
    if shape.len() == 3 {
        shape[2]
    } else {
        1
    }
}

//==================================================================================
// Conversions from ndarray types
//==================================================================================

macro_rules! impl_pixel_conversions {
    ($T:ty, $tag:ident) => {
        impl<D: Dimension> From<Array<$T, D>> for PixelBuffer {
            fn from(array: Array<$T, D>) -> Self {
                PixelBuffer::$tag(array.into_dyn())
            }
        }

        impl<'a, D: Dimension> From<ArrayView<'a, $T, D>> for PixelView<'a> {
            fn from(view: ArrayView<'a, $T, D>) -> Self {
                PixelView::$tag(view.into_dyn())
            }
        }

        impl<'a, D: Dimension> From<&'a Array<$T, D>> for PixelView<'a> {
            fn from(array: &'a Array<$T, D>) -> Self {
                PixelView::$tag(array.view().into_dyn())
            }
        }
    };
}

impl_pixel_conversions!(u8, U8);
impl_pixel_conversions!(u16, U16);

impl<'a> From<&'a PixelBuffer> for PixelView<'a> {
    fn from(buffer: &'a PixelBuffer) -> Self {
        buffer.view()
    }
}
