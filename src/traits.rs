//! This module defines shared traits used across the pixel pipeline.

use bytemuck::Pod;
use ndarray::ArrayD;
use num_traits::Zero;

use crate::types::{ElementType, PixelBuffer};

/// A pixel sample type the native library can import or export.
///
/// Links a primitive integer to its [`ElementType`] tag and to the matching
/// variant of [`PixelBuffer`].
pub trait Element: Pod + Zero + std::fmt::Debug + Send + Sync + 'static {
    const ELEMENT: ElementType;

    fn into_buffer(array: ArrayD<Self>) -> PixelBuffer;
}

// Implement the trait for the two sample widths the native library defines.
macro_rules! impl_element {
    ($T:ty, $tag:ident) => {
        impl Element for $T {
            const ELEMENT: ElementType = ElementType::$tag;

            fn into_buffer(array: ArrayD<Self>) -> PixelBuffer {
                PixelBuffer::$tag(array)
            }
        }
    };
}

impl_element!(u8, U8);
impl_element!(u16, U16);
