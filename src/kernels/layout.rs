//! This module contains the layout normalizer: the kernel that guarantees a
//! pixel array handed to the native library is row-major and tightly packed
//! within each row.
//!
//! The native importers take a base pointer plus a single row stride and
//! assume every pixel inside a row is `channels` consecutive samples. Views
//! that break this (channel-sliced, column-subsampled, transposed, flipped)
//! are deep-copied into standard layout. Views that only skip whole rows are
//! passed through untouched, with their row stride forwarded to the native
//! side.

use ndarray::{ArrayViewD, CowArray, IxDyn};

use crate::error::FlifError;
use crate::traits::Element;

//==================================================================================
// 1. Layout Inspection
//==================================================================================

fn check_not_empty(shape: &[usize]) -> Result<(), FlifError> {
    if shape.len() < 2 || shape.iter().any(|&len| len == 0) {
        return Err(FlifError::EmptyImage {
            shape: shape.to_vec(),
        });
    }
    Ok(())
}

fn channels_of(shape: &[usize]) -> usize {
    if shape.len() == 3 {
        shape[2]
    } else {
        1
    }
}

/// Returns true when `view` cannot be handed to the native library as-is.
///
/// Strides of axes with length <= 1 are never stepped and are ignored.
pub fn is_copy_required<T: Element>(view: &ArrayViewD<'_, T>) -> bool {
    let shape = view.shape();
    let strides = view.strides();

    if shape.len() != 2 && shape.len() != 3 {
        return !view.is_standard_layout();
    }

    let (height, width) = (shape[0], shape[1]);
    let channels = channels_of(shape);

    // Innermost axis: consecutive samples.
    let inner = shape.len() - 1;
    if shape[inner] > 1 && strides[inner] != 1 {
        return true;
    }
    // Pixels inside a row: exactly `channels` samples apart.
    if shape.len() == 3 && width > 1 && strides[1] != channels as isize {
        return true;
    }

    if height > 1 {
        let row_stride = strides[0];
        let row_len = (width * channels) as isize;
        if row_stride < row_len {
            return true;
        }
        let row_bytes = row_stride as usize * std::mem::size_of::<T>();
        if row_bytes % channels != 0 {
            return true;
        }
    }

    false
}

//==================================================================================
// 2. Normalization
//==================================================================================

/// Returns `view` unchanged when it already satisfies the native layout
/// contract, or a packed row-major copy otherwise.
///
/// Normalizing an already-normalized array is a no-op: the result borrows the
/// input. Arrays with a zero-length axis are rejected with
/// [`FlifError::EmptyImage`], since `ndarray` gives them all-zero strides.
pub fn normalize<'a, T: Element>(
    view: ArrayViewD<'a, T>,
) -> Result<CowArray<'a, T, IxDyn>, FlifError> {
    check_not_empty(view.shape())?;
    if !is_copy_required(&view) {
        return Ok(CowArray::from(view));
    }

    log::info!(
        "Deep-copying {} image of shape {:?} (strides {:?}) into packed layout",
        T::ELEMENT,
        view.shape(),
        view.strides()
    );
    let packed = view.as_standard_layout().into_owned();

    if is_copy_required(&packed.view()) {
        return Err(FlifError::Internal(format!(
            "Normalization of shape {:?} produced strides {:?}",
            packed.shape(),
            packed.strides()
        )));
    }
    Ok(CowArray::from(packed))
}

//==================================================================================
// 3. Native Row Description
//==================================================================================

/// Dimensions and row stride of a normalized array, as the native importers
/// expect them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeLayout {
    pub width: u32,
    pub height: u32,
    pub channels: usize,
    /// Row stride in bytes divided by the channel count.
    pub row_stride: u32,
}

/// Converts a byte row stride into the unit the native importers take.
///
/// # Panics
/// If `byte_stride` is not a multiple of `channels`. [`normalize`] never
/// produces such an array.
pub fn native_row_stride(byte_stride: usize, channels: usize) -> usize {
    assert!(
        channels > 0 && byte_stride % channels == 0,
        "row stride of {} bytes is not divisible by {} channels",
        byte_stride,
        channels
    );
    byte_stride / channels
}

fn to_u32(value: usize) -> Result<u32, FlifError> {
    u32::try_from(value).map_err(|_| FlifError::DimensionOverflow { value })
}

/// Describes a normalized array for the native import call.
pub fn describe<T: Element>(view: &ArrayViewD<'_, T>) -> Result<NativeLayout, FlifError> {
    let shape = view.shape();
    check_not_empty(shape)?;
    debug_assert!(!is_copy_required(view));

    let (height, width) = (shape[0], shape[1]);
    let channels = channels_of(shape);
    let element_size = std::mem::size_of::<T>();

    let byte_stride = if height > 1 {
        view.strides()[0] as usize * element_size
    } else {
        width * channels * element_size
    };

    Ok(NativeLayout {
        width: to_u32(width)?,
        height: to_u32(height)?,
        channels,
        row_stride: to_u32(native_row_stride(byte_stride, channels))?,
    })
}
