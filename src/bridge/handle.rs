// In: src/bridge/handle.rs

//! Owning and borrowed wrappers around the native `FLIF_IMAGE` handle.
//!
//! - [`EncoderImage`] is created from caller pixels (negotiate, normalize,
//!   import) and destroys its handle on drop unless it was moved into an
//!   encoder.
//! - [`DecodedFrame`] is a view of a frame owned by an open decoder. It is
//!   never destroyed by this layer; the borrow keeps it from outliving the
//!   decoder.

use std::ffi::c_void;
use std::marker::PhantomData;
use std::ptr::NonNull;

use ndarray::{s, Array2, Array3, ArrayD, ArrayViewD, CowArray, IxDyn};
use serde::Serialize;

use crate::error::FlifError;
use crate::ffi::{FlifApi, FlifImage};
use crate::kernels::layout::{self, NativeLayout};
use crate::traits::Element;
use crate::types::{ElementType, PixelBuffer, PixelFormat, PixelView, RowReader};

/// Attributes of a native image as reported by the library.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub depth: u8,
    pub palette_size: u32,
}

fn query_info(api: &FlifApi, image: NonNull<FlifImage>) -> ImageInfo {
    let ops = &api.image;
    let ptr = image.as_ptr();
    // SAFETY: `image` is a live handle owned by the caller or its decoder.
    unsafe {
        ImageInfo {
            width: (ops.get_width)(ptr),
            height: (ops.get_height)(ptr),
            channels: (ops.get_nb_channels)(ptr),
            depth: (ops.get_depth)(ptr),
            palette_size: (ops.get_palette_size)(ptr),
        }
    }
}

//==================================================================================
// 1. Encode Path
//==================================================================================

/// The normalized samples an imported handle was built from.
#[derive(Debug)]
enum PackedPixels<'a> {
    U8(CowArray<'a, u8, IxDyn>),
    U16(CowArray<'a, u16, IxDyn>),
}

/// A native image imported from caller pixels, ready to be added to an
/// [`Encoder`](crate::bridge::Encoder).
#[derive(Debug)]
pub struct EncoderImage<'a> {
    api: &'static FlifApi,
    /// `None` once ownership has moved to an encoder.
    handle: Option<NonNull<FlifImage>>,
    format: PixelFormat,
    layout: NativeLayout,
    _pixels: PackedPixels<'a>,
}

impl<'a> EncoderImage<'a> {
    /// Negotiates the pixel format, packs the array if needed and imports it.
    ///
    /// Shape, element type and emptiness are validated before any native call.
    pub fn new(api: &'static FlifApi, pixels: impl Into<PixelView<'a>>) -> Result<Self, FlifError> {
        let pixels = pixels.into();
        let format = PixelFormat::negotiate(pixels.shape(), pixels.element_type())?;
        match pixels {
            PixelView::U8(view) => Self::import(api, format, view, PackedPixels::U8),
            PixelView::U16(view) => Self::import(api, format, view, PackedPixels::U16),
        }
    }

    fn import<T: Element>(
        api: &'static FlifApi,
        format: PixelFormat,
        view: ArrayViewD<'a, T>,
        wrap: fn(CowArray<'a, T, IxDyn>) -> PackedPixels<'a>,
    ) -> Result<Self, FlifError> {
        let packed = layout::normalize(view)?;
        let native = layout::describe(&packed.view())?;
        let importer = format.importer(&api.image);

        // SAFETY: `packed` holds `height` rows of `width * channels` samples,
        // rows starting `row_stride * channels` bytes apart, and stays alive
        // as long as the handle.
        let raw = unsafe {
            importer(
                native.width,
                native.height,
                packed.as_ptr() as *const c_void,
                native.row_stride,
            )
        };
        let handle = NonNull::new(raw).ok_or(FlifError::NativeAllocation { what: "image" })?;
        log::debug!(
            "Imported {} image {}x{} as {:p}",
            format,
            native.width,
            native.height,
            handle
        );

        Ok(Self {
            api,
            handle: Some(handle),
            format,
            layout: native,
            _pixels: wrap(packed),
        })
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.layout.width
    }

    pub fn height(&self) -> u32 {
        self.layout.height
    }

    /// Attributes as reported by the native image.
    pub fn info(&self) -> Result<ImageInfo, FlifError> {
        Ok(query_info(self.api, self.raw()?))
    }

    pub(crate) fn raw(&self) -> Result<NonNull<FlifImage>, FlifError> {
        self.handle
            .ok_or_else(|| FlifError::Internal("image handle used after move".to_string()))
    }

    /// Releases ownership of the native handle to the caller, which becomes
    /// responsible for destroying it.
    pub(crate) fn into_raw(mut self) -> Result<NonNull<FlifImage>, FlifError> {
        self.handle
            .take()
            .ok_or_else(|| FlifError::Internal("image handle moved twice".to_string()))
    }
}

impl Drop for EncoderImage<'_> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            log::debug!("Destroying FLIF image {:p}", handle);
            // SAFETY: the handle was created by an importer and is still owned here.
            unsafe { (self.api.image.destroy_image)(handle.as_ptr()) };
        }
    }
}

//==================================================================================
// 2. Decode Path
//==================================================================================

/// A frame owned by an open [`Decoder`](crate::bridge::Decoder).
#[derive(Debug)]
pub struct DecodedFrame<'d> {
    api: &'static FlifApi,
    handle: NonNull<FlifImage>,
    index: usize,
    _decoder: PhantomData<&'d ()>,
}

impl<'d> DecodedFrame<'d> {
    pub(crate) fn new(api: &'static FlifApi, handle: NonNull<FlifImage>, index: usize) -> Self {
        Self {
            api,
            handle,
            index,
            _decoder: PhantomData,
        }
    }

    /// Position of this frame in the decoded file.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn info(&self) -> ImageInfo {
        query_info(self.api, self.handle)
    }

    pub fn width(&self) -> u32 {
        self.info().width
    }

    pub fn height(&self) -> u32 {
        self.info().height
    }

    pub fn channels(&self) -> u8 {
        self.info().channels
    }

    pub fn depth(&self) -> u8 {
        self.info().depth
    }

    pub fn palette_size(&self) -> u32 {
        self.info().palette_size
    }

    /// Copies the frame into a freshly allocated array.
    ///
    /// Single-channel frames come back as `(height, width)`; all others as
    /// `(height, width, channels)`.
    pub fn to_pixels(&self) -> Result<PixelBuffer, FlifError> {
        let info = self.info();
        if info.palette_size != 0 {
            return Err(FlifError::PaletteUnsupported {
                palette_size: info.palette_size,
            });
        }
        let reader = RowReader::for_image(info.channels, info.depth)?;
        match reader.element_type() {
            ElementType::U8 => self.read_rows::<u8>(reader, &info),
            ElementType::U16 => self.read_rows::<u16>(reader, &info),
        }
    }

    fn read_rows<T: Element>(&self, reader: RowReader, info: &ImageInfo) -> Result<PixelBuffer, FlifError> {
        let height = info.height as usize;
        let width = info.width as usize;
        let stored = reader.stored_channels();
        let row_len = width * stored;

        let mut samples = vec![T::zero(); height * row_len];
        if row_len > 0 {
            let read_row = reader.function(&self.api.image);
            let row_bytes = row_len * std::mem::size_of::<T>();
            for (y, row) in samples.chunks_exact_mut(row_len).enumerate() {
                // SAFETY: `row` is exactly `row_bytes` long and the frame is kept
                // alive by the decoder borrow.
                unsafe {
                    read_row(
                        self.handle.as_ptr(),
                        y as u32,
                        row.as_mut_ptr() as *mut c_void,
                        row_bytes,
                    )
                };
            }
        }

        let shape_error = |e: ndarray::ShapeError| FlifError::Internal(format!("Frame reshape failed: {}", e));
        let pixels: ArrayD<T> = if stored == 1 {
            Array2::from_shape_vec((height, width), samples)
                .map_err(shape_error)?
                .into_dyn()
        } else {
            let full = Array3::from_shape_vec((height, width, stored), samples).map_err(shape_error)?;
            let channels = info.channels as usize;
            if channels == stored {
                full.into_dyn()
            } else {
                // The reader always materializes four channels.
                full.slice(s![.., .., ..channels]).to_owned().into_dyn()
            }
        };
        Ok(T::into_buffer(pixels))
    }
}
