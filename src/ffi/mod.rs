//! This module defines the native call table: the typed C-ABI entry points of the
//! FLIF library, grouped into image, encoder and decoder namespaces.
//!
//! A [`FlifApi`] is an immutable struct of function pointers. It is built once
//! (see [`FlifApi::system`] with the `system` feature) and shared by `&'static`
//! reference with every session and image handle. No component mutates it after
//! construction, so it is safe to share across threads; the handles it operates
//! on are not.

use std::ffi::{c_char, c_void, CString};
use std::path::Path;

use crate::error::FlifError;

#[cfg(feature = "system")]
mod system;

#[cfg(test)]
pub(crate) mod mock;

//==================================================================================
// 1. Opaque Native Handles
//==================================================================================

/// Opaque native image (`FLIF_IMAGE`).
#[repr(C)]
pub struct FlifImage {
    _private: [u8; 0],
}

/// Opaque native encoder (`FLIF_ENCODER`).
#[repr(C)]
pub struct FlifEncoder {
    _private: [u8; 0],
}

/// Opaque native decoder (`FLIF_DECODER`).
#[repr(C)]
pub struct FlifDecoder {
    _private: [u8; 0],
}

//==================================================================================
// 2. Function Pointer Signatures
//==================================================================================

/// `(width, height, pixels, row_stride) -> image`
pub type ImportFn = unsafe extern "C" fn(u32, u32, *const c_void, u32) -> *mut FlifImage;

/// `(image, row, destination, destination_bytes)`
pub type ReadRowFn = unsafe extern "C" fn(*mut FlifImage, u32, *mut c_void, usize);

//==================================================================================
// 3. Sub-Tables
//==================================================================================

/// Image attribute queries, importers, row readers and destruction.
#[derive(Clone, Copy)]
pub struct ImageOps {
    pub get_width: unsafe extern "C" fn(*mut FlifImage) -> u32,
    pub get_height: unsafe extern "C" fn(*mut FlifImage) -> u32,
    pub get_nb_channels: unsafe extern "C" fn(*mut FlifImage) -> u8,
    pub get_depth: unsafe extern "C" fn(*mut FlifImage) -> u8,
    pub get_palette_size: unsafe extern "C" fn(*mut FlifImage) -> u32,

    pub import_image_rgba: ImportFn,
    pub import_image_rgb: ImportFn,
    pub import_image_gray: ImportFn,
    pub import_image_gray16: ImportFn,

    pub read_row_gray8: ReadRowFn,
    pub read_row_gray16: ReadRowFn,
    pub read_row_rgba8: ReadRowFn,
    pub read_row_rgba16: ReadRowFn,

    pub destroy_image: unsafe extern "C" fn(*mut FlifImage),
}

/// Encoder lifecycle, configuration and image submission.
#[derive(Clone, Copy)]
pub struct EncoderOps {
    pub create_encoder: unsafe extern "C" fn() -> *mut FlifEncoder,
    pub encode_file: unsafe extern "C" fn(*mut FlifEncoder, *const c_char) -> i32,
    pub destroy_encoder: unsafe extern "C" fn(*mut FlifEncoder),

    /// The encoder keeps its own reference; the caller still owns the image.
    pub add_image: unsafe extern "C" fn(*mut FlifEncoder, *mut FlifImage),
    /// The encoder takes ownership of the image.
    pub add_image_move: unsafe extern "C" fn(*mut FlifEncoder, *mut FlifImage),

    pub set_interlaced: unsafe extern "C" fn(*mut FlifEncoder, u32),
    pub set_learn_repeat: unsafe extern "C" fn(*mut FlifEncoder, u32),
    pub set_split_threshold: unsafe extern "C" fn(*mut FlifEncoder, i32),
    pub set_crc_check: unsafe extern "C" fn(*mut FlifEncoder, u32),
    pub set_lossy: unsafe extern "C" fn(*mut FlifEncoder, i32),
}

/// Decoder lifecycle and frame access. Frames stay owned by the decoder.
#[derive(Clone, Copy)]
pub struct DecoderOps {
    pub create_decoder: unsafe extern "C" fn() -> *mut FlifDecoder,
    pub decode_file: unsafe extern "C" fn(*mut FlifDecoder, *const c_char) -> i32,
    pub set_crc_check: unsafe extern "C" fn(*mut FlifDecoder, u32),
    pub num_images: unsafe extern "C" fn(*mut FlifDecoder) -> usize,
    pub get_image: unsafe extern "C" fn(*mut FlifDecoder, usize) -> *mut FlifImage,
    pub destroy_decoder: unsafe extern "C" fn(*mut FlifDecoder),
}

/// The complete, resolved native call table.
#[derive(Clone, Copy)]
pub struct FlifApi {
    pub image: ImageOps,
    pub encoder: EncoderOps,
    pub decoder: DecoderOps,
}

impl std::fmt::Debug for FlifApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlifApi").finish_non_exhaustive()
    }
}

//==================================================================================
// 4. Argument Conversion
//==================================================================================

/// Converts a filesystem path into the narrow C string the native file
/// functions take.
pub(crate) fn path_to_cstring(path: &Path) -> Result<CString, FlifError> {
    let invalid = || FlifError::InvalidPath {
        path: path.to_path_buf(),
    };

    #[cfg(unix)]
    let bytes = {
        use std::os::unix::ffi::OsStrExt;
        path.as_os_str().as_bytes().to_vec()
    };
    #[cfg(not(unix))]
    let bytes = path.to_str().ok_or_else(invalid)?.as_bytes().to_vec();

    CString::new(bytes).map_err(|_| invalid())
}
