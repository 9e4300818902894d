// In: src/error.rs

//! This module defines the single, unified error type for the entire flifio library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Every variant carries enough context (path, shape, index, count) to diagnose a
//! failure without inspecting internal state.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ElementType;

/// Coarse classification of a [`FlifError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// File unwritable/unreadable, native encode/decode failure, session misuse.
    Io,
    /// Unsupported palette images, out-of-range frame indices, bad dimensions.
    Value,
    /// Unsupported array shape/element type combinations.
    Type,
    /// Broken internal invariant; never caused by caller input.
    Internal,
}

#[derive(Error, Debug)]
pub enum FlifError {
    // =========================================================================
    // === Type Errors (format negotiation)
    // =========================================================================
    #[error("Unsupported image: shape {shape:?} with element type {dtype} has no FLIF pixel format")]
    UnsupportedFormat { shape: Vec<usize>, dtype: ElementType },

    // =========================================================================
    // === Value Errors
    // =========================================================================
    #[error("Palette images are not supported (palette size {palette_size})")]
    PaletteUnsupported { palette_size: u32 },

    #[error("Unsupported decoded image: {channels} channel(s) at depth {depth}")]
    UnsupportedDecodedLayout { channels: u8, depth: u8 },

    #[error("Frame index {index} out of range: {count} frame(s) available")]
    FrameIndexOutOfRange { index: usize, count: usize },

    #[error("Image shape {shape:?} is empty")]
    EmptyImage { shape: Vec<usize> },

    #[error("Image dimension {value} exceeds the native 32-bit limit")]
    DimensionOverflow { value: usize },

    // =========================================================================
    // === I/O Errors
    // =========================================================================
    #[error("Cannot open {path:?} for writing: {source}")]
    Unwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error writing FLIF file {path:?}")]
    EncodeFailed { path: PathBuf },

    #[error("Error decoding FLIF file {path:?}")]
    DecodeFailed { path: PathBuf },

    #[error("FLIF file {path:?} not (yet) decoded")]
    NotDecoded { path: PathBuf },

    #[error("FLIF encoder for {path:?} is not open")]
    EncoderNotOpen { path: PathBuf },

    #[error("Error reading image {index}: the decoder returned no image")]
    MissingFrame { index: usize },

    #[error("Native library failed to create {what}")]
    NativeAllocation { what: &'static str },

    #[error("Path {path:?} cannot be passed to the native library")]
    InvalidPath { path: PathBuf },

    #[error("{path:?} is not a FLIF file")]
    NotFlifFile { path: PathBuf },

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library while parsing encoder configuration.
    #[error("Invalid encoder configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// An error from the generic imaging library used for non-FLIF files.
    #[cfg(feature = "fallback")]
    #[error("Generic image I/O failed: {0}")]
    Fallback(#[from] image::ImageError),

    #[error("Internal logic error (this is a bug): {0}")]
    Internal(String),
}

impl FlifError {
    /// Classifies this error as an I/O, value or type error, or an internal bug.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FlifError::UnsupportedFormat { .. } => ErrorKind::Type,
            FlifError::PaletteUnsupported { .. }
            | FlifError::UnsupportedDecodedLayout { .. }
            | FlifError::FrameIndexOutOfRange { .. }
            | FlifError::EmptyImage { .. }
            | FlifError::DimensionOverflow { .. }
            | FlifError::Config(_) => ErrorKind::Value,
            FlifError::Unwritable { .. }
            | FlifError::EncodeFailed { .. }
            | FlifError::DecodeFailed { .. }
            | FlifError::NotDecoded { .. }
            | FlifError::EncoderNotOpen { .. }
            | FlifError::MissingFrame { .. }
            | FlifError::NativeAllocation { .. }
            | FlifError::InvalidPath { .. }
            | FlifError::NotFlifFile { .. }
            | FlifError::Io(_) => ErrorKind::Io,
            #[cfg(feature = "fallback")]
            FlifError::Fallback(_) => ErrorKind::Io,
            FlifError::Internal(_) => ErrorKind::Internal,
        }
    }
}
