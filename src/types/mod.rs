//! This module defines the core, strongly-typed pixel representations used
//! throughout the binding layer.
//!
//! It includes the pixel format negotiator (`PixelFormat`, `RowReader`) and the
//! caller-visible buffer types (`PixelBuffer`, `PixelView`) built on `ndarray`.

pub mod pixel_buffer;
pub mod pixel_format;

// Re-export the main type(s) for easier access.
pub use pixel_buffer::{PixelBuffer, PixelView};
pub use pixel_format::{ElementType, PixelFormat, RowReader};
