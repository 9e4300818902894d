//! This file is the root of the `flifio` Rust crate.
//!
//! flifio moves `ndarray` pixel buffers in and out of the FLIF image format
//! through the native `libflif` C ABI. Its responsibilities here are limited to
//! declaring the modules and re-exporting the public surface.
//!
//! ```no_run
//! # #[cfg(feature = "system")]
//! # fn demo() -> Result<(), flifio::FlifError> {
//! let pixels = ndarray::Array3::<u8>::zeros((32, 48, 4));
//! flifio::imwrite("out.flif", &pixels)?;
//! let back = flifio::imread("out.flif")?;
//! assert_eq!(back.shape(), &[32, 48, 4]);
//! # Ok(())
//! # }
//! ```

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod bridge;
pub mod config;
pub mod ffi;
pub mod kernels;
pub mod logging;
pub mod types;

mod error;
mod traits;

//==================================================================================
// 2. Public Surface
//==================================================================================
pub use bridge::{
    is_flif_path, read_image_with, read_images_with, write_image_with, write_images_with,
    DecodedFrame, Decoder, Encoder, EncoderImage, ImageInfo,
};
#[cfg(feature = "system")]
pub use bridge::{imread, imwrite};
pub use config::{EncoderConfig, EncoderSettings};
pub use error::{ErrorKind, FlifError};
pub use ffi::FlifApi;
pub use logging::enable_verbose_logging;
pub use traits::Element;
pub use types::{ElementType, PixelBuffer, PixelFormat, PixelView};
