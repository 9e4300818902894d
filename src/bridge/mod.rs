// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the public face of flifio. It turns caller pixel arrays into
// native FLIF images and back, and owns every native handle it creates so that
// each one is released exactly once on every exit path.
//
// Data Flow (Encode):
//
//   1. [Stateless API (write_image_with)]  -> Receives a path and a `PixelView`
//         |
//         `-> `.flif`? otherwise -> generic fallback / NotFlifFile
//
//   2. [Encoder Session (Encoder::scoped)] -> open: writability check, create, configure
//         |
//         `-> a. `PixelFormat::negotiate` picks the native importer
//         |
//         `-> b. `kernels::layout::normalize` packs the rows if needed
//         |
//         `-> c. `EncoderImage` imports and is moved into the encoder
//
//   3. [finalize | abandon]                 -> encode_file on success, destroy always
//
//
// Data Flow (Decode):
//
//   1. [Decoder Session (Decoder::open)]    -> create, enable CRC, decode whole file
//         |
//         `-> `num_images` / `frame(i)` bounds-checked against the native count
//
//   2. [DecodedFrame::to_pixels]            -> `RowReader` chosen from channels/depth,
//         |                                    rows streamed into a fresh array
//         `-> padding channels dropped for 2- and 3-channel frames
//
//   3. [close]                              -> destroy decoder (frames go with it)
//
// ====================================================================================
pub mod decoder;
pub mod encoder;
#[cfg(feature = "fallback")]
pub mod fallback;
pub mod handle;
pub mod stateless_api;

// --- Sessions and Handles ---
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use handle::{DecodedFrame, EncoderImage, ImageInfo};

// --- One-Call Helpers ---
pub use stateless_api::{
    is_flif_path, read_image_with, read_images_with, write_image_with, write_images_with,
};
#[cfg(feature = "system")]
pub use stateless_api::{imread, imwrite};
