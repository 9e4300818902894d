// Raw declarations for the system `libflif` shared library.
//
// Resolution happens at load time: a missing library or symbol aborts the
// process before any handle can be created, which is the only sensible
// outcome since nothing in this crate works without the table.

use std::ffi::{c_char, c_void};
use std::sync::OnceLock;

use super::{DecoderOps, EncoderOps, FlifApi, FlifDecoder, FlifEncoder, FlifImage, ImageOps};

#[link(name = "flif")]
#[allow(non_snake_case)]
extern "C" {
    fn flif_image_get_width(image: *mut FlifImage) -> u32;
    fn flif_image_get_height(image: *mut FlifImage) -> u32;
    fn flif_image_get_nb_channels(image: *mut FlifImage) -> u8;
    fn flif_image_get_depth(image: *mut FlifImage) -> u8;
    fn flif_image_get_palette_size(image: *mut FlifImage) -> u32;

    fn flif_import_image_RGBA(width: u32, height: u32, rgba: *const c_void, stride: u32) -> *mut FlifImage;
    fn flif_import_image_RGB(width: u32, height: u32, rgb: *const c_void, stride: u32) -> *mut FlifImage;
    fn flif_import_image_GRAY(width: u32, height: u32, gray: *const c_void, stride: u32) -> *mut FlifImage;
    fn flif_import_image_GRAY16(width: u32, height: u32, gray: *const c_void, stride: u32) -> *mut FlifImage;

    fn flif_image_read_row_GRAY8(image: *mut FlifImage, row: u32, buffer: *mut c_void, bytes: usize);
    fn flif_image_read_row_GRAY16(image: *mut FlifImage, row: u32, buffer: *mut c_void, bytes: usize);
    fn flif_image_read_row_RGBA8(image: *mut FlifImage, row: u32, buffer: *mut c_void, bytes: usize);
    fn flif_image_read_row_RGBA16(image: *mut FlifImage, row: u32, buffer: *mut c_void, bytes: usize);

    fn flif_destroy_image(image: *mut FlifImage);

    fn flif_create_encoder() -> *mut FlifEncoder;
    fn flif_encoder_encode_file(encoder: *mut FlifEncoder, filename: *const c_char) -> i32;
    fn flif_destroy_encoder(encoder: *mut FlifEncoder);
    fn flif_encoder_add_image(encoder: *mut FlifEncoder, image: *mut FlifImage);
    fn flif_encoder_add_image_move(encoder: *mut FlifEncoder, image: *mut FlifImage);
    fn flif_encoder_set_interlaced(encoder: *mut FlifEncoder, interlaced: u32);
    fn flif_encoder_set_learn_repeat(encoder: *mut FlifEncoder, learn_repeat: u32);
    fn flif_encoder_set_split_threshold(encoder: *mut FlifEncoder, threshold: i32);
    fn flif_encoder_set_crc_check(encoder: *mut FlifEncoder, crc_check: u32);
    fn flif_encoder_set_lossy(encoder: *mut FlifEncoder, loss: i32);

    fn flif_create_decoder() -> *mut FlifDecoder;
    fn flif_decoder_decode_file(decoder: *mut FlifDecoder, filename: *const c_char) -> i32;
    fn flif_decoder_set_crc_check(decoder: *mut FlifDecoder, crc_check: u32);
    fn flif_decoder_num_images(decoder: *mut FlifDecoder) -> usize;
    fn flif_decoder_get_image(decoder: *mut FlifDecoder, index: usize) -> *mut FlifImage;
    fn flif_destroy_decoder(decoder: *mut FlifDecoder);
}

impl ImageOps {
    fn system() -> Self {
        log::debug!("Initializing FLIF image table");
        Self {
            get_width: flif_image_get_width,
            get_height: flif_image_get_height,
            get_nb_channels: flif_image_get_nb_channels,
            get_depth: flif_image_get_depth,
            get_palette_size: flif_image_get_palette_size,
            import_image_rgba: flif_import_image_RGBA,
            import_image_rgb: flif_import_image_RGB,
            import_image_gray: flif_import_image_GRAY,
            import_image_gray16: flif_import_image_GRAY16,
            read_row_gray8: flif_image_read_row_GRAY8,
            read_row_gray16: flif_image_read_row_GRAY16,
            read_row_rgba8: flif_image_read_row_RGBA8,
            read_row_rgba16: flif_image_read_row_RGBA16,
            destroy_image: flif_destroy_image,
        }
    }
}

impl EncoderOps {
    fn system() -> Self {
        log::debug!("Initializing FLIF encoder table");
        Self {
            create_encoder: flif_create_encoder,
            encode_file: flif_encoder_encode_file,
            destroy_encoder: flif_destroy_encoder,
            add_image: flif_encoder_add_image,
            add_image_move: flif_encoder_add_image_move,
            set_interlaced: flif_encoder_set_interlaced,
            set_learn_repeat: flif_encoder_set_learn_repeat,
            set_split_threshold: flif_encoder_set_split_threshold,
            set_crc_check: flif_encoder_set_crc_check,
            set_lossy: flif_encoder_set_lossy,
        }
    }
}

impl DecoderOps {
    fn system() -> Self {
        log::debug!("Initializing FLIF decoder table");
        Self {
            create_decoder: flif_create_decoder,
            decode_file: flif_decoder_decode_file,
            set_crc_check: flif_decoder_set_crc_check,
            num_images: flif_decoder_num_images,
            get_image: flif_decoder_get_image,
            destroy_decoder: flif_destroy_decoder,
        }
    }
}

static SYSTEM: OnceLock<FlifApi> = OnceLock::new();

impl FlifApi {
    /// The process-wide table bound to the system `libflif`.
    pub fn system() -> &'static FlifApi {
        SYSTEM.get_or_init(|| FlifApi {
            encoder: EncoderOps::system(),
            image: ImageOps::system(),
            decoder: DecoderOps::system(),
        })
    }
}
