//! An in-process stand-in codec implementing the FLIF C ABI, used by the unit
//! tests so the binding layer can be exercised without `libflif` installed.
//!
//! Files written by the mock use a trivial container (`MOCKFLIF`, frame
//! count, then per frame a header and little-endian 16-bit samples). It is
//! not FLIF, but it is lossless and multi-frame, which is all the binding
//! layer can observe.
//!
//! Every handle created, destroyed or moved is recorded in a per-thread
//! [`Ledger`]. The test harness runs each test on its own thread, so a test
//! sees only its own native traffic.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::ffi::{c_char, c_void, CStr};
use std::path::Path;

use super::{DecoderOps, EncoderOps, FlifApi, FlifDecoder, FlifEncoder, FlifImage, ImageOps};

const MAGIC: &[u8; 8] = b"MOCKFLIF";

//==================================================================================
// 1. Ledger
//==================================================================================

#[derive(Debug, Default, Clone)]
pub(crate) struct Ledger {
    pub imports: usize,
    pub images_destroyed: usize,
    pub images_moved: usize,
    pub encoders_created: usize,
    pub encoders_destroyed: usize,
    pub decoders_created: usize,
    pub decoders_destroyed: usize,
    pub encode_calls: usize,
    pub files_written: usize,
    /// Destroy or move of a pointer this ledger does not consider live.
    pub invalid_releases: usize,
    /// Configuration calls in the order they were made.
    pub calls: Vec<(&'static str, i64)>,
    live: HashSet<usize>,
}

impl Ledger {
    /// Handles created through the mock and not yet released.
    pub fn live_handles(&self) -> usize {
        self.live.len()
    }
}

thread_local! {
    static LEDGER: RefCell<Ledger> = RefCell::new(Ledger::default());
    static FAIL_ALLOCATIONS: Cell<bool> = const { Cell::new(false) };
    static HIDE_FRAMES: Cell<bool> = const { Cell::new(false) };
}

/// Snapshot of the current thread's ledger.
pub(crate) fn ledger() -> Ledger {
    LEDGER.with(|l| l.borrow().clone())
}

/// Makes every subsequent create/import on this thread return null.
pub(crate) fn fail_allocations(fail: bool) {
    FAIL_ALLOCATIONS.with(|f| f.set(fail));
}

/// Makes `get_image` on this thread return null even for valid indices.
pub(crate) fn hide_frames(hide: bool) {
    HIDE_FRAMES.with(|f| f.set(hide));
}

fn record<R>(f: impl FnOnce(&mut Ledger) -> R) -> R {
    LEDGER.with(|l| f(&mut l.borrow_mut()))
}

fn allocations_fail() -> bool {
    FAIL_ALLOCATIONS.with(|f| f.get())
}

fn track<T>(ptr: *mut T) -> *mut T {
    record(|l| l.live.insert(ptr as usize));
    ptr
}

/// Removes `ptr` from the live set; returns false on double release.
fn untrack<T>(ptr: *mut T) -> bool {
    let released = record(|l| l.live.remove(&(ptr as usize)));
    if !released {
        record(|l| l.invalid_releases += 1);
    }
    released
}

//==================================================================================
// 2. Native Objects
//==================================================================================

/// One frame: `channels` interleaved samples per pixel at `depth` bits.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MockImage {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub depth: u8,
    pub palette: u32,
    pub samples: Vec<u16>,
}

impl MockImage {
    pub fn new(width: u32, height: u32, channels: u8, depth: u8, samples: Vec<u16>) -> Self {
        assert_eq!(samples.len(), (width * height) as usize * channels as usize);
        Self { width, height, channels, depth, palette: 0, samples }
    }

    fn max_value(&self) -> u16 {
        if self.depth == 16 {
            u16::MAX
        } else {
            u8::MAX as u16
        }
    }

    /// Sample `c` of pixel `(x, y)` as materialized into a four-channel row.
    fn expanded(&self, x: usize, y: usize, c: usize) -> u16 {
        let channels = self.channels as usize;
        let base = (y * self.width as usize + x) * channels;
        if c < channels {
            self.samples[base + c]
        } else if c == 3 {
            self.max_value()
        } else {
            self.samples[base]
        }
    }
}

fn rescale(value: u16, from_depth: u8, to_depth: u8) -> u16 {
    match (from_depth, to_depth) {
        (16, 8) => value >> 8,
        (8, 16) => value * 257,
        _ => value,
    }
}

struct MockEncoder {
    frames: Vec<MockImage>,
}

struct MockDecoder {
    frames: Vec<Box<MockImage>>,
}

unsafe fn image_ref<'a>(image: *mut FlifImage) -> &'a MockImage {
    &*(image as *const MockImage)
}

//==================================================================================
// 3. Image Entry Points
//==================================================================================

unsafe extern "C" fn get_width(image: *mut FlifImage) -> u32 {
    image_ref(image).width
}

unsafe extern "C" fn get_height(image: *mut FlifImage) -> u32 {
    image_ref(image).height
}

unsafe extern "C" fn get_nb_channels(image: *mut FlifImage) -> u8 {
    image_ref(image).channels
}

unsafe extern "C" fn get_depth(image: *mut FlifImage) -> u8 {
    image_ref(image).depth
}

unsafe extern "C" fn get_palette_size(image: *mut FlifImage) -> u32 {
    image_ref(image).palette
}

/// Reads `width * channels` samples per row; consecutive rows start
/// `stride * channels` bytes apart.
unsafe fn import(
    width: u32,
    height: u32,
    data: *const c_void,
    stride: u32,
    channels: u8,
    depth: u8,
) -> *mut FlifImage {
    record(|l| l.imports += 1);
    if allocations_fail() || data.is_null() || width == 0 || height == 0 {
        return std::ptr::null_mut();
    }

    let sample_size = if depth == 16 { 2 } else { 1 };
    let row_samples = width as usize * channels as usize;
    let row_distance = stride as usize * channels as usize;
    let mut samples = Vec::with_capacity(row_samples * height as usize);
    for y in 0..height as usize {
        let row = std::slice::from_raw_parts(
            (data as *const u8).add(y * row_distance),
            row_samples * sample_size,
        );
        if depth == 16 {
            samples.extend(row.chunks_exact(2).map(|b| u16::from_ne_bytes([b[0], b[1]])));
        } else {
            samples.extend(row.iter().map(|&b| b as u16));
        }
    }

    let image = Box::new(MockImage::new(width, height, channels, depth, samples));
    track(Box::into_raw(image)) as *mut FlifImage
}

unsafe extern "C" fn import_rgba(w: u32, h: u32, data: *const c_void, stride: u32) -> *mut FlifImage {
    import(w, h, data, stride, 4, 8)
}

unsafe extern "C" fn import_rgb(w: u32, h: u32, data: *const c_void, stride: u32) -> *mut FlifImage {
    import(w, h, data, stride, 3, 8)
}

unsafe extern "C" fn import_gray(w: u32, h: u32, data: *const c_void, stride: u32) -> *mut FlifImage {
    import(w, h, data, stride, 1, 8)
}

unsafe extern "C" fn import_gray16(w: u32, h: u32, data: *const c_void, stride: u32) -> *mut FlifImage {
    import(w, h, data, stride, 1, 16)
}

/// Writes at most `bytes` bytes of row `row`, `out_channels` samples per
/// pixel at `out_depth` bits, in native byte order.
unsafe fn read_row(
    image: *mut FlifImage,
    row: u32,
    buffer: *mut c_void,
    bytes: usize,
    out_channels: usize,
    out_depth: u8,
) {
    let image = image_ref(image);
    if row >= image.height || buffer.is_null() {
        return;
    }
    let out = std::slice::from_raw_parts_mut(buffer as *mut u8, bytes);
    let sample_size = if out_depth == 16 { 2 } else { 1 };
    let mut offset = 0;
    for x in 0..image.width as usize {
        for c in 0..out_channels {
            if offset + sample_size > out.len() {
                return;
            }
            let value = rescale(image.expanded(x, row as usize, c), image.depth, out_depth);
            if out_depth == 16 {
                out[offset..offset + 2].copy_from_slice(&value.to_ne_bytes());
            } else {
                out[offset] = value as u8;
            }
            offset += sample_size;
        }
    }
}

unsafe extern "C" fn read_row_gray8(image: *mut FlifImage, row: u32, buffer: *mut c_void, bytes: usize) {
    read_row(image, row, buffer, bytes, 1, 8)
}

unsafe extern "C" fn read_row_gray16(image: *mut FlifImage, row: u32, buffer: *mut c_void, bytes: usize) {
    read_row(image, row, buffer, bytes, 1, 16)
}

unsafe extern "C" fn read_row_rgba8(image: *mut FlifImage, row: u32, buffer: *mut c_void, bytes: usize) {
    read_row(image, row, buffer, bytes, 4, 8)
}

unsafe extern "C" fn read_row_rgba16(image: *mut FlifImage, row: u32, buffer: *mut c_void, bytes: usize) {
    read_row(image, row, buffer, bytes, 4, 16)
}

unsafe extern "C" fn destroy_image(image: *mut FlifImage) {
    if image.is_null() {
        return;
    }
    if untrack(image) {
        record(|l| l.images_destroyed += 1);
        drop(Box::from_raw(image as *mut MockImage));
    }
}

//==================================================================================
// 4. Encoder Entry Points
//==================================================================================

unsafe extern "C" fn create_encoder() -> *mut FlifEncoder {
    if allocations_fail() {
        return std::ptr::null_mut();
    }
    record(|l| l.encoders_created += 1);
    let encoder = Box::new(MockEncoder { frames: Vec::new() });
    track(Box::into_raw(encoder)) as *mut FlifEncoder
}

unsafe extern "C" fn destroy_encoder(encoder: *mut FlifEncoder) {
    if encoder.is_null() {
        return;
    }
    if untrack(encoder) {
        record(|l| l.encoders_destroyed += 1);
        drop(Box::from_raw(encoder as *mut MockEncoder));
    }
}

unsafe extern "C" fn add_image(encoder: *mut FlifEncoder, image: *mut FlifImage) {
    let encoder = &mut *(encoder as *mut MockEncoder);
    encoder.frames.push(image_ref(image).clone());
}

unsafe extern "C" fn add_image_move(encoder: *mut FlifEncoder, image: *mut FlifImage) {
    let encoder = &mut *(encoder as *mut MockEncoder);
    if untrack(image) {
        record(|l| l.images_moved += 1);
        encoder.frames.push(*Box::from_raw(image as *mut MockImage));
    }
}

unsafe extern "C" fn encode_file(encoder: *mut FlifEncoder, filename: *const c_char) -> i32 {
    record(|l| l.encode_calls += 1);
    let encoder = &*(encoder as *const MockEncoder);
    if encoder.frames.is_empty() {
        return 0;
    }
    let Ok(path) = CStr::from_ptr(filename).to_str() else {
        return 0;
    };
    match std::fs::write(path, serialize(&encoder.frames)) {
        Ok(()) => {
            record(|l| l.files_written += 1);
            1
        }
        Err(_) => 0,
    }
}

unsafe extern "C" fn set_interlaced(_: *mut FlifEncoder, value: u32) {
    record(|l| l.calls.push(("interlaced", value as i64)));
}

unsafe extern "C" fn set_learn_repeat(_: *mut FlifEncoder, value: u32) {
    record(|l| l.calls.push(("learn_repeat", value as i64)));
}

unsafe extern "C" fn set_split_threshold(_: *mut FlifEncoder, value: i32) {
    record(|l| l.calls.push(("split_threshold", value as i64)));
}

unsafe extern "C" fn set_encoder_crc_check(_: *mut FlifEncoder, value: u32) {
    record(|l| l.calls.push(("crc_check", value as i64)));
}

unsafe extern "C" fn set_lossy(_: *mut FlifEncoder, value: i32) {
    record(|l| l.calls.push(("lossy", value as i64)));
}

//==================================================================================
// 5. Decoder Entry Points
//==================================================================================

unsafe extern "C" fn create_decoder() -> *mut FlifDecoder {
    if allocations_fail() {
        return std::ptr::null_mut();
    }
    record(|l| l.decoders_created += 1);
    let decoder = Box::new(MockDecoder { frames: Vec::new() });
    track(Box::into_raw(decoder)) as *mut FlifDecoder
}

unsafe extern "C" fn destroy_decoder(decoder: *mut FlifDecoder) {
    if decoder.is_null() {
        return;
    }
    if untrack(decoder) {
        record(|l| l.decoders_destroyed += 1);
        drop(Box::from_raw(decoder as *mut MockDecoder));
    }
}

unsafe extern "C" fn set_decoder_crc_check(_: *mut FlifDecoder, value: u32) {
    record(|l| l.calls.push(("decoder_crc_check", value as i64)));
}

unsafe extern "C" fn decode_file(decoder: *mut FlifDecoder, filename: *const c_char) -> i32 {
    let decoder = &mut *(decoder as *mut MockDecoder);
    let Ok(path) = CStr::from_ptr(filename).to_str() else {
        return 0;
    };
    let Ok(bytes) = std::fs::read(path) else {
        return 0;
    };
    match deserialize(&bytes) {
        Some(frames) => {
            decoder.frames = frames.into_iter().map(Box::new).collect();
            1
        }
        None => 0,
    }
}

unsafe extern "C" fn num_images(decoder: *mut FlifDecoder) -> usize {
    (*(decoder as *const MockDecoder)).frames.len()
}

unsafe extern "C" fn get_image(decoder: *mut FlifDecoder, index: usize) -> *mut FlifImage {
    if HIDE_FRAMES.with(|f| f.get()) {
        return std::ptr::null_mut();
    }
    let decoder = &mut *(decoder as *mut MockDecoder);
    match decoder.frames.get_mut(index) {
        Some(frame) => &mut **frame as *mut MockImage as *mut FlifImage,
        None => std::ptr::null_mut(),
    }
}

//==================================================================================
// 6. Container Format
//==================================================================================

fn serialize(frames: &[MockImage]) -> Vec<u8> {
    let mut out = MAGIC.to_vec();
    out.extend_from_slice(&(frames.len() as u32).to_le_bytes());
    for frame in frames {
        out.extend_from_slice(&frame.width.to_le_bytes());
        out.extend_from_slice(&frame.height.to_le_bytes());
        out.push(frame.channels);
        out.push(frame.depth);
        out.extend_from_slice(&frame.palette.to_le_bytes());
        for sample in &frame.samples {
            out.extend_from_slice(&sample.to_le_bytes());
        }
    }
    out
}

fn deserialize(bytes: &[u8]) -> Option<Vec<MockImage>> {
    fn take<'a>(bytes: &mut &'a [u8], n: usize) -> Option<&'a [u8]> {
        if bytes.len() < n {
            return None;
        }
        let (head, tail) = bytes.split_at(n);
        *bytes = tail;
        Some(head)
    }
    fn take_u32(bytes: &mut &[u8]) -> Option<u32> {
        take(bytes, 4).map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    let mut cursor = bytes;
    if take(&mut cursor, MAGIC.len())? != MAGIC {
        return None;
    }
    let count = take_u32(&mut cursor)?;
    let mut frames = Vec::new();
    for _ in 0..count {
        let width = take_u32(&mut cursor)?;
        let height = take_u32(&mut cursor)?;
        let header = take(&mut cursor, 2)?;
        let (channels, depth) = (header[0], header[1]);
        let palette = take_u32(&mut cursor)?;
        let len = width as usize * height as usize * channels as usize;
        let samples = take(&mut cursor, len * 2)?
            .chunks_exact(2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]))
            .collect();
        frames.push(MockImage { width, height, channels, depth, palette, samples });
    }
    Some(frames)
}

/// Writes `frames` to `path` in the mock container, bypassing the encoder.
/// Lets tests produce layouts the importers cannot (palettes, 3-channel
/// 16-bit, gray with alpha).
pub(crate) fn write_mock_file(path: &Path, frames: &[MockImage]) {
    std::fs::write(path, serialize(frames)).expect("write mock file");
}

//==================================================================================
// 7. Call Table
//==================================================================================

pub(crate) static MOCK_API: FlifApi = FlifApi {
    image: ImageOps {
        get_width,
        get_height,
        get_nb_channels,
        get_depth,
        get_palette_size,
        import_image_rgba: import_rgba,
        import_image_rgb: import_rgb,
        import_image_gray: import_gray,
        import_image_gray16: import_gray16,
        read_row_gray8,
        read_row_gray16,
        read_row_rgba8,
        read_row_rgba16,
        destroy_image,
    },
    encoder: EncoderOps {
        create_encoder,
        encode_file,
        destroy_encoder,
        add_image,
        add_image_move,
        set_interlaced,
        set_learn_repeat,
        set_split_threshold,
        set_crc_check: set_encoder_crc_check,
        set_lossy,
    },
    decoder: DecoderOps {
        create_decoder,
        decode_file,
        set_crc_check: set_decoder_crc_check,
        num_images,
        get_image,
        destroy_decoder,
    },
};
