// In: src/bridge/decoder.rs

//! The stateful decoder session. The whole file is decoded when the session
//! opens; frames are then available by index until it closes.

use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use crate::bridge::handle::DecodedFrame;
use crate::error::FlifError;
use crate::ffi::{path_to_cstring, FlifApi, FlifDecoder};
use crate::types::PixelBuffer;

#[derive(Debug)]
pub struct Decoder {
    api: &'static FlifApi,
    path: PathBuf,
    handle: Option<NonNull<FlifDecoder>>,
}

impl Decoder {
    pub fn new(api: &'static FlifApi, path: impl AsRef<Path>) -> Self {
        Self {
            api,
            path: path.as_ref().to_path_buf(),
            handle: None,
        }
    }

    /// Opens a session, runs `body` and closes the session on every path.
    pub fn scoped<R, E, F>(api: &'static FlifApi, path: impl AsRef<Path>, body: F) -> Result<R, E>
    where
        E: From<FlifError>,
        F: FnOnce(&Decoder) -> Result<R, E>,
    {
        let mut decoder = Decoder::new(api, path);
        decoder.open()?;
        let result = body(&decoder);
        decoder.close();
        result
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Creates the native decoder with CRC checking enabled and decodes the
    /// file. On failure the native decoder is released before returning.
    pub fn open(&mut self) -> Result<(), FlifError> {
        if self.handle.is_some() {
            return Ok(());
        }
        let c_path = path_to_cstring(&self.path)?;

        let ops = &self.api.decoder;
        // SAFETY: no preconditions.
        let raw = unsafe { (ops.create_decoder)() };
        let handle = NonNull::new(raw).ok_or(FlifError::NativeAllocation { what: "decoder" })?;
        log::debug!("Created FLIF decoder {:p}", handle);

        // SAFETY: `handle` is live and `c_path` is NUL-terminated.
        let decoded = unsafe {
            (ops.set_crc_check)(handle.as_ptr(), 1);
            (ops.decode_file)(handle.as_ptr(), c_path.as_ptr())
        };
        if decoded == 0 {
            self.destroy(handle);
            return Err(FlifError::DecodeFailed {
                path: self.path.clone(),
            });
        }

        log::debug!("Decoded FLIF file {:?}", self.path);
        self.handle = Some(handle);
        Ok(())
    }

    fn open_handle(&self) -> Result<NonNull<FlifDecoder>, FlifError> {
        self.handle.ok_or_else(|| FlifError::NotDecoded {
            path: self.path.clone(),
        })
    }

    /// Number of frames in the decoded file.
    pub fn num_images(&self) -> Result<usize, FlifError> {
        let handle = self.open_handle()?;
        // SAFETY: `handle` is live.
        Ok(unsafe { (self.api.decoder.num_images)(handle.as_ptr()) })
    }

    /// Borrows frame `index`. The frame cannot outlive the session.
    pub fn frame(&self, index: usize) -> Result<DecodedFrame<'_>, FlifError> {
        let count = self.num_images()?;
        if index >= count {
            return Err(FlifError::FrameIndexOutOfRange { index, count });
        }
        let handle = self.open_handle()?;
        // SAFETY: `handle` is live and `index` is in range.
        let raw = unsafe { (self.api.decoder.get_image)(handle.as_ptr(), index) };
        let image = NonNull::new(raw).ok_or(FlifError::MissingFrame { index })?;
        Ok(DecodedFrame::new(self.api, image, index))
    }

    /// Copies frame `index` into a new array.
    pub fn get_image(&self, index: usize) -> Result<PixelBuffer, FlifError> {
        self.frame(index)?.to_pixels()
    }

    /// Copies every frame, in file order.
    pub fn read_all(&self) -> Result<Vec<PixelBuffer>, FlifError> {
        (0..self.num_images()?).map(|i| self.get_image(i)).collect()
    }

    /// Releases the native decoder. Idempotent.
    pub fn close(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.destroy(handle);
        }
    }

    fn destroy(&self, handle: NonNull<FlifDecoder>) {
        log::debug!("Destroying FLIF decoder {:p}", handle);
        // SAFETY: callers pass a handle no longer stored in `self.handle`.
        unsafe { (self.api.decoder.destroy_decoder)(handle.as_ptr()) };
    }
}

impl Drop for Decoder {
    fn drop(&mut self) {
        self.close();
    }
}
