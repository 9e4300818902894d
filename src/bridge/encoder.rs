// In: src/bridge/encoder.rs

//! The stateful encoder session.
//!
//! Lifecycle: `new` → `open` → `add_*`* → `finalize`, or `abandon` from any
//! state. The native encoder handle is released exactly once on every path:
//! `finalize` destroys it whether or not writing succeeded, and dropping an
//! open session abandons it without writing anything.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use crate::bridge::handle::EncoderImage;
use crate::config::{EncoderConfig, EncoderSettings};
use crate::error::FlifError;
use crate::ffi::{path_to_cstring, FlifApi, FlifEncoder};
use crate::types::PixelView;

#[derive(Debug)]
pub struct Encoder {
    api: &'static FlifApi,
    path: PathBuf,
    settings: EncoderSettings,
    handle: Option<NonNull<FlifEncoder>>,
}

impl Encoder {
    /// Creates an unopened session. Settings are resolved here and fixed for
    /// the session's life.
    pub fn new(api: &'static FlifApi, path: impl AsRef<Path>, config: &EncoderConfig) -> Self {
        Self {
            api,
            path: path.as_ref().to_path_buf(),
            settings: config.resolve(),
            handle: None,
        }
    }

    /// Runs `body` against an open session, writing the file if it succeeds
    /// and discarding the session if it fails.
    pub fn scoped<R, E, F>(
        api: &'static FlifApi,
        path: impl AsRef<Path>,
        config: &EncoderConfig,
        body: F,
    ) -> Result<R, E>
    where
        E: From<FlifError>,
        F: FnOnce(&mut Encoder) -> Result<R, E>,
    {
        let mut encoder = Encoder::new(api, path, config);
        encoder.open()?;
        match body(&mut encoder) {
            Ok(value) => {
                encoder.finalize()?;
                Ok(value)
            }
            Err(e) => {
                encoder.abandon();
                Err(e)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &EncoderSettings {
        &self.settings
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Checks the target is writable, creates the native encoder and applies
    /// the settings. Opening an open session does nothing.
    pub fn open(&mut self) -> Result<(), FlifError> {
        if self.handle.is_some() {
            return Ok(());
        }

        File::create(&self.path).map_err(|source| FlifError::Unwritable {
            path: self.path.clone(),
            source,
        })?;

        // SAFETY: no preconditions.
        let raw = unsafe { (self.api.encoder.create_encoder)() };
        let handle = NonNull::new(raw).ok_or(FlifError::NativeAllocation { what: "encoder" })?;
        log::debug!("Created FLIF encoder {:p} for {:?}", handle, self.path);

        let ops = &self.api.encoder;
        let settings = &self.settings;
        let ptr = handle.as_ptr();
        // SAFETY: `ptr` is the live encoder created above.
        unsafe {
            (ops.set_interlaced)(ptr, settings.interlaced as u32);
            (ops.set_learn_repeat)(ptr, settings.learn_repeat);
            (ops.set_split_threshold)(ptr, settings.split_threshold);
            (ops.set_crc_check)(ptr, settings.crc_check as u32);
            (ops.set_lossy)(ptr, settings.max_loss);
        }

        self.handle = Some(handle);
        Ok(())
    }

    fn open_handle(&self) -> Result<NonNull<FlifEncoder>, FlifError> {
        self.handle.ok_or_else(|| FlifError::EncoderNotOpen {
            path: self.path.clone(),
        })
    }

    /// Adds a copy of `image`; the caller keeps ownership of its handle.
    pub fn add_image(&mut self, image: &EncoderImage<'_>) -> Result<(), FlifError> {
        let encoder = self.open_handle()?;
        let image = image.raw()?;
        // SAFETY: both handles are live; the encoder does not take ownership.
        unsafe { (self.api.encoder.add_image)(encoder.as_ptr(), image.as_ptr()) };
        Ok(())
    }

    /// Transfers `image` into the encoder, which becomes responsible for it.
    pub fn add_image_move(&mut self, image: EncoderImage<'_>) -> Result<(), FlifError> {
        let encoder = self.open_handle()?;
        let image = image.into_raw()?;
        // SAFETY: ownership of `image` passes to the live encoder.
        unsafe { (self.api.encoder.add_image_move)(encoder.as_ptr(), image.as_ptr()) };
        Ok(())
    }

    /// Imports `pixels` into a transient image and moves it into the encoder.
    pub fn add_pixels<'a>(&mut self, pixels: impl Into<PixelView<'a>>) -> Result<(), FlifError> {
        self.open_handle()?;
        let image = EncoderImage::new(self.api, pixels)?;
        self.add_image_move(image)
    }

    /// Writes the file and releases the native encoder. The encoder is
    /// released even when writing fails. Finalizing a session that is not
    /// open does nothing.
    pub fn finalize(&mut self) -> Result<(), FlifError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        let result = path_to_cstring(&self.path).and_then(|c_path| {
            // SAFETY: `handle` is live and `c_path` is NUL-terminated.
            let written = unsafe { (self.api.encoder.encode_file)(handle.as_ptr(), c_path.as_ptr()) };
            if written == 0 {
                Err(FlifError::EncodeFailed {
                    path: self.path.clone(),
                })
            } else {
                Ok(())
            }
        });

        self.destroy(handle);
        if result.is_ok() {
            log::debug!("Wrote FLIF file {:?}", self.path);
        }
        result
    }

    /// Releases the native encoder without writing. Idempotent.
    pub fn abandon(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.destroy(handle);
        }
    }

    fn destroy(&self, handle: NonNull<FlifEncoder>) {
        log::debug!("Destroying FLIF encoder {:p}", handle);
        // SAFETY: `handle` was taken out of `self.handle`, so this is its only release.
        unsafe { (self.api.encoder.destroy_encoder)(handle.as_ptr()) };
    }
}

impl Drop for Encoder {
    fn drop(&mut self) {
        if self.handle.is_some() {
            log::warn!(
                "FLIF encoder for {:?} dropped while open; discarding without writing",
                self.path
            );
            self.abandon();
        }
    }
}
