//! Process-wide logger setup.
//!
//! The library only emits through the `log` facade. Binaries and embedding
//! applications call [`enable_verbose_logging`] once to route those records
//! to stderr or a file.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Once;

use log::LevelFilter;

use crate::error::FlifError;

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` at `level`, appending to `log_file` when given.
///
/// Only the first call has an effect; later calls return `Ok(())` without
/// touching the installed logger.
pub fn enable_verbose_logging(level: LevelFilter, log_file: Option<&Path>) -> Result<(), FlifError> {
    let mut result = Ok(());
    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(level);

        // Just the level and message.
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())
        });

        if let Some(path) = log_file {
            match OpenOptions::new().append(true).create(true).open(path) {
                Ok(file) => {
                    builder.target(env_logger::Target::Pipe(Box::new(file)));
                }
                Err(e) => {
                    result = Err(FlifError::Io(e));
                    return;
                }
            }
        }

        let _ = builder.try_init();
    });
    result
}
