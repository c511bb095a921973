use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

use crate::common::config::StorageConfig;
use crate::common::exception::DBError;

static INIT: Once = Once::new();

/// Installs the process-wide logger.
///
/// `default_level` applies when `RUST_LOG` is unset; `RUST_LOG` always wins.
pub fn initialize_logger_with_level(default_level: LevelFilter) {
    // Use call_once_force to recover if an earlier initialization attempt panicked.
    INIT.call_once_force(|_| {
        let mut builder = Builder::new();

        builder
            .filter_level(default_level)
            .filter_module("heapdb", default_level)
            .filter_module("heapdb::buffer", default_level)
            .filter_module("heapdb::storage", default_level)
            .filter_module("heapdb::concurrency", default_level)
            .format_timestamp_millis()
            .parse_default_env();

        // Avoid panicking if the logger was already initialized elsewhere.
        let _ = builder.try_init();
    });
}

pub fn initialize_logger() {
    initialize_logger_with_level(LevelFilter::Info);
}

/// Installs the logger using the level named by `config.log_level`.
pub fn initialize_logger_from_config(config: &StorageConfig) -> Result<(), DBError> {
    initialize_logger_with_level(config.level_filter()?);
    Ok(())
}
