use std::fs;
use std::path::Path;

use bincode::config as bincode_config;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::common::exception::DBError;

pub const DB_PAGE_SIZE: usize = 4096; // size of a data page in bytes
pub const BUFFER_POOL_SIZE: usize = 50; // default number of cached pages
pub const STRING_LEN: usize = 128; // fixed payload width of a VARCHAR field

pub type TableOidT = u32; // table id type
pub type PageNumber = u32; // page number within a table
pub type TxnId = u64; // transaction id type
pub type SlotOffset = u32; // slot offset type

pub const MAX_DECODE_BYTES: usize = 1 << 20; // cap on memory a decoded catalog record may claim

/// Bincode configuration for persisted (on-disk) encodings.
///
/// Keep this centralized so page-id and schema records don't diverge across call sites.
/// NOTE: Changing this is an on-disk format change.
#[inline]
pub(crate) fn storage_bincode_config(
) -> bincode_config::Configuration<bincode_config::LittleEndian, bincode_config::Fixint> {
    // Little-endian with fixed-width integers: a `HeapPageId` is always exactly 8 bytes.
    bincode_config::standard()
        .with_little_endian()
        .with_fixed_int_encoding()
}

/// Tunables for the storage layer.
///
/// Loaded from a TOML file; every key is optional and falls back to the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Maximum number of pages the buffer pool keeps cached.
    pub buffer_pool_size: usize,
    /// Page size in bytes, used to derive the number of slots per heap page.
    pub page_size: usize,
    /// Default log filter handed to the logger when `RUST_LOG` is unset.
    pub log_level: String,
}

impl StorageConfig {
    pub fn load(path: &Path) -> Result<Self, DBError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| DBError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, DBError> {
        let config: StorageConfig =
            toml::from_str(contents).map_err(|e| DBError::Config(e.to_string()))?;
        if config.buffer_pool_size == 0 {
            return Err(DBError::Config(
                "buffer_pool_size must be at least 1".to_string(),
            ));
        }
        if config.page_size == 0 {
            return Err(DBError::Config("page_size must be at least 1".to_string()));
        }
        config.level_filter()?;
        Ok(config)
    }

    /// Parses `log_level` (`off`, `error`, `warn`, `info`, `debug`, `trace`).
    pub fn level_filter(&self) -> Result<LevelFilter, DBError> {
        self.log_level
            .parse::<LevelFilter>()
            .map_err(|_| DBError::Config(format!("unknown log level '{}'", self.log_level)))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            buffer_pool_size: BUFFER_POOL_SIZE,
            page_size: DB_PAGE_SIZE,
            log_level: "info".to_string(),
        }
    }
}
