pub mod buffer;
pub mod catalog;
pub mod common;
pub mod concurrency;
pub mod storage;
pub mod types_db;
