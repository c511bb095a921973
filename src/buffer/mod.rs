pub mod buffer_pool_manager;
pub mod page_cache;
