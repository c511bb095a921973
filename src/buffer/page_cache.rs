use std::sync::Arc;

use crate::common::exception::DBError;
use crate::concurrency::lock_manager::LockMode;
use crate::concurrency::transaction::Transaction;
use crate::storage::page::heap_page::HeapPage;
use crate::storage::page::page_id::HeapPageId;

/// Access a transaction requests when fetching a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permissions {
    ReadOnly,
    ReadWrite,
}

impl Permissions {
    pub fn lock_mode(&self) -> LockMode {
        match self {
            Permissions::ReadOnly => LockMode::Shared,
            Permissions::ReadWrite => LockMode::Exclusive,
        }
    }
}

/// Source of pages for scans.
///
/// `get_page` may block while a lock is acquired for `txn`, and fails with
/// `DBError::Storage` when the page cannot be produced or
/// `DBError::TransactionAborted` when `txn` was aborted while locking.
/// The returned page is shared with the cache; callers must not assume the
/// cache still holds it after their next request.
pub trait PageCache: Send + Sync {
    fn get_page(
        &self,
        txn: &Transaction,
        pid: HeapPageId,
        perm: Permissions,
    ) -> Result<Arc<HeapPage>, DBError>;
}
