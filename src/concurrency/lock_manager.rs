use crate::common::config::TxnId;
use crate::common::exception::DBError;
use crate::concurrency::transaction::Transaction;
use crate::storage::page::page_id::HeapPageId;
use log::{debug, warn};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// Page lock modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LockMode {
    Shared,
    Exclusive,
}

#[derive(Debug)]
struct PageLock {
    mode: LockMode,
    holders: HashSet<TxnId>,
}

/// Page-granularity two-mode lock table.
///
/// Requests never wait: a request that conflicts with a lock held by another
/// transaction aborts the requester, which rules out deadlock. A transaction
/// re-requesting a lock it already holds succeeds, and a sole shared holder
/// may upgrade to exclusive.
#[derive(Debug, Default)]
pub struct LockManager {
    page_locks: Mutex<HashMap<HeapPageId, PageLock>>,
}

impl LockManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_page(
        &self,
        txn: &Transaction,
        pid: HeapPageId,
        mode: LockMode,
    ) -> Result<(), DBError> {
        let txn_id = txn.get_transaction_id();
        if txn.is_aborted() {
            return Err(DBError::TransactionAborted(txn_id));
        }

        let mut page_locks = self.page_locks.lock();
        let granted = match page_locks.get_mut(&pid) {
            None => {
                page_locks.insert(
                    pid,
                    PageLock {
                        mode,
                        holders: HashSet::from([txn_id]),
                    },
                );
                true
            }
            Some(lock) if lock.holders.contains(&txn_id) => match (lock.mode, mode) {
                (LockMode::Exclusive, _) | (_, LockMode::Shared) => true,
                (LockMode::Shared, LockMode::Exclusive) if lock.holders.len() == 1 => {
                    debug!("Txn {} upgrading lock on {} to exclusive", txn_id, pid);
                    lock.mode = LockMode::Exclusive;
                    true
                }
                _ => false,
            },
            Some(lock) => {
                if lock.mode == LockMode::Shared && mode == LockMode::Shared {
                    lock.holders.insert(txn_id);
                    true
                } else {
                    false
                }
            }
        };
        drop(page_locks);

        if granted {
            debug!("Txn {} holds {:?} lock on {}", txn_id, mode, pid);
            Ok(())
        } else {
            warn!(
                "Txn {} aborted: {:?} lock on {} conflicts with another transaction",
                txn_id, mode, pid
            );
            txn.abort();
            Err(DBError::TransactionAborted(txn_id))
        }
    }

    /// Releases `txn_id`'s lock on `pid`. Returns whether a lock was held.
    pub fn unlock_page(&self, txn_id: TxnId, pid: HeapPageId) -> bool {
        let mut page_locks = self.page_locks.lock();
        let Some(lock) = page_locks.get_mut(&pid) else {
            return false;
        };
        let released = lock.holders.remove(&txn_id);
        if lock.holders.is_empty() {
            page_locks.remove(&pid);
        }
        released
    }

    /// Releases every page lock held by `txn_id`.
    pub fn unlock_all(&self, txn_id: TxnId) {
        let mut page_locks = self.page_locks.lock();
        page_locks.retain(|_, lock| {
            lock.holders.remove(&txn_id);
            !lock.holders.is_empty()
        });
        debug!("Released all page locks of txn {}", txn_id);
    }

    pub fn holds_lock(&self, txn_id: TxnId, pid: HeapPageId) -> bool {
        self.page_locks
            .lock()
            .get(&pid)
            .is_some_and(|lock| lock.holders.contains(&txn_id))
    }

    pub fn get_lock_mode(&self, pid: HeapPageId) -> Option<LockMode> {
        self.page_locks.lock().get(&pid).map(|lock| lock.mode)
    }

    pub fn get_active_lock_count(&self) -> usize {
        self.page_locks.lock().len()
    }
}
