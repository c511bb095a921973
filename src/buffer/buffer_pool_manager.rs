use crate::buffer::page_cache::{PageCache, Permissions};
use crate::common::config::{StorageConfig, TableOidT};
use crate::common::exception::DBError;
use crate::concurrency::lock_manager::LockManager;
use crate::concurrency::transaction::Transaction;
use crate::storage::page::heap_page::HeapPage;
use crate::storage::page::page_id::HeapPageId;
use crate::storage::table::db_file::DbFile;
use log::{debug, trace};
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

#[derive(Default)]
struct PageTable {
    pages: HashMap<HeapPageId, Arc<HeapPage>>,
    /// Insertion order, oldest first.
    order: VecDeque<HeapPageId>,
}

/// Bounded page cache shared by every scan.
///
/// Each request first takes the page lock its permission implies, then serves
/// the page from memory or reads it from the owning table. When full, the
/// page cached longest is dropped. Scans that still hold a dropped page keep
/// reading their own reference to it.
pub struct BufferPoolManager {
    pool_size: usize,
    page_table: Mutex<PageTable>,
    tables: RwLock<HashMap<TableOidT, Arc<dyn DbFile>>>,
    lock_manager: Arc<LockManager>,
}

impl BufferPoolManager {
    pub fn new(pool_size: usize, lock_manager: Arc<LockManager>) -> Self {
        debug!("Creating buffer pool with {} pages", pool_size);
        Self {
            pool_size: pool_size.max(1),
            page_table: Mutex::new(PageTable::default()),
            tables: RwLock::new(HashMap::new()),
            lock_manager,
        }
    }

    pub fn from_config(config: &StorageConfig, lock_manager: Arc<LockManager>) -> Self {
        Self::new(config.buffer_pool_size, lock_manager)
    }

    /// Makes `file` reachable through page ids carrying its table id.
    pub fn register_table(&self, file: Arc<dyn DbFile>) {
        debug!("Registering table {} with buffer pool", file.get_id());
        self.tables.write().insert(file.get_id(), file);
    }

    pub fn get_pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn get_lock_manager(&self) -> Arc<LockManager> {
        Arc::clone(&self.lock_manager)
    }

    pub fn get_num_cached_pages(&self) -> usize {
        self.page_table.lock().pages.len()
    }

    pub fn is_cached(&self, pid: HeapPageId) -> bool {
        self.page_table.lock().pages.contains_key(&pid)
    }

    /// Drops the cached copy of `pid`, if any, so the next request rereads it.
    pub fn discard_page(&self, pid: HeapPageId) {
        let mut table = self.page_table.lock();
        if table.pages.remove(&pid).is_some() {
            table.order.retain(|p| *p != pid);
            trace!("Discarded page {}", pid);
        }
    }

    /// Ends `txn`, releasing every page lock it holds.
    pub fn transaction_complete(&self, txn: &Transaction, commit: bool) {
        if commit {
            txn.commit();
        } else {
            txn.abort();
        }
        self.lock_manager.unlock_all(txn.get_transaction_id());
    }

    fn load_page(&self, pid: HeapPageId) -> Result<Arc<HeapPage>, DBError> {
        let file = self
            .tables
            .read()
            .get(&pid.get_table_id())
            .cloned()
            .ok_or_else(|| {
                DBError::Storage(format!("table {} is not registered", pid.get_table_id()))
            })?;
        Ok(Arc::new(file.read_page(pid)?))
    }
}

impl PageCache for BufferPoolManager {
    fn get_page(
        &self,
        txn: &Transaction,
        pid: HeapPageId,
        perm: Permissions,
    ) -> Result<Arc<HeapPage>, DBError> {
        if txn.is_aborted() {
            return Err(DBError::TransactionAborted(txn.get_transaction_id()));
        }
        self.lock_manager.lock_page(txn, pid, perm.lock_mode())?;

        if let Some(page) = self.page_table.lock().pages.get(&pid) {
            trace!("Buffer pool hit for page {}", pid);
            return Ok(Arc::clone(page));
        }

        trace!("Buffer pool miss for page {}", pid);
        let page = self.load_page(pid)?;

        let mut table = self.page_table.lock();
        if let Some(existing) = table.pages.get(&pid) {
            return Ok(Arc::clone(existing));
        }
        while table.pages.len() >= self.pool_size {
            let Some(victim) = table.order.pop_front() else {
                break;
            };
            table.pages.remove(&victim);
            trace!("Evicted page {}", victim);
        }
        table.pages.insert(pid, Arc::clone(&page));
        table.order.push_back(pid);
        Ok(page)
    }
}
