use crate::buffer::page_cache::PageCache;
use crate::catalog::schema::Schema;
use crate::common::config::{PageNumber, StorageConfig, TableOidT, DB_PAGE_SIZE};
use crate::common::exception::DBError;
use crate::common::rid::RID;
use crate::concurrency::transaction::Transaction;
use crate::storage::page::heap_page::{slots_per_page, HeapPage};
use crate::storage::page::page_id::HeapPageId;
use crate::storage::table::db_file::DbFile;
use crate::storage::table::heap_file_iterator::HeapFileIterator;
use crate::storage::table::tuple::Tuple;
use crate::types_db::value::Value;
use log::{debug, trace};
use parking_lot::RwLock;
use std::sync::Arc;

/// TableHeap represents a table as an in-memory list of fixed-capacity pages.
///
/// Writes go straight to the heap's own pages. A buffer pool that already
/// cached one of those pages keeps serving its copy until the page is
/// discarded from the pool.
pub struct TableHeap {
    table_oid: TableOidT,
    schema: Schema,
    slots_per_page: usize,
    pages: RwLock<Vec<HeapPage>>,
}

impl TableHeap {
    /// Creates an empty table heap using the default page size.
    pub fn new(table_oid: TableOidT, schema: Schema) -> Self {
        Self::with_page_size(table_oid, schema, DB_PAGE_SIZE)
    }

    pub fn with_page_size(table_oid: TableOidT, schema: Schema, page_size: usize) -> Self {
        let slots_per_page = slots_per_page(page_size, schema.get_size());
        debug!(
            "Creating table heap {} with {} slots per {}-byte page",
            table_oid, slots_per_page, page_size
        );
        TableHeap {
            table_oid,
            schema,
            slots_per_page,
            pages: RwLock::new(Vec::new()),
        }
    }

    pub fn from_config(table_oid: TableOidT, schema: Schema, config: &StorageConfig) -> Self {
        Self::with_page_size(table_oid, schema, config.page_size)
    }

    pub fn get_slots_per_page(&self) -> usize {
        self.slots_per_page
    }

    /// Builds a tuple from `values` and inserts it.
    pub fn insert_values(&self, values: Vec<Value>) -> Result<RID, DBError> {
        let tuple = Tuple::new(values, &self.schema)?;
        self.insert_tuple(tuple)
    }

    /// Inserts a tuple into the first page with a free slot, appending a new
    /// page when every page is full.
    ///
    /// # Returns
    ///
    /// The RID the tuple was stored at.
    pub fn insert_tuple(&self, tuple: Tuple) -> Result<RID, DBError> {
        if self.slots_per_page == 0 {
            return Err(DBError::Storage(format!(
                "rows of {} bytes do not fit on a page",
                self.schema.get_size()
            )));
        }

        let mut pages = self.pages.write();
        let target = match pages.iter().position(|p| p.get_num_empty_slots() > 0) {
            Some(index) => index,
            None => {
                let pid = HeapPageId::new(self.table_oid, pages.len() as PageNumber);
                trace!("Table heap {} growing to page {}", self.table_oid, pid);
                pages.push(HeapPage::new(pid, self.slots_per_page));
                pages.len() - 1
            }
        };

        pages[target]
            .insert_tuple(tuple)
            .ok_or_else(|| DBError::Storage(format!("page {} is full", target)))
    }

    /// Removes the tuple at `rid`, leaving its slot free.
    pub fn delete_tuple(&self, rid: RID) -> Result<Arc<Tuple>, DBError> {
        let pid = rid.get_page_id();
        self.check_page_id(pid)?;
        let mut pages = self.pages.write();
        let page = pages
            .get_mut(pid.get_page_number() as usize)
            .ok_or_else(|| DBError::Storage(format!("page {} does not exist", pid)))?;
        page.delete_tuple(rid)
    }

    /// Appends a page with no rows and returns its page number.
    pub fn add_empty_page(&self) -> PageNumber {
        let mut pages = self.pages.write();
        let page_number = pages.len() as PageNumber;
        pages.push(HeapPage::new(
            HeapPageId::new(self.table_oid, page_number),
            self.slots_per_page,
        ));
        page_number
    }

    /// Returns a cursor over this table that reads through `cache` under `txn`.
    /// The cursor starts closed.
    pub fn make_iterator(
        self: Arc<Self>,
        cache: Arc<dyn PageCache>,
        txn: Arc<Transaction>,
    ) -> HeapFileIterator {
        HeapFileIterator::new(self, cache, txn)
    }

    fn check_page_id(&self, pid: HeapPageId) -> Result<(), DBError> {
        if pid.get_table_id() != self.table_oid {
            return Err(DBError::Storage(format!(
                "page {} does not belong to table {}",
                pid, self.table_oid
            )));
        }
        Ok(())
    }
}

impl DbFile for TableHeap {
    fn get_id(&self) -> TableOidT {
        self.table_oid
    }

    fn get_schema(&self) -> &Schema {
        &self.schema
    }

    fn num_pages(&self) -> PageNumber {
        self.pages.read().len() as PageNumber
    }

    fn read_page(&self, pid: HeapPageId) -> Result<HeapPage, DBError> {
        self.check_page_id(pid)?;
        self.pages
            .read()
            .get(pid.get_page_number() as usize)
            .cloned()
            .ok_or_else(|| DBError::Storage(format!("page {} does not exist", pid)))
    }
}
