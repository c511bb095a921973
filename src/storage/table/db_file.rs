use crate::catalog::schema::Schema;
use crate::common::config::{PageNumber, TableOidT};
use crate::common::exception::DBError;
use crate::storage::page::heap_page::HeapPage;
use crate::storage::page::page_id::HeapPageId;

/// A table stored as a sequence of pages numbered from zero.
pub trait DbFile: Send + Sync {
    /// Id used in every [`HeapPageId`] of this table.
    fn get_id(&self) -> TableOidT;

    fn get_schema(&self) -> &Schema;

    /// Number of pages currently in the file. The last page is `num_pages() - 1`.
    fn num_pages(&self) -> PageNumber;

    /// Reads a page straight from storage, bypassing any cache.
    fn read_page(&self, pid: HeapPageId) -> Result<HeapPage, DBError>;
}
