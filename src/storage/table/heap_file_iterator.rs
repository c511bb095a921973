use crate::buffer::page_cache::{PageCache, Permissions};
use crate::common::config::PageNumber;
use crate::common::exception::DBError;
use crate::concurrency::transaction::Transaction;
use crate::storage::page::heap_page::PageTupleIter;
use crate::storage::page::page_id::HeapPageId;
use crate::storage::table::db_file::DbFile;
use crate::storage::table::tuple::Tuple;
use log::{debug, trace};
use std::sync::Arc;

/// Forward-only cursor over the rows of a table.
pub trait DbFileIterator {
    /// Positions the cursor before the first row of page 0.
    fn open(&mut self) -> Result<(), DBError>;

    /// Whether `next` would return a row. May fetch pages to find out.
    fn has_next(&mut self) -> Result<bool, DBError>;

    /// Returns the next row, or `DBError::NoMoreRows` past the end.
    fn next(&mut self) -> Result<Arc<Tuple>, DBError>;

    /// Restarts the scan from the first row of page 0.
    fn rewind(&mut self) -> Result<(), DBError>;

    /// Releases the current page. Always safe to call, any number of times.
    fn close(&mut self);
}

enum CursorState {
    Closed,
    Positioned {
        /// Page count sampled when the cursor was opened.
        num_pages: PageNumber,
        /// Next page number to fetch once `tuples` runs dry.
        next_page: PageNumber,
        /// Row iterator of the page most recently fetched.
        tuples: Option<PageTupleIter>,
    },
}

/// Sequential scan over every row of every page of a heap file.
///
/// Pages are requested from the page cache one at a time, in increasing page
/// number order, always with [`Permissions::ReadOnly`]. The cursor holds at
/// most one page, and lets go of it before asking for the next one. Errors
/// from the cache are returned unchanged; after `TransactionAborted` the scan
/// is over and the caller should `close` it.
pub struct HeapFileIterator {
    file: Arc<dyn DbFile>,
    cache: Arc<dyn PageCache>,
    txn: Arc<Transaction>,
    state: CursorState,
}

impl HeapFileIterator {
    pub fn new(file: Arc<dyn DbFile>, cache: Arc<dyn PageCache>, txn: Arc<Transaction>) -> Self {
        Self {
            file,
            cache,
            txn,
            state: CursorState::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, CursorState::Positioned { .. })
    }

    /// Page the cursor is currently reading, if any.
    pub fn get_current_page_id(&self) -> Option<HeapPageId> {
        match &self.state {
            CursorState::Positioned {
                tuples: Some(tuples),
                ..
            } => Some(tuples.get_page_id()),
            _ => None,
        }
    }

    /// Adapts the cursor into a std iterator. The iterator ends after the
    /// first error it yields.
    pub fn rows(&mut self) -> Rows<'_> {
        Rows {
            cursor: self,
            failed: false,
        }
    }

    fn fetch_page(
        file: &dyn DbFile,
        cache: &dyn PageCache,
        txn: &Transaction,
        page_number: PageNumber,
    ) -> Result<PageTupleIter, DBError> {
        let pid = HeapPageId::new(file.get_id(), page_number);
        trace!("Txn {} fetching page {}", txn.get_transaction_id(), pid);
        let page = cache.get_page(txn, pid, Permissions::ReadOnly)?;
        Ok(page.tuple_iter())
    }
}

impl DbFileIterator for HeapFileIterator {
    fn open(&mut self) -> Result<(), DBError> {
        self.close();
        let num_pages = self.file.num_pages();
        debug!(
            "Opening scan of table {} ({} pages) for txn {}",
            self.file.get_id(),
            num_pages,
            self.txn.get_transaction_id()
        );

        let tuples = if num_pages > 0 {
            Some(Self::fetch_page(&*self.file, &*self.cache, &self.txn, 0)?)
        } else {
            None
        };
        self.state = CursorState::Positioned {
            num_pages,
            next_page: 1,
            tuples,
        };
        Ok(())
    }

    fn has_next(&mut self) -> Result<bool, DBError> {
        let Self {
            file,
            cache,
            txn,
            state,
        } = self;
        let CursorState::Positioned {
            num_pages,
            next_page,
            tuples,
        } = state
        else {
            return Ok(false);
        };

        loop {
            if tuples.as_ref().is_some_and(PageTupleIter::has_next) {
                return Ok(true);
            }
            if *next_page >= *num_pages {
                return Ok(false);
            }
            // Let go of the exhausted page before the cache hands out the next one.
            *tuples = None;
            *tuples = Some(Self::fetch_page(&**file, &**cache, txn, *next_page)?);
            *next_page += 1;
        }
    }

    fn next(&mut self) -> Result<Arc<Tuple>, DBError> {
        if !self.has_next()? {
            return Err(DBError::NoMoreRows);
        }
        match &mut self.state {
            CursorState::Positioned {
                tuples: Some(tuples),
                ..
            } => tuples.next().ok_or(DBError::NoMoreRows),
            _ => Err(DBError::NoMoreRows),
        }
    }

    fn rewind(&mut self) -> Result<(), DBError> {
        self.close();
        self.open()
    }

    fn close(&mut self) {
        if self.is_open() {
            debug!(
                "Closing scan of table {} for txn {}",
                self.file.get_id(),
                self.txn.get_transaction_id()
            );
        }
        self.state = CursorState::Closed;
    }
}

/// Std-iterator view of an open [`HeapFileIterator`].
pub struct Rows<'a> {
    cursor: &'a mut HeapFileIterator,
    failed: bool,
}

impl Iterator for Rows<'_> {
    type Item = Result<Arc<Tuple>, DBError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.cursor.has_next() {
            Ok(false) => None,
            Ok(true) => Some(self.cursor.next()),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
