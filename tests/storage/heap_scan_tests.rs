use std::sync::Arc;

use heapdb::buffer::buffer_pool_manager::BufferPoolManager;
use heapdb::buffer::page_cache::{PageCache, Permissions};
use heapdb::catalog::schema::Schema;
use heapdb::common::config::StorageConfig;
use heapdb::common::exception::DBError;
use heapdb::common::rid::RID;
use heapdb::concurrency::lock_manager::LockManager;
use heapdb::concurrency::transaction::{Transaction, TransactionState};
use heapdb::storage::page::page_id::HeapPageId;
use heapdb::storage::table::db_file::DbFile;
use heapdb::storage::table::heap_file_iterator::{DbFileIterator, HeapFileIterator};
use heapdb::storage::table::table_heap::TableHeap;
use heapdb::types_db::type_id::TypeId;
use heapdb::types_db::value::Value;

use crate::common::logger::init_test_logger;

const TABLE_ID: u32 = 7;

struct ScanTestContext {
    bpm: Arc<BufferPoolManager>,
    heap: Arc<TableHeap>,
}

impl ScanTestContext {
    /// 32-byte pages holding three (INTEGER, INTEGER) rows each.
    fn new(pool_size: usize) -> Self {
        init_test_logger();
        let config = StorageConfig {
            buffer_pool_size: pool_size,
            page_size: 32,
            ..StorageConfig::default()
        };
        let schema = Schema::new(
            vec![TypeId::Integer, TypeId::Integer],
            vec![Some("id"), Some("score")],
        )
        .unwrap();
        let heap = Arc::new(TableHeap::from_config(TABLE_ID, schema, &config));
        let bpm = Arc::new(BufferPoolManager::from_config(
            &config,
            Arc::new(LockManager::new()),
        ));
        bpm.register_table(heap.clone());
        Self { bpm, heap }
    }

    fn insert_rows(&self, ids: std::ops::Range<i32>) -> Vec<RID> {
        ids.map(|id| {
            self.heap
                .insert_values(vec![Value::new(id), Value::new(id * 10)])
                .unwrap()
        })
        .collect()
    }

    fn cursor(&self, txn: &Arc<Transaction>) -> HeapFileIterator {
        self.heap
            .clone()
            .make_iterator(self.bpm.clone(), Arc::clone(txn))
    }
}

fn collect_ids(cursor: &mut HeapFileIterator) -> Vec<i32> {
    let mut ids = Vec::new();
    while cursor.has_next().unwrap() {
        let tuple = cursor.next().unwrap();
        ids.push(tuple.get_value(0).and_then(Value::as_integer).unwrap());
    }
    ids
}

#[test]
fn zero_page_table_is_exhausted_on_open() {
    let ctx = ScanTestContext::new(4);
    let txn = Arc::new(Transaction::new(1));
    let mut cursor = ctx.cursor(&txn);

    cursor.open().unwrap();
    assert!(!cursor.has_next().unwrap());
    assert_eq!(cursor.next().unwrap_err(), DBError::NoMoreRows);
    assert_eq!(ctx.bpm.get_num_cached_pages(), 0);
}

#[test]
fn scans_every_row_in_page_and_slot_order() {
    let ctx = ScanTestContext::new(8);
    ctx.insert_rows(0..8);
    assert_eq!(ctx.heap.num_pages(), 3);

    let txn = Arc::new(Transaction::new(1));
    let mut cursor = ctx.cursor(&txn);
    cursor.open().unwrap();
    assert_eq!(collect_ids(&mut cursor), (0..8).collect::<Vec<_>>());
    assert_eq!(cursor.next().unwrap_err(), DBError::NoMoreRows);
    cursor.close();
}

#[test]
fn empty_middle_and_last_pages_are_handled() {
    let ctx = ScanTestContext::new(8);
    let rids = ctx.insert_rows(0..6);
    for rid in &rids[3..6] {
        ctx.heap.delete_tuple(*rid).unwrap();
    }
    let tail = ctx.heap.add_empty_page();
    let last_row = ctx.heap.insert_values(vec![Value::new(42), Value::new(0)]).unwrap();
    // The freed slots on page 1 are reused first.
    assert_eq!(last_row.get_page_id(), HeapPageId::new(TABLE_ID, 1));
    ctx.heap.delete_tuple(last_row).unwrap();
    ctx.heap.add_empty_page();

    let txn = Arc::new(Transaction::new(1));
    let mut cursor = ctx.cursor(&txn);
    cursor.open().unwrap();
    assert_eq!(collect_ids(&mut cursor), vec![0, 1, 2]);
    // Lookahead walked all the way to the final page.
    assert_eq!(
        cursor.get_current_page_id(),
        Some(HeapPageId::new(TABLE_ID, tail + 1))
    );
}

#[test]
fn row_on_last_page_is_returned() {
    let ctx = ScanTestContext::new(8);
    let rids = ctx.insert_rows(0..7);
    assert_eq!(rids[6].get_page_id().get_page_number(), 2);
    for rid in &rids[..6] {
        ctx.heap.delete_tuple(*rid).unwrap();
    }

    let txn = Arc::new(Transaction::new(1));
    let mut cursor = ctx.cursor(&txn);
    cursor.open().unwrap();
    assert_eq!(collect_ids(&mut cursor), vec![6]);
    assert!(!cursor.has_next().unwrap());
}

#[test]
fn rewind_repeats_the_same_rows() {
    let ctx = ScanTestContext::new(8);
    ctx.insert_rows(0..5);

    let txn = Arc::new(Transaction::new(1));
    let mut cursor = ctx.cursor(&txn);
    cursor.open().unwrap();
    let first = collect_ids(&mut cursor);
    cursor.rewind().unwrap();
    let second = collect_ids(&mut cursor);
    assert_eq!(first, second);
    assert_eq!(first.len(), 5);
}

#[test]
fn close_is_idempotent_and_reopen_works() {
    let ctx = ScanTestContext::new(8);
    ctx.insert_rows(0..2);

    let txn = Arc::new(Transaction::new(1));
    let mut cursor = ctx.cursor(&txn);
    cursor.close();
    cursor.open().unwrap();
    cursor.next().unwrap();
    cursor.close();
    cursor.close();
    assert!(!cursor.is_open());
    assert!(!cursor.has_next().unwrap());
    assert_eq!(cursor.next().unwrap_err(), DBError::NoMoreRows);

    cursor.open().unwrap();
    assert_eq!(collect_ids(&mut cursor), vec![0, 1]);
}

#[test]
fn scan_works_with_a_pool_smaller_than_the_table() {
    let ctx = ScanTestContext::new(1);
    ctx.insert_rows(0..10);
    assert_eq!(ctx.heap.num_pages(), 4);

    let txn = Arc::new(Transaction::new(1));
    let mut cursor = ctx.cursor(&txn);
    cursor.open().unwrap();
    let rows: Result<Vec<_>, DBError> = cursor.rows().collect();
    assert_eq!(rows.unwrap().len(), 10);
    assert_eq!(ctx.bpm.get_num_cached_pages(), 1);
}

#[test]
fn scan_takes_shared_locks_only() {
    let ctx = ScanTestContext::new(8);
    ctx.insert_rows(0..7);

    let first = Arc::new(Transaction::new(1));
    let second = Arc::new(Transaction::new(2));
    let mut a = ctx.cursor(&first);
    let mut b = ctx.cursor(&second);
    a.open().unwrap();
    b.open().unwrap();
    assert_eq!(collect_ids(&mut a), collect_ids(&mut b));

    let lock_manager = ctx.bpm.get_lock_manager();
    for page in 0..3 {
        let pid = HeapPageId::new(TABLE_ID, page);
        assert!(lock_manager.holds_lock(1, pid));
        assert!(lock_manager.holds_lock(2, pid));
    }
}

#[test]
fn lock_conflict_aborts_the_scan() {
    let ctx = ScanTestContext::new(8);
    ctx.insert_rows(0..6);

    let writer = Transaction::new(10);
    ctx.bpm
        .get_page(&writer, HeapPageId::new(TABLE_ID, 1), Permissions::ReadWrite)
        .unwrap();

    let reader = Arc::new(Transaction::new(11));
    let mut cursor = ctx.cursor(&reader);
    cursor.open().unwrap();
    let results: Vec<Result<i32, DBError>> = cursor
        .rows()
        .map(|row| row.map(|t| t.get_value(0).and_then(Value::as_integer).unwrap()))
        .collect();

    assert_eq!(
        results,
        vec![Ok(0), Ok(1), Ok(2), Err(DBError::TransactionAborted(11))]
    );
    assert_eq!(reader.get_state(), TransactionState::Aborted);
    cursor.close();

    ctx.bpm.transaction_complete(&reader, false);
    assert!(!ctx.bpm.get_lock_manager().holds_lock(11, HeapPageId::new(TABLE_ID, 0)));
}

#[test]
fn aborted_transaction_cannot_open() {
    let ctx = ScanTestContext::new(8);
    ctx.insert_rows(0..1);

    let txn = Arc::new(Transaction::new(3));
    txn.abort();
    let mut cursor = ctx.cursor(&txn);
    assert_eq!(cursor.open().unwrap_err(), DBError::TransactionAborted(3));
    assert!(!cursor.is_open());
}

#[test]
fn committed_reader_lets_writer_in() {
    let ctx = ScanTestContext::new(8);
    ctx.insert_rows(0..2);

    let reader = Arc::new(Transaction::new(1));
    let mut cursor = ctx.cursor(&reader);
    cursor.open().unwrap();
    assert_eq!(collect_ids(&mut cursor), vec![0, 1]);
    cursor.close();
    ctx.bpm.transaction_complete(&reader, true);
    assert_eq!(reader.get_state(), TransactionState::Committed);

    let writer = Transaction::new(2);
    let page = ctx
        .bpm
        .get_page(&writer, HeapPageId::new(TABLE_ID, 0), Permissions::ReadWrite)
        .unwrap();
    assert_eq!(page.get_num_tuples(), 2);
}
