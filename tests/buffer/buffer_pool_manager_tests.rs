use std::io::Write;
use std::sync::Arc;
use std::thread;

use heapdb::buffer::buffer_pool_manager::BufferPoolManager;
use heapdb::buffer::page_cache::{PageCache, Permissions};
use heapdb::catalog::schema::Schema;
use heapdb::common::config::StorageConfig;
use heapdb::common::exception::DBError;
use heapdb::concurrency::lock_manager::LockManager;
use heapdb::concurrency::transaction::Transaction;
use heapdb::storage::page::page_id::HeapPageId;
use heapdb::storage::table::heap_file_iterator::DbFileIterator;
use heapdb::storage::table::table_heap::TableHeap;
use heapdb::types_db::type_id::TypeId;
use heapdb::types_db::value::Value;
use tempfile::NamedTempFile;

use crate::common::logger::init_test_logger;

fn load_config(contents: &str) -> StorageConfig {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    StorageConfig::load(file.path()).unwrap()
}

fn text_table(table_id: u32, config: &StorageConfig, rows: usize) -> Arc<TableHeap> {
    let schema = Schema::new(vec![TypeId::VarChar], vec![Some("word")]).unwrap();
    let heap = Arc::new(TableHeap::from_config(table_id, schema, config));
    for i in 0..rows {
        heap.insert_values(vec![Value::new(format!("row-{}", i))])
            .unwrap();
    }
    heap
}

#[test]
fn pool_is_sized_from_config_file() {
    init_test_logger();
    let config = load_config("buffer_pool_size = 3\npage_size = 512\n");
    let bpm = BufferPoolManager::from_config(&config, Arc::new(LockManager::new()));
    assert_eq!(bpm.get_pool_size(), 3);

    // 132-byte rows on 512-byte pages: 3 slots each
    let heap = text_table(1, &config, 15);
    assert_eq!(heap.get_slots_per_page(), 3);
    bpm.register_table(heap);

    let txn = Transaction::new(1);
    for page in 0..5 {
        bpm.get_page(&txn, HeapPageId::new(1, page), Permissions::ReadOnly)
            .unwrap();
    }
    assert_eq!(bpm.get_num_cached_pages(), 3);
    assert!(bpm.is_cached(HeapPageId::new(1, 4)));
    assert!(!bpm.is_cached(HeapPageId::new(1, 1)));
}

#[test]
fn pages_are_routed_by_table_id() {
    init_test_logger();
    let config = StorageConfig::default();
    let bpm = BufferPoolManager::from_config(&config, Arc::new(LockManager::new()));
    let small = text_table(1, &config, 1);
    let large = text_table(2, &config, 40);
    let slots = large.get_slots_per_page();
    bpm.register_table(small);
    bpm.register_table(large);

    let txn = Transaction::new(1);
    let a = bpm
        .get_page(&txn, HeapPageId::new(1, 0), Permissions::ReadOnly)
        .unwrap();
    let b = bpm
        .get_page(&txn, HeapPageId::new(2, 0), Permissions::ReadOnly)
        .unwrap();
    assert_eq!(a.get_num_tuples(), 1);
    assert_eq!(b.get_num_tuples(), slots);
    assert!(matches!(
        bpm.get_page(&txn, HeapPageId::new(3, 0), Permissions::ReadOnly),
        Err(DBError::Storage(_))
    ));
}

#[test]
fn concurrent_readers_share_the_pool() {
    init_test_logger();
    let config = load_config("buffer_pool_size = 2\npage_size = 512\n");
    let bpm = Arc::new(BufferPoolManager::from_config(
        &config,
        Arc::new(LockManager::new()),
    ));
    let heap = text_table(9, &config, 20);
    bpm.register_table(heap.clone());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let bpm = Arc::clone(&bpm);
            let heap = Arc::clone(&heap);
            thread::spawn(move || {
                let txn = Arc::new(Transaction::begin());
                let mut cursor = heap.make_iterator(bpm.clone(), Arc::clone(&txn));
                cursor.open().unwrap();
                let mut count = 0;
                while cursor.has_next().unwrap() {
                    cursor.next().unwrap();
                    count += 1;
                }
                cursor.close();
                bpm.transaction_complete(&txn, true);
                count
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 20);
    }
    assert!(bpm.get_num_cached_pages() <= 2);
    assert_eq!(bpm.get_lock_manager().get_active_lock_count(), 0);
}
