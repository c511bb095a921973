pub mod db_file;
pub mod heap_file_iterator;
pub mod table_heap;
pub mod tuple;
