pub mod heap_page;
pub mod page_id;
