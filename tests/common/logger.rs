use heapdb::common::logger as core_logger;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_test_logger() {
    INIT.call_once(|| {
        // Default to INFO; override via RUST_LOG when needed
        if std::env::var("RUST_LOG").is_err() {
            std::env::set_var("RUST_LOG", "info");
        }
        core_logger::initialize_logger();
    });
}
