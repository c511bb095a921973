mod heap_scan_tests;
