mod common;
mod crawl_tests;
mod static_source_tests;
