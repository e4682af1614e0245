//! Integration test suite entry point.

mod store_tests;
