//! Unit test suite entry point.

mod config_tests;
mod ranking_tests;
