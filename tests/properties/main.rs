//! Property test suite entry point.

mod normalize_properties;
mod ranking_properties;
