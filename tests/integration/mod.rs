//! Integration tests for the confkeep configuration persistence engine

mod comment_preservation;
mod settings_loading;
mod store_roundtrip;
pub mod test_utils;
