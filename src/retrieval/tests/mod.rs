//! Unit tests for the retrieval module.

mod adapter_tests;
mod config_tests;
