//! Helpers shared by the library's tests, benchmarks and integration tests

pub mod test_utils;

pub use test_utils::create_controlled_test_server_with_limit;
