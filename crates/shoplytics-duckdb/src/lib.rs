pub mod backend;
pub mod catalog_impl;
pub mod queries;
pub mod schema;
pub mod store_impl;

pub use backend::DuckDbBackend;

/// Re-exported so consumers (tests in particular) can reach
/// `shoplytics_duckdb::duckdb::params!` without declaring the dependency.
pub use duckdb;
