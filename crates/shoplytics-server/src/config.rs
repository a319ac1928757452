/// Re-export `Config` from `shoplytics-core` for use within this crate.
///
/// Environment-variable parsing lives in `shoplytics-core` so integration
/// tests and future crates can reach it without pulling in the whole
/// server.
pub use shoplytics_core::config::Config;
