//! `rigel-console` library crate.
//!
//! An offline-capable push-channel subscriber. Re-exports internal modules
//! for integration testing; the binary entrypoint lives in `main.rs`.

pub mod config;
pub mod fallback;
pub mod history;
pub mod link;
pub mod sink;
