//! Rigel habitat telemetry engine.
//!
//! Pure domain logic shared by the authoritative server and the
//! offline-capable console: the sensor catalog and value evolution, the
//! threshold classifier, the action resolver, the deduplicating alert log,
//! and the [`Engine`](engine::Engine) facade that drives them one tick at
//! a time. Nothing in this crate performs I/O.

pub mod actions;
pub mod alert;
pub mod alert_log;
pub mod config;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod sensors;
pub mod thresholds;
pub mod types;
