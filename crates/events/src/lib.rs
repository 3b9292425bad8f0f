//! Rigel engine event bus.
//!
//! [`EventBus`] is the in-process publish/subscribe hub that carries each
//! tick's output ([`EngineEvent`]) from the tick scheduler to every
//! consumer (the subscriber fan-out, tests, diagnostics).

pub mod bus;

pub use bus::{EngineEvent, EventBus};
