//! # talik-telemetry
//!
//! Structured telemetry for the coupling driver: typed events emitted at
//! defined points of the time-stepping and Schwarz loops, dispatched
//! through a broadcast bus to pluggable sinks.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{CouplingEvent, EventKind};
pub use sinks::{EventSink, TracingSink, VecSink};
