//! Simulation orchestration: the tick driver

pub mod tick;

pub use tick::{tick, TickOutcome};
