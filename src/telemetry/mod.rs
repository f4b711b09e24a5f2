//! Best-effort diagnostics for the engagement engine.

pub mod counters;

pub use counters::{EngineTelemetry, SharedTelemetry, TelemetryStats};
