//! Engine diagnostics counters.
//!
//! Tracking is best-effort: events recorded against a user with no active
//! session are dropped rather than surfaced as errors, so these counters
//! are the only place that loss is visible. Counters are atomic so a host
//! can hold a shared read-only handle on another thread.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Running counters for one engine instance.
#[derive(Debug)]
pub struct EngineTelemetry {
    sessions_started: AtomicU64,
    sessions_ended: AtomicU64,
    page_views_recorded: AtomicU64,
    interactions_recorded: AtomicU64,
    /// Events dropped because no session was active for the user
    orphaned_events: AtomicU64,
    analysis_passes: AtomicU64,
    engine_start: DateTime<Utc>,
}

impl EngineTelemetry {
    pub fn new(engine_start: DateTime<Utc>) -> Self {
        Self {
            sessions_started: AtomicU64::new(0),
            sessions_ended: AtomicU64::new(0),
            page_views_recorded: AtomicU64::new(0),
            interactions_recorded: AtomicU64::new(0),
            orphaned_events: AtomicU64::new(0),
            analysis_passes: AtomicU64::new(0),
            engine_start,
        }
    }

    pub fn record_session_started(&self) {
        self.sessions_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_session_ended(&self) {
        self.sessions_ended.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_page_view(&self) {
        self.page_views_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_interaction(&self) {
        self.interactions_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_orphaned_event(&self) {
        self.orphaned_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_analysis_pass(&self) {
        self.analysis_passes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn orphaned_events(&self) -> u64 {
        self.orphaned_events.load(Ordering::Relaxed)
    }

    /// Get the current statistics.
    pub fn stats(&self) -> TelemetryStats {
        TelemetryStats {
            sessions_started: self.sessions_started.load(Ordering::Relaxed),
            sessions_ended: self.sessions_ended.load(Ordering::Relaxed),
            page_views_recorded: self.page_views_recorded.load(Ordering::Relaxed),
            interactions_recorded: self.interactions_recorded.load(Ordering::Relaxed),
            orphaned_events: self.orphaned_events.load(Ordering::Relaxed),
            analysis_passes: self.analysis_passes.load(Ordering::Relaxed),
            engine_start: self.engine_start,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Engine Statistics:\n\
             - Sessions started: {}\n\
             - Sessions ended: {}\n\
             - Page views recorded: {}\n\
             - Interactions recorded: {}\n\
             - Orphaned events dropped: {}\n\
             - Analysis passes: {}",
            stats.sessions_started,
            stats.sessions_ended,
            stats.page_views_recorded,
            stats.interactions_recorded,
            stats.orphaned_events,
            stats.analysis_passes
        )
    }
}

/// Snapshot of telemetry counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryStats {
    pub sessions_started: u64,
    pub sessions_ended: u64,
    pub page_views_recorded: u64,
    pub interactions_recorded: u64,
    pub orphaned_events: u64,
    pub analysis_passes: u64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub engine_start: DateTime<Utc>,
}

/// Thread-safe shared telemetry handle.
pub type SharedTelemetry = Arc<EngineTelemetry>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let telemetry = EngineTelemetry::new(Utc::now());

        telemetry.record_session_started();
        telemetry.record_page_view();
        telemetry.record_page_view();
        telemetry.record_orphaned_event();

        let stats = telemetry.stats();
        assert_eq!(stats.sessions_started, 1);
        assert_eq!(stats.page_views_recorded, 2);
        assert_eq!(stats.orphaned_events, 1);
        assert_eq!(stats.sessions_ended, 0);
    }

    #[test]
    fn test_summary_format() {
        let telemetry = EngineTelemetry::new(Utc::now());
        telemetry.record_interaction();

        let summary = telemetry.summary();
        assert!(summary.contains("Interactions recorded: 1"));
        assert!(summary.contains("Orphaned events dropped: 0"));
    }
}
