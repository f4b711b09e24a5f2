//! Periodic re-analysis scheduling.
//!
//! Each active session carries one deadline; the host drives the engine's
//! `tick()` which asks the schedule for due users. Deadlines are armed at
//! session start and cancelled at session end, so nothing fires after
//! teardown.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Cancellable per-user analysis deadlines.
#[derive(Debug, Clone)]
pub struct AnalysisSchedule {
    interval: Duration,
    deadlines: HashMap<String, DateTime<Utc>>,
}

impl AnalysisSchedule {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadlines: HashMap::new(),
        }
    }

    /// Arm (or re-arm) the user's deadline one interval from `now`.
    pub fn arm(&mut self, user_id: &str, now: DateTime<Utc>) {
        self.deadlines
            .insert(user_id.to_string(), now + self.interval);
    }

    /// Drop the user's deadline.
    pub fn cancel(&mut self, user_id: &str) {
        self.deadlines.remove(user_id);
    }

    /// Users whose deadline has passed, each re-armed for the next interval.
    /// Sorted for deterministic processing order.
    pub fn due(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let mut ready: Vec<String> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(user, _)| user.clone())
            .collect();
        ready.sort();

        for user in &ready {
            self.deadlines.insert(user.clone(), now + self.interval);
        }
        ready
    }

    pub fn is_armed(&self, user_id: &str) -> bool {
        self.deadlines.contains_key(user_id)
    }

    pub fn armed_count(&self) -> usize {
        self.deadlines.len()
    }
}
