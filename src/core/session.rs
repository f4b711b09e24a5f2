//! Session model and lifecycle management.
//!
//! A session is one continuous tracked visit by a user. The manager owns
//! every session for its active lifetime; once closed, a session moves into
//! the history list and is never mutated again.

use crate::adapter::types::InteractionEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where the visit came from. Set once at session start, immutable after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficSource {
    Organic,
    Social,
    Direct,
    Referral,
    Email,
}

/// One page opened during a session.
///
/// The most recent page view of an active session is "open": its dwell time
/// and interaction count keep updating until the next navigation (or session
/// end) freezes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageView {
    /// Path or route identifier
    pub page: String,
    /// Document title
    pub title: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Dwell time in milliseconds, zero until finalized
    pub time_spent_ms: i64,
    /// Last observed scroll depth, 0 to 100
    pub scroll_depth: u8,
    /// Interactions recorded while this page was open
    pub interaction_count: u32,
}

impl PageView {
    pub fn open(page: &str, title: &str, at: DateTime<Utc>) -> Self {
        Self {
            page: page.to_string(),
            title: title.to_string(),
            timestamp: at,
            time_spent_ms: 0,
            scroll_depth: 0,
            interaction_count: 0,
        }
    }
}

/// One continuous tracked visit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub end_time: Option<DateTime<Utc>>,
    pub source: TrafficSource,
    /// Chronological page views; the last one is open while the session is active
    pub page_views: Vec<PageView>,
    /// Append-only interaction log in arrival order
    pub interactions: Vec<InteractionEvent>,
    pub is_active: bool,
}

impl Session {
    fn open(id: &str, user_id: &str, source: TrafficSource, at: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            user_id: user_id.to_string(),
            start_time: at,
            end_time: None,
            source,
            page_views: Vec::new(),
            interactions: Vec::new(),
            is_active: true,
        }
    }

    /// Elapsed milliseconds, against the close time once ended.
    pub fn duration_ms(&self, now: DateTime<Utc>) -> i64 {
        (self.end_time.unwrap_or(now) - self.start_time).num_milliseconds()
    }

    /// Duration of a closed session, `None` while still active.
    pub fn completed_duration_ms(&self) -> Option<i64> {
        self.end_time
            .map(|end| (end - self.start_time).num_milliseconds())
    }

    /// Sum of finalized dwell times across all page views.
    pub fn total_dwell_ms(&self) -> i64 {
        self.page_views.iter().map(|pv| pv.time_spent_ms).sum()
    }
}

/// Owns all sessions and the per-source attribution tally.
#[derive(Debug, Default)]
pub struct SessionManager {
    active: HashMap<String, Session>,
    history: Vec<Session>,
    attribution: HashMap<TrafficSource, u64>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new session for the user and tally its traffic source.
    ///
    /// The caller must have closed any previous session for this user first.
    pub fn open(&mut self, user_id: &str, id: &str, source: TrafficSource, now: DateTime<Utc>) {
        *self.attribution.entry(source).or_insert(0) += 1;
        self.active
            .insert(user_id.to_string(), Session::open(id, user_id, source, now));
    }

    /// Close the user's active session, moving it into history.
    ///
    /// Returns the now-immutable record, or `None` when no session is open.
    pub fn close(&mut self, user_id: &str, now: DateTime<Utc>) -> Option<&Session> {
        let mut session = self.active.remove(user_id)?;
        session.end_time = Some(now);
        session.is_active = false;
        self.history.push(session);
        self.history.last()
    }

    pub fn is_active(&self, user_id: &str) -> bool {
        self.active.contains_key(user_id)
    }

    pub fn active(&self, user_id: &str) -> Option<&Session> {
        self.active.get(user_id)
    }

    pub fn active_mut(&mut self, user_id: &str) -> Option<&mut Session> {
        self.active.get_mut(user_id)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Closed sessions in the order they ended.
    pub fn completed(&self) -> &[Session] {
        &self.history
    }

    pub fn total_sessions(&self) -> usize {
        self.active.len() + self.history.len()
    }

    /// Running attribution tally, keyed by traffic source.
    pub fn attribution(&self) -> &HashMap<TrafficSource, u64> {
        &self.attribution
    }

    /// Total page views recorded across active and closed sessions.
    pub fn total_page_views(&self) -> u64 {
        let active: usize = self.active.values().map(|s| s.page_views.len()).sum();
        let closed: usize = self.history.iter().map(|s| s.page_views.len()).sum();
        (active + closed) as u64
    }

    /// Mean duration of closed sessions in milliseconds.
    pub fn avg_completed_duration_ms(&self) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        let total: i64 = self
            .history
            .iter()
            .filter_map(|s| s.completed_duration_ms())
            .sum();
        total as f64 / self.history.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_open_and_close_session() {
        let mut manager = SessionManager::new();
        manager.open("user1", "sess-1", TrafficSource::Direct, t0());

        assert!(manager.is_active("user1"));
        assert_eq!(manager.active_count(), 1);
        assert_eq!(manager.total_sessions(), 1);

        let closed = manager
            .close("user1", t0() + chrono::Duration::seconds(120))
            .unwrap();
        assert!(!closed.is_active);
        assert_eq!(closed.duration_ms(t0()), 120_000);

        assert!(!manager.is_active("user1"));
        assert_eq!(manager.completed().len(), 1);
        assert_eq!(manager.total_sessions(), 1);
    }

    #[test]
    fn test_close_without_active_session() {
        let mut manager = SessionManager::new();
        assert!(manager.close("user1", t0()).is_none());
    }

    #[test]
    fn test_attribution_tally_is_monotonic() {
        let mut manager = SessionManager::new();
        manager.open("user1", "s1", TrafficSource::Social, t0());
        manager.close("user1", t0());
        manager.open("user1", "s2", TrafficSource::Social, t0());
        manager.open("user2", "s3", TrafficSource::Email, t0());

        assert_eq!(manager.attribution()[&TrafficSource::Social], 2);
        assert_eq!(manager.attribution()[&TrafficSource::Email], 1);
        assert!(!manager.attribution().contains_key(&TrafficSource::Organic));
    }

    #[test]
    fn test_avg_completed_duration() {
        let mut manager = SessionManager::new();
        manager.open("user1", "s1", TrafficSource::Direct, t0());
        manager.close("user1", t0() + chrono::Duration::seconds(60));
        manager.open("user2", "s2", TrafficSource::Direct, t0());
        manager.close("user2", t0() + chrono::Duration::seconds(180));

        assert_eq!(manager.avg_completed_duration_ms(), 120_000.0);
    }

    #[test]
    fn test_session_serialization_epoch_millis() {
        let session = Session::open("s1", "user1", TrafficSource::Referral, t0());
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["start_time"], serde_json::json!(t0().timestamp_millis()));
        assert_eq!(json["end_time"], serde_json::Value::Null);
        assert_eq!(json["source"], "referral");
    }
}
