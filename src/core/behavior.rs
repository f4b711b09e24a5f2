//! Behavior analysis: derived engagement metrics for one session.
//!
//! `analyze` is a pure function over a session snapshot. It is run on the
//! periodic cadence and at session end, never per event.

use crate::core::session::Session;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dwell ceiling below which a single-page session counts as a bounce.
pub const BOUNCE_DWELL_MS: i64 = 30_000;

/// Per-page-view contribution to the engagement score, capped at 100.
const PAGE_VIEW_WEIGHT: f64 = 10.0;
const PAGE_VIEW_WEIGHT_CAP: f64 = 100.0;

/// Per-interaction contribution, capped at 50.
const INTERACTION_WEIGHT: f64 = 5.0;
const INTERACTION_WEIGHT_CAP: f64 = 50.0;

/// Per-minute-of-session contribution, capped at 30.
const DURATION_WEIGHT_PER_MIN: f64 = 2.0;
const DURATION_WEIGHT_CAP: f64 = 30.0;

const WEIGHT_TOTAL: f64 = PAGE_VIEW_WEIGHT_CAP + INTERACTION_WEIGHT_CAP + DURATION_WEIGHT_CAP;

/// Derived engagement metrics for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorProfile {
    pub session_id: String,
    pub user_id: String,
    pub session_duration_ms: i64,
    pub page_view_count: u32,
    pub avg_time_per_page_ms: f64,
    /// Interactions per page view
    pub interaction_rate: f64,
    /// Single page view with very short total dwell
    pub bounced: bool,
    /// 0 to 100
    pub engagement_score: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub computed_at: DateTime<Utc>,
}

/// Compute a behavior profile from a session snapshot.
///
/// `now` only matters for still-active sessions; a closed session is
/// measured against its own end time.
pub fn analyze(session: &Session, now: DateTime<Utc>) -> BehaviorProfile {
    let page_views = session.page_views.len();
    let interactions = session.interactions.len();

    let total_dwell_ms = session.total_dwell_ms();
    let avg_time_per_page_ms = total_dwell_ms as f64 / page_views.max(1) as f64;
    let interaction_rate = interactions as f64 / page_views.max(1) as f64;
    let bounced = page_views == 1 && total_dwell_ms < BOUNCE_DWELL_MS;

    let page_weight = (page_views as f64 * PAGE_VIEW_WEIGHT).min(PAGE_VIEW_WEIGHT_CAP);
    let interaction_weight = (interactions as f64 * INTERACTION_WEIGHT).min(INTERACTION_WEIGHT_CAP);
    let duration_min = session.duration_ms(now) as f64 / 60_000.0;
    let duration_weight = (duration_min * DURATION_WEIGHT_PER_MIN).min(DURATION_WEIGHT_CAP);

    let engagement_score = ((page_weight + interaction_weight + duration_weight) / WEIGHT_TOTAL
        * 100.0)
        .clamp(0.0, 100.0);

    BehaviorProfile {
        session_id: session.id.clone(),
        user_id: session.user_id.clone(),
        session_duration_ms: session.duration_ms(now),
        page_view_count: page_views as u32,
        avg_time_per_page_ms,
        interaction_rate,
        bounced,
        engagement_score,
        computed_at: now,
    }
}
