//! Personalization: inferred preferences and suggested content.
//!
//! Maps a session plus its behavior profile to a preference profile and a
//! concrete content bundle. Everything here is a deterministic lookup; the
//! only inference is picking the most-visited page category.

use crate::core::behavior::BehaviorProfile;
use crate::core::session::Session;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Coarse page category, inferred from the route path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    MedicalServices,
    Consultations,
    HealthRecords,
    Appointments,
    HealthAnalytics,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPattern {
    Short,
    Medium,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionStyle {
    Passive,
    Moderate,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentPriority {
    Low,
    Medium,
    High,
}

/// Inferred preferences for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalizationProfile {
    pub user_id: String,
    pub preferred_category: ContentCategory,
    pub engagement_level: EngagementLevel,
    pub session_pattern: SessionPattern,
    pub interaction_style: InteractionStyle,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub computed_at: DateTime<Utc>,
}

/// Concrete suggestions derived from a preference profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalizedContent {
    pub recommended_pages: Vec<String>,
    pub suggested_actions: Vec<String>,
    pub personalized_message: String,
    pub content_priority: ContentPriority,
}

/// Map a route path to its content category.
pub fn categorize(path: &str) -> ContentCategory {
    if path.contains("department") {
        ContentCategory::MedicalServices
    } else if path.contains("consultation") {
        ContentCategory::Consultations
    } else if path.contains("record") {
        ContentCategory::HealthRecords
    } else if path.contains("appointment") {
        ContentCategory::Appointments
    } else if path.contains("analytics") {
        ContentCategory::HealthAnalytics
    } else {
        ContentCategory::General
    }
}

/// Most-frequent category across the session's page views.
///
/// Ties resolve to the category seen first in navigation order; a session
/// with no page views falls back to General.
pub fn preferred_category(session: &Session) -> ContentCategory {
    let mut counts: HashMap<ContentCategory, usize> = HashMap::new();
    let mut first_seen: Vec<ContentCategory> = Vec::new();

    for view in &session.page_views {
        let category = categorize(&view.page);
        if !counts.contains_key(&category) {
            first_seen.push(category);
        }
        *counts.entry(category).or_insert(0) += 1;
    }

    // Strictly-greater replacement keeps the earliest category on ties.
    let mut best: Option<(ContentCategory, usize)> = None;
    for category in first_seen {
        let count = counts[&category];
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((category, count));
        }
    }
    best.map(|(category, _)| category)
        .unwrap_or(ContentCategory::General)
}

fn engagement_level(score: f64) -> EngagementLevel {
    if score > 70.0 {
        EngagementLevel::High
    } else if score > 40.0 {
        EngagementLevel::Medium
    } else {
        EngagementLevel::Low
    }
}

fn session_pattern(duration_ms: i64) -> SessionPattern {
    if duration_ms < 60_000 {
        SessionPattern::Short
    } else if duration_ms < 300_000 {
        SessionPattern::Medium
    } else {
        SessionPattern::Long
    }
}

fn interaction_style(rate: f64) -> InteractionStyle {
    if rate < 0.5 {
        InteractionStyle::Passive
    } else if rate < 2.0 {
        InteractionStyle::Moderate
    } else {
        InteractionStyle::Active
    }
}

fn recommended_pages(category: ContentCategory) -> Vec<String> {
    let pages: &[&str] = match category {
        ContentCategory::MedicalServices => &["/departments", "/departments/specialists"],
        ContentCategory::Consultations => &["/consultation/new", "/consultation/history"],
        ContentCategory::HealthRecords => &["/records", "/records/share"],
        ContentCategory::Appointments => &["/appointments/book", "/appointments/upcoming"],
        ContentCategory::HealthAnalytics => &["/analytics/overview", "/analytics/trends"],
        ContentCategory::General => &["/home"],
    };
    pages.iter().map(|p| p.to_string()).collect()
}

/// Hint shown when the engagement score is still low.
pub const ACTION_COMPLETE_PROFILE: &str = "Complete your health profile";
/// Hint shown to users who have seen little of the catalog.
pub const ACTION_EXPLORE: &str = "Browse departments and services";
/// Hint shown to users who have not tried the core booking flow.
pub const ACTION_TRY_CONSULTATION: &str = "Book your first consultation";

fn suggested_actions(profile: &BehaviorProfile) -> Vec<String> {
    let mut actions = Vec::new();
    if profile.engagement_score < 50.0 {
        actions.push(ACTION_COMPLETE_PROFILE.to_string());
    }
    if profile.page_view_count < 3 {
        actions.push(ACTION_EXPLORE.to_string());
    }
    if profile.interaction_rate < 1.0 {
        actions.push(ACTION_TRY_CONSULTATION.to_string());
    }
    actions
}

fn message_for(level: EngagementLevel) -> &'static str {
    match level {
        EngagementLevel::High => {
            "Welcome back! Your health dashboard is up to date and ready for you."
        }
        EngagementLevel::Medium => {
            "Good to see you again. We picked a few things you might find useful."
        }
        EngagementLevel::Low => {
            "Take a minute to look around. We highlighted a few places to start."
        }
    }
}

fn priority_for(level: EngagementLevel) -> ContentPriority {
    match level {
        EngagementLevel::High => ContentPriority::High,
        EngagementLevel::Medium => ContentPriority::Medium,
        EngagementLevel::Low => ContentPriority::Low,
    }
}

/// Build the preference profile and content bundle for a session.
pub fn personalize(
    session: &Session,
    profile: &BehaviorProfile,
    now: DateTime<Utc>,
) -> (PersonalizationProfile, PersonalizedContent) {
    let category = preferred_category(session);
    let level = engagement_level(profile.engagement_score);

    let personalization = PersonalizationProfile {
        user_id: session.user_id.clone(),
        preferred_category: category,
        engagement_level: level,
        session_pattern: session_pattern(profile.session_duration_ms),
        interaction_style: interaction_style(profile.interaction_rate),
        computed_at: now,
    };

    let content = PersonalizedContent {
        recommended_pages: recommended_pages(category),
        suggested_actions: suggested_actions(profile),
        personalized_message: message_for(level).to_string(),
        content_priority: priority_for(level),
    };

    (personalization, content)
}
