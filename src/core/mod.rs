//! Core analytics for the engagement engine.
//!
//! This module contains:
//! - Session model and lifecycle management
//! - Interaction and page-view recording
//! - Click heatmap aggregation
//! - Behavior analysis and the engagement score
//! - Personalization and performance projection
//! - The periodic re-analysis schedule

pub mod behavior;
pub mod heatmap;
pub mod personalize;
pub mod predict;
pub mod recorder;
pub mod schedule;
pub mod session;

// Re-export commonly used types
pub use behavior::{analyze, BehaviorProfile, BOUNCE_DWELL_MS};
pub use heatmap::{HeatBucket, HeatmapAggregator, HeatmapCell, DEFAULT_BUCKET_PX};
pub use personalize::{
    personalize, ContentCategory, ContentPriority, EngagementLevel, InteractionStyle,
    PersonalizationProfile, PersonalizedContent, SessionPattern,
};
pub use predict::{HorizonProjection, PerformancePrediction, PerformancePredictor};
pub use recorder::{InteractionRecorder, DEFAULT_MIN_DWELL_MS};
pub use schedule::AnalysisSchedule;
pub use session::{PageView, Session, SessionManager, TrafficSource};
