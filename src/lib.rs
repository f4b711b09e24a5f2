//! PulseTrack - session engagement analytics and personalization engine.
//!
//! This library observes a user's in-app behavior (page views, clicks,
//! scrolling, form submissions), aggregates it into per-session and
//! per-user statistics, derives an engagement score, and uses it to
//! generate personalized content suggestions and coarse performance
//! projections. Everything is in-memory and best-effort: tracking backs a
//! live UI and must never interrupt it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Engagement Engine                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌──────────────┐   ┌───────────────────┐   │
//! │  │  Adapter  │──▶│  Sessions +  │──▶│ Behavior Analysis │   │
//! │  │ (channel) │   │   Recorder   │   │   (60s + final)   │   │
//! │  └───────────┘   └──────────────┘   └───────────────────┘   │
//! │        │                 │                    │              │
//! │        ▼                 ▼                    ▼              │
//! │  ┌───────────┐   ┌──────────────┐   ┌───────────────────┐   │
//! │  │  Heatmap  │   │  Telemetry   │   │ Personalization + │   │
//! │  │ (clicks)  │   │  (counters)  │   │    Projections    │   │
//! │  └───────────┘   └──────────────┘   └───────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use pulsetrack::{EngagementEngine, EngineConfig, TrafficSource};
//!
//! let mut engine = EngagementEngine::new(EngineConfig::default());
//!
//! engine.start_session("user1", TrafficSource::Direct);
//! engine.on_navigate("user1", "/departments", "Departments");
//! engine.on_scroll("user1", 60);
//! engine.end_session("user1");
//!
//! let profile = engine.behavior_profile("user1").expect("analyzed at end");
//! assert_eq!(profile.page_view_count, 1);
//! ```

pub mod adapter;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod runtime;
pub mod telemetry;

// Re-export key types at crate root for convenience
pub use adapter::{
    ClickPoint, InputEventSource, InteractionEvent, InteractionKind, PageVisit, RawUiEvent,
    ScriptedSource,
};
pub use config::EngineConfig;
pub use core::{
    BehaviorProfile, ContentCategory, EngagementLevel, HeatmapCell, PerformancePrediction,
    PersonalizationProfile, PersonalizedContent, TrafficSource,
};
pub use engine::{EngagementAnalytics, EngagementEngine};
pub use error::EngineError;
pub use runtime::{Clock, IdGenerator, ManualClock, SequentialIds, SystemClock, UuidIds};
pub use telemetry::{EngineTelemetry, SharedTelemetry, TelemetryStats};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
