//! The engagement engine.
//!
//! One `EngagementEngine` instance owns all tracking state for an
//! application context: active sessions, the heatmap, derived-profile
//! caches, and the re-analysis schedule. All mutation goes through
//! `&mut self`; UI collaborators read the caches and never drive
//! computation directly.
//!
//! Every operation here is best-effort and infallible: a recording problem
//! is counted and logged, never surfaced as an error that could interrupt
//! the hosting application.

use crate::adapter::types::{
    ClickPoint, InteractionEvent, InteractionKind, NormalizedEvent, PageVisit, RawUiEvent,
};
use crate::config::EngineConfig;
use crate::core::behavior::{self, BehaviorProfile};
use crate::core::heatmap::{HeatmapAggregator, HeatmapCell};
use crate::core::personalize::{self, PersonalizationProfile, PersonalizedContent};
use crate::core::predict::{PerformancePrediction, PerformancePredictor};
use crate::core::recorder::InteractionRecorder;
use crate::core::schedule::AnalysisSchedule;
use crate::core::session::{SessionManager, TrafficSource};
use crate::runtime::{Clock, IdGenerator, SystemClock, UuidIds};
use crate::telemetry::{EngineTelemetry, SharedTelemetry, TelemetryStats};
use chrono::{DateTime, Utc};
use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Read-only rollup for dashboards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngagementAnalytics {
    pub total_sessions: u64,
    pub active_sessions: u64,
    pub avg_session_duration_ms: f64,
    /// Fraction of completed sessions that bounced
    pub bounce_rate: f64,
    pub traffic_sources: HashMap<TrafficSource, u64>,
    pub heatmap: Vec<HeatmapCell>,
    pub predictions: Option<PerformancePrediction>,
}

/// Session engagement analytics and personalization engine.
pub struct EngagementEngine {
    config: EngineConfig,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
    sessions: SessionManager,
    recorder: InteractionRecorder,
    heatmap: HeatmapAggregator,
    schedule: AnalysisSchedule,
    predictor: PerformancePredictor,
    telemetry: SharedTelemetry,
    /// Latest profile per user
    profiles: HashMap<String, BehaviorProfile>,
    /// Profiles of completed sessions, in completion order
    profile_history: Vec<BehaviorProfile>,
    personalization: HashMap<String, (PersonalizationProfile, PersonalizedContent)>,
    prediction: Option<PerformancePrediction>,
}

impl EngagementEngine {
    /// Create an engine with the system clock and random session ids.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_runtime(config, Box::new(SystemClock), Box::new(UuidIds))
    }

    /// Create an engine with injected clock and id generation.
    pub fn with_runtime(
        config: EngineConfig,
        clock: Box<dyn Clock>,
        ids: Box<dyn IdGenerator>,
    ) -> Self {
        let interval = chrono::Duration::from_std(config.analysis_interval)
            .unwrap_or_else(|_| chrono::Duration::seconds(60));
        let now = clock.now();

        Self {
            recorder: InteractionRecorder::new(config.min_dwell_ms as i64),
            heatmap: HeatmapAggregator::new(config.heatmap_bucket_px),
            schedule: AnalysisSchedule::new(interval),
            predictor: PerformancePredictor::new(config.trend_window),
            telemetry: Arc::new(EngineTelemetry::new(now)),
            sessions: SessionManager::new(),
            profiles: HashMap::new(),
            profile_history: Vec::new(),
            personalization: HashMap::new(),
            prediction: None,
            config,
            clock,
            ids,
        }
    }

    // ------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------

    /// Start a session for the user and tally its traffic source.
    ///
    /// Returns `None` for an empty user id: no identity means no tracking.
    /// A still-open session for the same user is closed first with a
    /// warning rather than silently overwritten.
    pub fn start_session(&mut self, user_id: &str, source: TrafficSource) -> Option<String> {
        if user_id.is_empty() {
            warn!("session start without a user id ignored");
            return None;
        }

        if self.sessions.is_active(user_id) {
            warn!(
                user = user_id,
                "session already active, closing it before starting a new one"
            );
            self.end_session(user_id);
        }

        let now = self.clock.now();
        let id = self.ids.next_session_id();
        self.sessions.open(user_id, &id, source, now);
        self.schedule.arm(user_id, now);
        self.telemetry.record_session_started();
        Some(id)
    }

    /// End the user's session: flush the open page view's dwell time, run
    /// the final analysis and personalization pass, and cancel the
    /// session's re-analysis deadline.
    ///
    /// A second call for the same user is a no-op.
    pub fn end_session(&mut self, user_id: &str) {
        let now = self.clock.now();

        if let Some(session) = self.sessions.active_mut(user_id) {
            self.recorder.finalize_open_view(session, now);
        }

        let computed = self.sessions.close(user_id, now).map(|closed| {
            let profile = behavior::analyze(closed, now);
            let bundle = personalize::personalize(closed, &profile, now);
            (profile, bundle)
        });
        let Some((profile, (personalization, content))) = computed else {
            return;
        };

        debug!(
            user = user_id,
            score = profile.engagement_score,
            "final analysis at session end"
        );

        self.profiles.insert(user_id.to_string(), profile.clone());
        self.profile_history.push(profile);
        self.personalization
            .insert(user_id.to_string(), (personalization, content));
        self.schedule.cancel(user_id);
        self.telemetry.record_session_ended();
        self.telemetry.record_analysis_pass();
        self.refresh_prediction(now);
    }

    // ------------------------------------------------------------------
    // Recording
    // ------------------------------------------------------------------

    /// Normalize and record one raw UI event, stamped with the engine clock.
    pub fn ingest(&mut self, user_id: &str, event: RawUiEvent) {
        match event.normalize(self.clock.now()) {
            NormalizedEvent::PageVisit(visit) => self.record_page_view(user_id, &visit),
            NormalizedEvent::Interaction(interaction) => {
                self.record_interaction(user_id, interaction)
            }
        }
    }

    /// Drain every pending event from an input-source channel.
    pub fn drain(&mut self, user_id: &str, receiver: &Receiver<RawUiEvent>) -> usize {
        let mut drained = 0;
        while let Ok(event) = receiver.try_recv() {
            self.ingest(user_id, event);
            drained += 1;
        }
        drained
    }

    /// Record a navigation, finalizing the previous page view's dwell time.
    pub fn record_page_view(&mut self, user_id: &str, visit: &PageVisit) {
        let now = self.clock.now();
        match self.sessions.active_mut(user_id) {
            Some(session) => {
                self.recorder.record_page_view(session, visit, now);
                self.telemetry.record_page_view();
            }
            None => self.drop_orphaned(user_id, "page_view"),
        }
    }

    /// Append an interaction to the user's active session. Clicks with
    /// coordinates also feed the heatmap.
    pub fn record_interaction(&mut self, user_id: &str, event: InteractionEvent) {
        let click_point = match event.kind {
            InteractionKind::Click => event.coordinates,
            _ => None,
        };

        match self.sessions.active_mut(user_id) {
            Some(session) => {
                self.recorder.record_interaction(session, event);
                self.telemetry.record_interaction();
                if let Some(point) = click_point {
                    self.heatmap.record_click(point);
                }
            }
            None => self.drop_orphaned(user_id, "interaction"),
        }
    }

    fn drop_orphaned(&self, user_id: &str, kind: &str) {
        self.telemetry.record_orphaned_event();
        warn!(user = user_id, kind, "event dropped, no active session");
    }

    // ------------------------------------------------------------------
    // Inbound convenience surface
    // ------------------------------------------------------------------

    pub fn on_navigate(&mut self, user_id: &str, path: &str, title: &str) {
        self.record_page_view(user_id, &PageVisit::new(path, title));
    }

    pub fn on_click(
        &mut self,
        user_id: &str,
        element: &str,
        coordinates: Option<ClickPoint>,
        text: Option<&str>,
    ) {
        let now = self.clock.now();
        let event = InteractionEvent::click(element, coordinates, text.map(str::to_string), now);
        self.record_interaction(user_id, event);
    }

    pub fn on_scroll(&mut self, user_id: &str, depth_percent: u8) {
        let now = self.clock.now();
        self.record_interaction(user_id, InteractionEvent::scroll(depth_percent, now));
    }

    pub fn on_form_submit(&mut self, user_id: &str, form: &str) {
        let now = self.clock.now();
        self.record_interaction(user_id, InteractionEvent::form_submit(form, now));
    }

    pub fn on_quick_action(&mut self, user_id: &str, name: &str) {
        let now = self.clock.now();
        self.record_interaction(user_id, InteractionEvent::quick_action(name, now));
    }

    // ------------------------------------------------------------------
    // Periodic analysis
    // ------------------------------------------------------------------

    /// Run due re-analysis passes. The host calls this from its event loop;
    /// nothing runs between ticks.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        for user in self.schedule.due(now) {
            self.refresh_user(&user, now);
        }
    }

    fn refresh_user(&mut self, user_id: &str, now: DateTime<Utc>) {
        let computed = self.sessions.active(user_id).map(|session| {
            let profile = behavior::analyze(session, now);
            let bundle = personalize::personalize(session, &profile, now);
            (profile, bundle)
        });
        let Some((profile, (personalization, content))) = computed else {
            // Deadline outlived its session; drop it.
            self.schedule.cancel(user_id);
            return;
        };

        debug!(
            user = user_id,
            score = profile.engagement_score,
            "periodic analysis pass"
        );

        self.profiles.insert(user_id.to_string(), profile);
        self.personalization
            .insert(user_id.to_string(), (personalization, content));
        self.telemetry.record_analysis_pass();
        self.refresh_prediction(now);
    }

    fn refresh_prediction(&mut self, now: DateTime<Utc>) {
        let mut profiles = self.profile_history.clone();

        // Freshest profile of each still-active session, in a stable order.
        let mut active: Vec<&BehaviorProfile> = self
            .profiles
            .iter()
            .filter(|(user, _)| self.sessions.is_active(user))
            .map(|(_, profile)| profile)
            .collect();
        active.sort_by(|a, b| a.computed_at.cmp(&b.computed_at).then(a.user_id.cmp(&b.user_id)));
        profiles.extend(active.into_iter().cloned());

        let views = self.sessions.total_page_views();
        self.prediction = self.predictor.predict(&profiles, views, now);
    }

    // ------------------------------------------------------------------
    // Outbound surface
    // ------------------------------------------------------------------

    pub fn behavior_profile(&self, user_id: &str) -> Option<&BehaviorProfile> {
        self.profiles.get(user_id)
    }

    pub fn personalization_profile(&self, user_id: &str) -> Option<&PersonalizationProfile> {
        self.personalization.get(user_id).map(|(profile, _)| profile)
    }

    pub fn personalized_content(&self, user_id: &str) -> Option<&PersonalizedContent> {
        self.personalization.get(user_id).map(|(_, content)| content)
    }

    pub fn heatmap_snapshot(&self) -> Vec<HeatmapCell> {
        self.heatmap.snapshot()
    }

    pub fn performance_prediction(&self) -> Option<&PerformancePrediction> {
        self.prediction.as_ref()
    }

    /// Shared handle to the diagnostics counters.
    pub fn telemetry(&self) -> SharedTelemetry {
        Arc::clone(&self.telemetry)
    }

    pub fn telemetry_stats(&self) -> TelemetryStats {
        self.telemetry.stats()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Dashboard rollup of everything the engine knows.
    pub fn engagement_analytics(&self) -> EngagementAnalytics {
        let completed = self.profile_history.len();
        let bounced = self
            .profile_history
            .iter()
            .filter(|profile| profile.bounced)
            .count();
        let bounce_rate = if completed == 0 {
            0.0
        } else {
            bounced as f64 / completed as f64
        };

        EngagementAnalytics {
            total_sessions: self.sessions.total_sessions() as u64,
            active_sessions: self.sessions.active_count() as u64,
            avg_session_duration_ms: self.sessions.avg_completed_duration_ms(),
            bounce_rate,
            traffic_sources: self.sessions.attribution().clone(),
            heatmap: self.heatmap.snapshot(),
            predictions: self.prediction.clone(),
        }
    }
}
