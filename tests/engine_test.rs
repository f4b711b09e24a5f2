//! Integration tests for the engagement engine.

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use pulsetrack::core::personalize::{
    ACTION_COMPLETE_PROFILE, ACTION_EXPLORE, ACTION_TRY_CONSULTATION,
};
use pulsetrack::{
    ClickPoint, ContentCategory, EngagementEngine, EngagementLevel, EngineConfig, ManualClock,
    SequentialIds, TrafficSource,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

fn engine_at(start: DateTime<Utc>) -> (EngagementEngine, ManualClock) {
    let clock = ManualClock::at(start);
    let engine = EngagementEngine::with_runtime(
        EngineConfig::default(),
        Box::new(clock.clone()),
        Box::new(SequentialIds::new("sess")),
    );
    (engine, clock)
}

#[test]
fn full_journey_produces_expected_profile() {
    let (mut engine, clock) = engine_at(t0());

    engine
        .start_session("user1", TrafficSource::Direct)
        .expect("tracked session");

    engine.on_navigate("user1", "/home", "Home");
    clock.advance_secs(10);
    engine.on_navigate("user1", "/departments", "Departments");
    clock.advance_secs(45);
    engine.on_navigate("user1", "/consultation/x", "Consultation");
    for _ in 0..4 {
        engine.on_click(
            "user1",
            "button.request-slot",
            Some(ClickPoint { x: 400.0, y: 500.0 }),
            None,
        );
    }
    clock.advance_secs(200);
    engine.end_session("user1");

    let profile = engine.behavior_profile("user1").expect("final analysis ran");
    assert_eq!(profile.page_view_count, 3);
    assert_eq!(profile.avg_time_per_page_ms, 85_000.0);
    assert!(!profile.bounced);
    assert!((profile.interaction_rate - 4.0 / 3.0).abs() < 1e-9);
    assert_eq!(profile.session_duration_ms, 255_000);
    assert!((0.0..=100.0).contains(&profile.engagement_score));

    // Score 32.5 from 3 views, 4 interactions, 4.25 minutes.
    let personalization = engine.personalization_profile("user1").unwrap();
    assert_eq!(personalization.engagement_level, EngagementLevel::Low);
}

#[test]
fn most_frequent_category_drives_recommendations() {
    let (mut engine, clock) = engine_at(t0());
    engine.start_session("user1", TrafficSource::Organic);

    engine.on_navigate("user1", "/home", "Home");
    clock.advance_secs(10);
    engine.on_navigate("user1", "/consultation/x", "Consultation");
    clock.advance_secs(60);
    engine.on_navigate("user1", "/consultation/x/summary", "Summary");
    clock.advance_secs(30);
    engine.end_session("user1");

    let personalization = engine.personalization_profile("user1").unwrap();
    assert_eq!(
        personalization.preferred_category,
        ContentCategory::Consultations
    );

    let content = engine.personalized_content("user1").unwrap();
    assert!(content
        .recommended_pages
        .contains(&"/consultation/new".to_string()));
}

#[test]
fn category_ties_resolve_to_first_seen() {
    // a, b, a with different categories
    let (mut engine, clock) = engine_at(t0());
    engine.start_session("user1", TrafficSource::Direct);
    engine.on_navigate("user1", "/appointments", "Appointments");
    clock.advance_secs(20);
    engine.on_navigate("user1", "/records", "Records");
    clock.advance_secs(20);
    engine.on_navigate("user1", "/appointments/book", "Book");
    clock.advance_secs(20);
    engine.end_session("user1");

    assert_eq!(
        engine
            .personalization_profile("user1")
            .unwrap()
            .preferred_category,
        ContentCategory::Appointments
    );

    // b then a, one each: the first-seen category wins
    let (mut engine, clock) = engine_at(t0());
    engine.start_session("user2", TrafficSource::Direct);
    engine.on_navigate("user2", "/records", "Records");
    clock.advance_secs(20);
    engine.on_navigate("user2", "/appointments", "Appointments");
    clock.advance_secs(20);
    engine.end_session("user2");

    assert_eq!(
        engine
            .personalization_profile("user2")
            .unwrap()
            .preferred_category,
        ContentCategory::HealthRecords
    );
}

#[test]
fn short_single_page_session_bounces_with_starter_hints() {
    let (mut engine, clock) = engine_at(t0());
    engine.start_session("user1", TrafficSource::Social);
    engine.on_navigate("user1", "/home", "Home");
    clock.advance_secs(5);
    engine.end_session("user1");

    let profile = engine.behavior_profile("user1").unwrap();
    assert!(profile.bounced);
    assert!(profile.engagement_score < 50.0);

    let content = engine.personalized_content("user1").unwrap();
    assert!(content
        .suggested_actions
        .contains(&ACTION_EXPLORE.to_string()));
    assert!(content
        .suggested_actions
        .contains(&ACTION_COMPLETE_PROFILE.to_string()));
    assert!(content
        .suggested_actions
        .contains(&ACTION_TRY_CONSULTATION.to_string()));
}

#[test]
fn bounce_boundary_is_thirty_seconds() {
    let (mut engine, clock) = engine_at(t0());
    engine.start_session("user1", TrafficSource::Direct);
    engine.on_navigate("user1", "/home", "Home");
    clock.advance_ms(29_999);
    engine.end_session("user1");
    assert!(engine.behavior_profile("user1").unwrap().bounced);

    let (mut engine, clock) = engine_at(t0());
    engine.start_session("user1", TrafficSource::Direct);
    engine.on_navigate("user1", "/home", "Home");
    clock.advance_ms(30_000);
    engine.end_session("user1");
    assert!(!engine.behavior_profile("user1").unwrap().bounced);
}

#[test]
fn engagement_score_stays_bounded_under_extreme_input() {
    // Zero events
    let (mut engine, _clock) = engine_at(t0());
    engine.start_session("user1", TrafficSource::Direct);
    engine.end_session("user1");
    let score = engine.behavior_profile("user1").unwrap().engagement_score;
    assert_eq!(score, 0.0);

    // Ten thousand events over a long session
    let (mut engine, clock) = engine_at(t0());
    engine.start_session("user2", TrafficSource::Direct);
    engine.on_navigate("user2", "/home", "Home");
    for i in 0..10_000 {
        engine.on_scroll("user2", (i % 100) as u8);
    }
    clock.advance_secs(7_200);
    engine.end_session("user2");
    let score = engine.behavior_profile("user2").unwrap().engagement_score;
    assert!((0.0..=100.0).contains(&score));
}

#[test]
fn prediction_confidence_decreases_with_horizon() {
    let (mut engine, clock) = engine_at(t0());
    for i in 0..5 {
        let user = format!("user{i}");
        engine.start_session(&user, TrafficSource::Organic);
        engine.on_navigate(&user, "/home", "Home");
        clock.advance_secs(120);
        engine.on_navigate(&user, "/departments", "Departments");
        clock.advance_secs(60);
        engine.end_session(&user);
    }

    let prediction = engine.performance_prediction().expect("profiles exist");
    assert!(prediction.one_month.confidence > prediction.one_year.confidence);
    assert!(prediction.one_year.confidence > prediction.five_year.confidence);
    assert!(prediction.one_month.expected_users < prediction.five_year.expected_users);
}

#[test]
fn ending_twice_has_single_end_effect() {
    let (mut engine, clock) = engine_at(t0());
    engine.start_session("user1", TrafficSource::Direct);
    engine.on_navigate("user1", "/home", "Home");
    clock.advance_secs(90);
    engine.end_session("user1");

    let after_first = engine.engagement_analytics();
    let stats_first = engine.telemetry_stats();

    clock.advance_secs(60);
    engine.end_session("user1");

    let after_second = engine.engagement_analytics();
    let stats_second = engine.telemetry_stats();

    assert_eq!(after_first.total_sessions, after_second.total_sessions);
    assert_eq!(
        after_first.avg_session_duration_ms,
        after_second.avg_session_duration_ms
    );
    assert_eq!(stats_first.sessions_ended, stats_second.sessions_ended);
}

#[test]
fn orphaned_events_never_crash_and_are_counted() {
    let (mut engine, _clock) = engine_at(t0());

    engine.on_navigate("ghost", "/home", "Home");
    engine.on_click("ghost", "button.cta", None, None);
    engine.on_scroll("ghost", 50);

    assert_eq!(engine.telemetry_stats().orphaned_events, 3);
    assert!(engine.behavior_profile("ghost").is_none());

    // Tracking still works once a session exists.
    engine.start_session("ghost", TrafficSource::Referral);
    engine.on_navigate("ghost", "/home", "Home");
    assert_eq!(engine.telemetry_stats().page_views_recorded, 1);
}

#[test]
fn periodic_analysis_runs_while_session_open() {
    let (mut engine, clock) = engine_at(t0());
    engine.start_session("user1", TrafficSource::Direct);
    engine.on_navigate("user1", "/analytics/overview", "Analytics");

    clock.advance_secs(61);
    engine.tick();

    // Personalization is readable mid-session, before any end.
    let profile = engine.behavior_profile("user1").expect("tick analyzed");
    assert_eq!(profile.page_view_count, 1);
    assert!(engine.personalized_content("user1").is_some());
    assert!(engine.performance_prediction().is_some());

    // After session end the deadline is gone.
    engine.end_session("user1");
    let passes = engine.telemetry_stats().analysis_passes;
    clock.advance_secs(600);
    engine.tick();
    assert_eq!(engine.telemetry_stats().analysis_passes, passes);
}

#[test]
fn rollup_reflects_sources_heatmap_and_rates() {
    let (mut engine, clock) = engine_at(t0());

    engine.start_session("user1", TrafficSource::Direct);
    engine.on_navigate("user1", "/home", "Home");
    engine.on_click(
        "user1",
        "button.cta",
        Some(ClickPoint { x: 101.0, y: 99.0 }),
        Some("Get started"),
    );
    engine.on_click(
        "user1",
        "button.cta",
        Some(ClickPoint { x: 108.0, y: 93.0 }),
        Some("Get started"),
    );
    clock.advance_secs(5);
    engine.end_session("user1");

    engine.start_session("user2", TrafficSource::Direct);
    engine.on_navigate("user2", "/departments", "Departments");
    clock.advance_secs(120);
    engine.on_navigate("user2", "/appointments", "Appointments");
    clock.advance_secs(60);
    engine.end_session("user2");

    let analytics = engine.engagement_analytics();
    assert_eq!(analytics.total_sessions, 2);
    assert_eq!(analytics.active_sessions, 0);
    assert_eq!(analytics.traffic_sources[&TrafficSource::Direct], 2);
    assert_eq!(analytics.bounce_rate, 0.5);

    // Both clicks land in the same 10px grid cell.
    assert_eq!(analytics.heatmap.len(), 1);
    assert_eq!(analytics.heatmap[0].count, 2);

    assert!(analytics.predictions.is_some());
}

#[test]
fn duplicate_start_closes_previous_session() {
    let (mut engine, clock) = engine_at(t0());

    let first = engine.start_session("user1", TrafficSource::Direct).unwrap();
    engine.on_navigate("user1", "/home", "Home");
    clock.advance_secs(40);

    let second = engine.start_session("user1", TrafficSource::Email).unwrap();
    assert_ne!(first, second);

    let analytics = engine.engagement_analytics();
    assert_eq!(analytics.total_sessions, 2);
    assert_eq!(analytics.active_sessions, 1);
    // The stale session was closed through the normal path and analyzed.
    assert_eq!(engine.telemetry_stats().sessions_ended, 1);
    assert_eq!(engine.behavior_profile("user1").unwrap().page_view_count, 1);
}
