//! Performance projections.
//!
//! A coarse compounding-growth model, not a statistical forecast: users
//! compound at a fixed monthly rate over each horizon, engagement drifts
//! with the same shape, and confidence decays as the horizon lengthens.

use crate::core::behavior::BehaviorProfile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Monthly compounding factor for the user projection.
pub const MONTHLY_USER_GROWTH: f64 = 1.1;

/// Monthly drift applied to the engagement projection.
const MONTHLY_ENGAGEMENT_DRIFT: f64 = 1.02;

/// Monthly drift applied to the conversion projection.
const MONTHLY_CONVERSION_DRIFT: f64 = 1.01;

/// Conversion rate assumed before any trend adjustment.
const BASE_CONVERSION: f64 = 0.04;

/// Engagement score treated as the neutral trend baseline.
const TREND_BASELINE_SCORE: f64 = 50.0;

/// How many of the latest profiles feed the conversion trend.
pub const DEFAULT_TREND_WINDOW: usize = 10;

const HORIZON_MONTHS: [i32; 3] = [1, 12, 60];
const HORIZON_CONFIDENCE: [f64; 3] = [0.85, 0.65, 0.45];

/// Projection for one forward time window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorizonProjection {
    pub expected_users: f64,
    /// 0 to 100
    pub expected_engagement: f64,
    /// 0 to 1
    pub expected_conversion: f64,
    /// 0 to 1, strictly decreasing across horizons
    pub confidence: f64,
}

/// Growth projections across the three standard horizons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformancePrediction {
    pub one_month: HorizonProjection,
    pub one_year: HorizonProjection,
    pub five_year: HorizonProjection,
    pub avg_engagement_score: f64,
    /// Roughly -0.5 to 0.5, from recent profiles vs. the neutral baseline
    pub conversion_trend: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub computed_at: DateTime<Utc>,
}

/// Aggregates behavior profiles into growth projections.
#[derive(Debug, Clone, Copy)]
pub struct PerformancePredictor {
    trend_window: usize,
}

impl PerformancePredictor {
    pub fn new(trend_window: usize) -> Self {
        Self {
            trend_window: trend_window.max(1),
        }
    }

    /// Project growth from all known profiles and the current page-view
    /// total. Returns `None` until at least one profile exists.
    pub fn predict(
        &self,
        profiles: &[BehaviorProfile],
        current_views: u64,
        now: DateTime<Utc>,
    ) -> Option<PerformancePrediction> {
        if profiles.is_empty() {
            return None;
        }

        let scores: Vec<f64> = profiles.iter().map(|p| p.engagement_score).collect();
        let avg_engagement = scores.iter().mean();

        let recent = &scores[scores.len().saturating_sub(self.trend_window)..];
        let recent_avg = recent.iter().mean();
        let trend = ((recent_avg - TREND_BASELINE_SCORE) / 100.0).clamp(-0.5, 0.5);

        let horizon = |months: i32, confidence: f64| HorizonProjection {
            expected_users: current_views as f64 * MONTHLY_USER_GROWTH.powi(months),
            expected_engagement: (avg_engagement * MONTHLY_ENGAGEMENT_DRIFT.powi(months))
                .clamp(0.0, 100.0),
            expected_conversion: (BASE_CONVERSION
                * (1.0 + trend)
                * MONTHLY_CONVERSION_DRIFT.powi(months))
            .clamp(0.0, 1.0),
            confidence,
        };

        Some(PerformancePrediction {
            one_month: horizon(HORIZON_MONTHS[0], HORIZON_CONFIDENCE[0]),
            one_year: horizon(HORIZON_MONTHS[1], HORIZON_CONFIDENCE[1]),
            five_year: horizon(HORIZON_MONTHS[2], HORIZON_CONFIDENCE[2]),
            avg_engagement_score: avg_engagement,
            conversion_trend: trend,
            computed_at: now,
        })
    }
}

impl Default for PerformancePredictor {
    fn default() -> Self {
        Self::new(DEFAULT_TREND_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn profile(score: f64) -> BehaviorProfile {
        BehaviorProfile {
            session_id: "s".to_string(),
            user_id: "u".to_string(),
            session_duration_ms: 60_000,
            page_view_count: 3,
            avg_time_per_page_ms: 20_000.0,
            interaction_rate: 1.0,
            bounced: false,
            engagement_score: score,
            computed_at: t0(),
        }
    }

    #[test]
    fn test_no_profiles_yields_no_prediction() {
        let predictor = PerformancePredictor::default();
        assert!(predictor.predict(&[], 100, t0()).is_none());
    }

    #[test]
    fn test_confidence_strictly_decreases() {
        let predictor = PerformancePredictor::default();
        let prediction = predictor.predict(&[profile(60.0)], 100, t0()).unwrap();

        assert!(prediction.one_month.confidence > prediction.one_year.confidence);
        assert!(prediction.one_year.confidence > prediction.five_year.confidence);
    }

    #[test]
    fn test_users_compound_across_horizons() {
        let predictor = PerformancePredictor::default();
        let prediction = predictor.predict(&[profile(50.0)], 1000, t0()).unwrap();

        assert!((prediction.one_month.expected_users - 1100.0).abs() < 1e-6);
        assert!((prediction.one_year.expected_users - 1000.0 * 1.1f64.powi(12)).abs() < 1e-6);
        assert!((prediction.five_year.expected_users - 1000.0 * 1.1f64.powi(60)).abs() < 1e-6);
        assert!(prediction.one_month.expected_users < prediction.one_year.expected_users);
        assert!(prediction.one_year.expected_users < prediction.five_year.expected_users);
    }

    #[test]
    fn test_trend_uses_recent_window_only() {
        let predictor = PerformancePredictor::new(10);

        // Old weak sessions followed by ten strong ones.
        let mut profiles: Vec<BehaviorProfile> = (0..5).map(|_| profile(10.0)).collect();
        profiles.extend((0..10).map(|_| profile(80.0)));

        let prediction = predictor.predict(&profiles, 100, t0()).unwrap();
        assert!((prediction.conversion_trend - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_trend_is_clamped() {
        let predictor = PerformancePredictor::default();

        let prediction = predictor.predict(&[profile(0.0)], 100, t0()).unwrap();
        assert_eq!(prediction.conversion_trend, -0.5);

        let prediction = predictor.predict(&[profile(100.0)], 100, t0()).unwrap();
        assert_eq!(prediction.conversion_trend, 0.5);
    }

    #[test]
    fn test_engagement_projection_stays_bounded() {
        let predictor = PerformancePredictor::default();
        let prediction = predictor.predict(&[profile(95.0)], 100, t0()).unwrap();

        assert!(prediction.five_year.expected_engagement <= 100.0);
        assert!(prediction.five_year.expected_conversion <= 1.0);
    }
}
