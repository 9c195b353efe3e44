//! Chart-ready projections of raw check-in history. Pure functions, no I/O.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::checkin::{CheckIn, Mood};

/// One chart sample. Optional metrics stay `null` when unlogged so chart
/// scales are not corrupted by phantom zeros.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub mood_value: i32,
    pub energy: i32,
    pub sleep_hours: Option<f64>,
    pub soreness: i32,
    pub stress_level: Option<i32>,
    pub hydration: Option<i32>,
    pub weight: Option<f64>,
}

/// Axis/tooltip label for a numeric mood value. "N/A" outside 1..=5.
pub fn mood_label(score: i32) -> &'static str {
    Mood::from_score(score).map(Mood::as_str).unwrap_or("N/A")
}

/// Reshape check-ins into chart points, preserving input order. Callers
/// reverse the repository's descending order first to chart chronologically.
pub fn project(checkins: &[CheckIn]) -> Vec<ChartPoint> {
    checkins
        .iter()
        .map(|c| ChartPoint {
            date: c.timestamp.date_naive(),
            mood_value: c.mood.score(),
            energy: c.energy,
            sleep_hours: c.sleep_hours,
            soreness: c.soreness,
            stress_level: c.stress_level,
            hydration: c.hydration,
            weight: c.weight,
        })
        .collect()
}

/// Percentage of the weight goal reached by the latest logged weight,
/// rounded to the nearest integer. Not clamped: progress past the goal
/// yields values above 100. `None` when either operand is absent.
pub fn goal_progress(latest_weight: Option<f64>, weight_goal: Option<f64>) -> Option<i64> {
    let weight = latest_weight?;
    let goal = weight_goal?;
    if goal <= 0.0 {
        return None;
    }
    Some((100.0 * weight / goal).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn checkin(mood: Mood, day: u32) -> CheckIn {
        CheckIn {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            mood,
            energy: 7,
            soreness: 2,
            sleep_hours: None,
            sleep_quality: None,
            stress_level: Some(4),
            recovery: None,
            hydration: None,
            nutrition_quality: None,
            workout_motivation: None,
            fitness_goal: None,
            notes: None,
            weight: None,
            timestamp: Utc.with_ymd_and_hms(2024, 3, day, 8, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_mood_score_round_trip() {
        for n in 1..=5 {
            let mood = Mood::from_score(n).unwrap();
            assert_eq!(mood.score(), n);
            assert_eq!(mood_label(n), mood.as_str());
        }
    }

    #[test]
    fn test_mood_label_out_of_range() {
        assert_eq!(mood_label(0), "N/A");
        assert_eq!(mood_label(6), "N/A");
        assert_eq!(mood_label(-3), "N/A");
    }

    #[test]
    fn test_mood_scale_endpoints() {
        assert_eq!(Mood::Terrible.score(), 1);
        assert_eq!(Mood::Excellent.score(), 5);
    }

    #[test]
    fn test_project_preserves_order_and_gaps() {
        let checkins = vec![checkin(Mood::Poor, 1), checkin(Mood::Good, 2)];
        let points = project(&checkins);

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].mood_value, 2);
        assert_eq!(points[1].mood_value, 4);
        assert!(points[0].date < points[1].date);
        // Unlogged metrics stay absent, not zero
        assert_eq!(points[0].sleep_hours, None);
        assert_eq!(points[0].hydration, None);
        assert_eq!(points[0].stress_level, Some(4));
    }

    #[test]
    fn test_project_serializes_nulls_not_zeros() {
        let points = project(&[checkin(Mood::Okay, 5)]);
        let json = serde_json::to_value(&points[0]).unwrap();
        assert!(json["sleepHours"].is_null());
        assert!(json["weight"].is_null());
        assert_eq!(json["moodValue"], 3);
    }

    #[test]
    fn test_goal_progress_at_goal() {
        assert_eq!(goal_progress(Some(150.0), Some(150.0)), Some(100));
    }

    #[test]
    fn test_goal_progress_unclamped_past_goal() {
        assert_eq!(goal_progress(Some(165.0), Some(150.0)), Some(110));
    }

    #[test]
    fn test_goal_progress_rounds() {
        assert_eq!(goal_progress(Some(100.0), Some(300.0)), Some(33));
    }

    #[test]
    fn test_goal_progress_missing_operand() {
        assert_eq!(goal_progress(Some(150.0), None), None);
        assert_eq!(goal_progress(None, Some(150.0)), None);
        assert_eq!(goal_progress(None, None), None);
    }
}
