//! Relevance scoring for catalog activities against an available time budget.

use serde::{Deserialize, Serialize};

use crate::models::Activity;

// Score weights. Department-specific match outranks universal on purpose.
const COURSE_MATCH_POINTS: i32 = 30;
const UNIVERSAL_POINTS: i32 = 15;
const CATEGORY_MATCH_POINTS: i32 = 20;
const DIFFICULTY_MATCH_POINTS: i32 = 15;
const MODE_MATCH_POINTS: i32 = 15;
const EFFICIENCY_MAX_POINTS: i32 = 20;

/// Optional per-request preference filters. A filter only adds points when
/// present and matching; it never excludes candidates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationFilters {
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub mode: Option<String>,
}

impl RecommendationFilters {
    pub fn with_category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }
}

/// An activity paired with its relevance score for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredActivity {
    #[serde(flatten)]
    pub activity: Activity,
    pub relevance_score: i32,
}

/// Weighted heuristic score for one activity.
///
/// All string matches are case-insensitive. The efficiency bonus rewards
/// activities that consume more of the available budget without exceeding
/// it: `min(20, floor(20 * duration / budget))`.
pub fn score(
    activity: &Activity,
    course: &str,
    budget_minutes: i64,
    filters: &RecommendationFilters,
) -> i32 {
    let mut score = 0;

    if activity.is_for_course(course) {
        score += COURSE_MATCH_POINTS;
    } else if activity.is_universal() {
        score += UNIVERSAL_POINTS;
    }

    if let Some(category) = &filters.category {
        if activity.category.eq_ignore_ascii_case(category) {
            score += CATEGORY_MATCH_POINTS;
        }
    }

    if let Some(difficulty) = &filters.difficulty {
        if activity.difficulty.eq_ignore_ascii_case(difficulty) {
            score += DIFFICULTY_MATCH_POINTS;
        }
    }

    if let Some(mode) = &filters.mode {
        if activity.mode.eq_ignore_ascii_case(mode) {
            score += MODE_MATCH_POINTS;
        }
    }

    if activity.duration_minutes > 0 && budget_minutes > 0 {
        let efficiency =
            (EFFICIENCY_MAX_POINTS as i64 * activity.duration_minutes / budget_minutes) as i32;
        score += efficiency.min(EFFICIENCY_MAX_POINTS);
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(id: &str, course: Option<&str>, duration: i64) -> Activity {
        Activity {
            id: id.to_string(),
            title: format!("Activity {id}"),
            category: "Learning".to_string(),
            duration_minutes: duration,
            difficulty: "Easy".to_string(),
            mode: "Solo".to_string(),
            course: course.map(str::to_string),
        }
    }

    #[test]
    fn department_match_outranks_universal() {
        let dept = activity("a", Some("CS"), 20);
        let universal = activity("b", None, 20);
        let filters = RecommendationFilters::default();

        let dept_score = score(&dept, "CS", 30, &filters);
        let universal_score = score(&universal, "CS", 30, &filters);
        assert!(dept_score > universal_score);
        assert_eq!(dept_score - universal_score, 15);
    }

    #[test]
    fn general_tagged_counts_as_universal() {
        let general = activity("a", Some("General"), 20);
        let unrelated = activity("b", Some("Math"), 20);
        let filters = RecommendationFilters::default();

        assert_eq!(score(&general, "CS", 30, &filters), 15 + 13);
        assert_eq!(score(&unrelated, "CS", 30, &filters), 13);
    }

    #[test]
    fn filter_matches_add_points() {
        let act = activity("a", Some("CS"), 30);
        let filters = RecommendationFilters {
            category: Some("learning".to_string()),
            difficulty: Some("EASY".to_string()),
            mode: Some("Solo".to_string()),
        };

        // 30 course + 20 category + 15 difficulty + 15 mode + 20 efficiency
        assert_eq!(score(&act, "cs", 30, &filters), 100);
    }

    #[test]
    fn efficiency_bonus_is_capped_and_floored() {
        let filters = RecommendationFilters::default();

        // 20 * 15 / 60 = 5
        assert_eq!(score(&activity("a", None, 15), "CS", 60, &filters), 15 + 5);
        // 20 * 45 / 60 = 15
        assert_eq!(score(&activity("b", None, 45), "CS", 60, &filters), 15 + 15);
        // full budget hits the cap
        assert_eq!(score(&activity("c", None, 60), "CS", 60, &filters), 15 + 20);
    }
}
