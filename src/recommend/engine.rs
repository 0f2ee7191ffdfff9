//! Candidate selection and ranking.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{Activity, ActivityLog, LogStatus};

use super::scoring::{score, RecommendationFilters, ScoredActivity};

/// How many of the most recent completed logs exclude their activity from
/// personalized results.
pub const DEFAULT_RECENCY_WINDOW: usize = 10;

/// Activities visible to a course: department-specific plus universal
/// (course-less or "General"-tagged), deduplicated by id.
fn candidate_pool<'a>(activities: &'a [Activity], course: &str) -> Vec<&'a Activity> {
    let mut seen = HashSet::new();
    activities
        .iter()
        .filter(|a| a.is_for_course(course) || a.is_universal())
        .filter(|a| seen.insert(a.id.clone()))
        .collect()
}

/// Ranked activities that fit the duration budget.
///
/// The budget is a hard cutoff: an activity that does not fit is never
/// recommended. Candidates are shuffled before the stable descending sort,
/// so equal-score ties land in a fresh order on every call (anti-staleness)
/// while strictly different scores always keep their relative order. Pass a
/// seeded rng to pin tie order in tests.
pub fn recommend<R: Rng>(
    activities: &[Activity],
    course: &str,
    budget_minutes: i64,
    filters: &RecommendationFilters,
    rng: &mut R,
) -> Vec<ScoredActivity> {
    let mut scored: Vec<ScoredActivity> = candidate_pool(activities, course)
        .into_iter()
        .filter(|a| a.duration_minutes <= budget_minutes)
        .map(|a| ScoredActivity {
            relevance_score: score(a, course, budget_minutes, filters),
            activity: a.clone(),
        })
        .collect();

    scored.shuffle(rng);
    scored.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    scored
}

/// A short list for immediate use: `recommend` truncated to `limit`.
pub fn quick_suggestions<R: Rng>(
    activities: &[Activity],
    course: &str,
    budget_minutes: i64,
    limit: usize,
    rng: &mut R,
) -> Vec<ScoredActivity> {
    let mut suggestions = recommend(activities, course, budget_minutes, &RecommendationFilters::default(), rng);
    suggestions.truncate(limit);
    suggestions
}

/// History-aware recommendations.
///
/// The student's most frequent completed category becomes a category filter
/// (tie-break unspecified: whichever the map iteration meets first), and
/// activities completed within the recency window are excluded. If the
/// exclusion empties the list, the unfiltered recommendation list is
/// returned instead of nothing. `logs` must be ordered most recent first.
pub fn personalize<R: Rng>(
    activities: &[Activity],
    logs: &[ActivityLog],
    course: &str,
    budget_minutes: i64,
    recency_window: usize,
    rng: &mut R,
) -> Vec<ScoredActivity> {
    let completed: Vec<&ActivityLog> = logs
        .iter()
        .filter(|log| log.status == LogStatus::Completed)
        .collect();

    let mut category_counts: HashMap<&str, usize> = HashMap::new();
    for log in &completed {
        if let Some(category) = log.activity_category.as_deref() {
            *category_counts.entry(category).or_insert(0) += 1;
        }
    }

    let filters = category_counts
        .iter()
        .max_by_key(|(_, count)| **count)
        .map(|(category, _)| RecommendationFilters::with_category(*category))
        .unwrap_or_default();

    let recommendations = recommend(activities, course, budget_minutes, &filters, rng);

    let recent_ids: HashSet<&str> = completed
        .iter()
        .take(recency_window)
        .map(|log| log.activity_id.as_str())
        .collect();

    let filtered: Vec<ScoredActivity> = recommendations
        .iter()
        .filter(|rec| !recent_ids.contains(rec.activity.id.as_str()))
        .cloned()
        .collect();

    if filtered.is_empty() {
        recommendations
    } else {
        filtered
    }
}

/// The single best personalized pick, used by the sweep when auto-suggesting
/// an activity for a freed slot.
pub fn auto_pick<R: Rng>(
    activities: &[Activity],
    logs: &[ActivityLog],
    course: &str,
    budget_minutes: i64,
    rng: &mut R,
) -> Option<ScoredActivity> {
    personalize(activities, logs, course, budget_minutes, DEFAULT_RECENCY_WINDOW, rng)
        .into_iter()
        .next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn activity(id: &str, course: Option<&str>, duration: i64, category: &str) -> Activity {
        Activity {
            id: id.to_string(),
            title: format!("Activity {id}"),
            category: category.to_string(),
            duration_minutes: duration,
            difficulty: "Easy".to_string(),
            mode: "Solo".to_string(),
            course: course.map(str::to_string),
        }
    }

    fn completed_log(id: &str, activity_id: &str, category: &str) -> ActivityLog {
        ActivityLog {
            id: id.to_string(),
            student_id: "s1".to_string(),
            activity_id: activity_id.to_string(),
            status: LogStatus::Completed,
            activity_category: Some(category.to_string()),
            started_at: Utc::now(),
            ended_at: Some(Utc::now()),
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn budget_is_a_hard_cutoff() {
        let activities = vec![
            activity("fits", Some("CS"), 25, "Learning"),
            activity("too_long", Some("CS"), 31, "Learning"),
        ];

        let results = recommend(&activities, "CS", 30, &RecommendationFilters::default(), &mut rng());
        assert!(results.iter().all(|r| r.activity.duration_minutes <= 30));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].activity.id, "fits");
    }

    #[test]
    fn department_activity_ranks_above_universal() {
        let activities = vec![
            activity("b", None, 20, "Learning"),
            activity("a", Some("CS"), 20, "Learning"),
        ];

        let results = recommend(&activities, "CS", 30, &RecommendationFilters::default(), &mut rng());
        assert_eq!(results[0].activity.id, "a");
        assert_eq!(results[1].activity.id, "b");
    }

    #[test]
    fn other_course_activities_are_not_pooled() {
        let activities = vec![
            activity("a", Some("Math"), 20, "Learning"),
            activity("b", Some("General"), 20, "Learning"),
        ];

        let results = recommend(&activities, "CS", 30, &RecommendationFilters::default(), &mut rng());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].activity.id, "b");
    }

    #[test]
    fn strict_score_order_survives_reshuffles() {
        let activities = vec![
            activity("dept", Some("CS"), 30, "Learning"),
            activity("uni_long", None, 30, "Learning"),
            activity("uni_short", None, 10, "Learning"),
        ];

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let results =
                recommend(&activities, "CS", 30, &RecommendationFilters::default(), &mut rng);
            let scores: Vec<i32> = results.iter().map(|r| r.relevance_score).collect();
            assert!(scores.windows(2).all(|w| w[0] >= w[1]), "seed {seed}: {scores:?}");
            assert_eq!(results[0].activity.id, "dept");
        }
    }

    #[test]
    fn equal_scores_keep_post_shuffle_order() {
        let activities = vec![
            activity("a", Some("CS"), 20, "Learning"),
            activity("b", Some("CS"), 20, "Learning"),
        ];

        let first = recommend(&activities, "CS", 40, &RecommendationFilters::default(), &mut StdRng::seed_from_u64(1));
        let second = recommend(&activities, "CS", 40, &RecommendationFilters::default(), &mut StdRng::seed_from_u64(1));
        // Same seed, same tie order.
        assert_eq!(first[0].activity.id, second[0].activity.id);
    }

    #[test]
    fn personalize_biases_toward_dominant_category() {
        let activities = vec![
            activity("well", Some("CS"), 20, "Wellness"),
            activity("learn", Some("CS"), 20, "Learning"),
        ];
        let logs: Vec<ActivityLog> = (0..8)
            .map(|i| completed_log(&format!("l{i}"), "old", "Wellness"))
            .chain((0..2).map(|i| completed_log(&format!("m{i}"), "old2", "Learning")))
            .collect();

        let results = personalize(&activities, &logs, "CS", 30, DEFAULT_RECENCY_WINDOW, &mut rng());
        assert_eq!(results[0].activity.id, "well");
        assert!(results[0].relevance_score > results[1].relevance_score);
    }

    #[test]
    fn personalize_excludes_recently_completed() {
        let activities = vec![
            activity("done", Some("CS"), 20, "Learning"),
            activity("fresh", Some("CS"), 20, "Learning"),
        ];
        let logs = vec![completed_log("l1", "done", "Learning")];

        let results = personalize(&activities, &logs, "CS", 30, DEFAULT_RECENCY_WINDOW, &mut rng());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].activity.id, "fresh");
    }

    #[test]
    fn personalize_falls_back_when_exclusion_empties_list() {
        let activities = vec![activity("done", Some("CS"), 20, "Learning")];
        let logs = vec![completed_log("l1", "done", "Learning")];

        let results = personalize(&activities, &logs, "CS", 30, DEFAULT_RECENCY_WINDOW, &mut rng());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].activity.id, "done");
    }

    #[test]
    fn recency_window_only_covers_last_ten() {
        let activities = vec![
            activity("ancient", Some("CS"), 20, "Learning"),
            activity("recent", Some("CS"), 20, "Learning"),
        ];
        // Most recent first: ten "recent" completions, then the old one.
        let mut logs: Vec<ActivityLog> = (0..10)
            .map(|i| completed_log(&format!("l{i}"), "recent", "Learning"))
            .collect();
        logs.push(completed_log("old", "ancient", "Learning"));

        let results = personalize(&activities, &logs, "CS", 30, DEFAULT_RECENCY_WINDOW, &mut rng());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].activity.id, "ancient");
    }

    #[test]
    fn quick_suggestions_truncate_to_limit() {
        let activities: Vec<Activity> = (0..5)
            .map(|i| activity(&format!("a{i}"), Some("CS"), 15, "Learning"))
            .collect();

        let results = quick_suggestions(&activities, "CS", 30, 3, &mut rng());
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn empty_catalog_yields_empty_list() {
        assert!(recommend(&[], "CS", 30, &RecommendationFilters::default(), &mut rng()).is_empty());
        assert!(auto_pick(&[], &[], "CS", 30, &mut rng()).is_none());
    }
}
