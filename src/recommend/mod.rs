pub mod engine;
pub mod scoring;

pub use engine::{auto_pick, personalize, quick_suggestions, recommend, DEFAULT_RECENCY_WINDOW};
pub use scoring::{score, RecommendationFilters, ScoredActivity};
