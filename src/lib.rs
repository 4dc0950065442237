pub mod analysis;
pub mod brief;
pub mod data;
pub mod engine;
pub mod ingest;
pub mod utils;

// Re-export commonly used types
pub use analysis::{DriftConfig, DriftScorer, WeightedDistribution};
pub use brief::{Brief, BriefConfig, BriefService, BriefSource, GeminiClient, NarrativeEnricher};
pub use data::{ClaimLine, DriftLabel, DriftResult, PeriodMetrics};
pub use engine::{compute_drift, list_providers, DriftEngine};
pub use ingest::{load_claims, read_claims, LoadError, PeriodMode};
pub use utils::Config;
