pub mod distribution;
pub mod period;
pub mod scoring;
pub mod narrative;

pub use distribution::{percentile, WeightedDistribution};
pub use period::{split_windows, PeriodAggregator};
pub use scoring::{DriftConfig, DriftConfigError, DriftScorer, DriftScores, WindowAverages};
pub use narrative::{executive_summary, SummaryInputs};
