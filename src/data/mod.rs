pub mod claim;
pub mod result;

pub use claim::ClaimLine;
pub use result::{DriftLabel, DriftResult, PeriodMetrics};
