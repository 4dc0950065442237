pub mod drift;

pub use drift::{compute_drift, group_by_provider, list_providers, DriftEngine};
