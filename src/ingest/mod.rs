pub mod cms;
pub mod error;

pub use cms::{assign_pseudo_periods, load_claims, read_claims, PeriodMode};
pub use error::LoadError;
