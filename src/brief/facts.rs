use crate::data::{DriftLabel, DriftResult, PeriodMetrics};
use serde::Serialize;

/// Minimal fact packet handed to a narrative enricher
///
/// Holds only what a brief may cite. Nothing outside these fields is ever
/// sent upstream.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefFacts {
    pub provider_id: String,
    pub periods: Vec<i32>,
    pub label: DriftLabel,
    pub stability_index: u32,
    pub service_mix_drift: u32,
    pub intensity_drift: u32,
    pub pos_drift: u32,
    pub drivers: Vec<String>,
    pub first_period: Option<PeriodMetrics>,
    pub last_period: Option<PeriodMetrics>,
}

impl BriefFacts {
    pub fn from_result(result: &DriftResult) -> Self {
        Self {
            provider_id: result.provider_id.clone(),
            periods: result.periods.clone(),
            label: result.label,
            stability_index: result.stability_index,
            service_mix_drift: result.service_mix_drift,
            intensity_drift: result.intensity_drift,
            pos_drift: result.pos_drift,
            drivers: result.drivers.clone(),
            first_period: result.first_period().cloned(),
            last_period: result.last_period().cloned(),
        }
    }

    /// Pretty JSON for embedding in a prompt
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
