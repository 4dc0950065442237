use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregated metrics for one period of a provider's claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodMetrics {
    pub period: i32,

    /// Shannon entropy (bits) of the weighted service-code distribution
    pub service_entropy: f64,
    pub top_service_code: String,
    /// Share of volume in the top service code (0.0 to 1.0)
    pub top_service_share: f64,

    /// Allowed amount per service, weighted by service count
    pub weighted_allowed_mean: f64,
    /// Share of volume at or above the provider-wide high-cost threshold
    pub high_intensity_share: f64,

    /// Shannon entropy (bits) of the weighted place-of-service distribution
    pub pos_entropy: f64,
    #[serde(rename = "topPOS")]
    pub top_pos: String,
    #[serde(rename = "topPOSShare")]
    pub top_pos_share: f64,
}

/// Stability classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriftLabel {
    Stable,
    Watch,
    #[serde(rename = "Drift Risk")]
    DriftRisk,
}

impl DriftLabel {
    /// Classify a stability index against the Stable and Watch floors
    ///
    /// Both floors are inclusive: with floors 80/60, an index of 80 is
    /// Stable, 60 is Watch and 59 is DriftRisk.
    pub fn classify(stability_index: u32, stable_min: u32, watch_min: u32) -> Self {
        if stability_index >= stable_min {
            DriftLabel::Stable
        } else if stability_index >= watch_min {
            DriftLabel::Watch
        } else {
            DriftLabel::DriftRisk
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DriftLabel::Stable => "Stable",
            DriftLabel::Watch => "Watch",
            DriftLabel::DriftRisk => "Drift Risk",
        }
    }
}

impl fmt::Display for DriftLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drift assessment for one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftResult {
    pub provider_id: String,
    /// Distinct periods, ascending
    pub periods: Vec<i32>,
    /// One entry per period, same order as `periods`
    pub metrics_by_period: Vec<PeriodMetrics>,

    pub service_mix_drift: u32,
    pub intensity_drift: u32,
    pub pos_drift: u32,

    pub drift_score: u32,
    pub stability_index: u32,
    pub label: DriftLabel,

    pub executive_summary: String,
    pub drivers: Vec<String>,
}

impl DriftResult {
    /// False for a provider with no matching rows (all-zero result)
    pub fn has_data(&self) -> bool {
        !self.periods.is_empty()
    }

    pub fn first_period(&self) -> Option<&PeriodMetrics> {
        self.metrics_by_period.first()
    }

    pub fn last_period(&self) -> Option<&PeriodMetrics> {
        self.metrics_by_period.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_boundaries() {
        assert_eq!(DriftLabel::classify(100, 80, 60), DriftLabel::Stable);
        assert_eq!(DriftLabel::classify(80, 80, 60), DriftLabel::Stable);
        assert_eq!(DriftLabel::classify(79, 80, 60), DriftLabel::Watch);
        assert_eq!(DriftLabel::classify(60, 80, 60), DriftLabel::Watch);
        assert_eq!(DriftLabel::classify(59, 80, 60), DriftLabel::DriftRisk);
        assert_eq!(DriftLabel::classify(0, 80, 60), DriftLabel::DriftRisk);
    }

    #[test]
    fn test_label_serialization() {
        assert_eq!(serde_json::to_string(&DriftLabel::Stable).unwrap(), "\"Stable\"");
        assert_eq!(serde_json::to_string(&DriftLabel::DriftRisk).unwrap(), "\"Drift Risk\"");
        assert_eq!(DriftLabel::DriftRisk.to_string(), "Drift Risk");
    }

    #[test]
    fn test_period_metrics_field_names() {
        let metrics = PeriodMetrics {
            period: 2023,
            service_entropy: 1.0,
            top_service_code: "99213".to_string(),
            top_service_share: 0.5,
            weighted_allowed_mean: 80.0,
            high_intensity_share: 0.25,
            pos_entropy: 0.0,
            top_pos: "O".to_string(),
            top_pos_share: 1.0,
        };

        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["topPOS"], "O");
        assert_eq!(json["topPOSShare"], 1.0);
        assert_eq!(json["weightedAllowedMean"], 80.0);
        assert_eq!(json["highIntensityShare"], 0.25);
    }
}
