use crate::data::{DriftLabel, PeriodMetrics};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use thiserror::Error;

pub const SERVICE_MIX_DRIVER: &str = "Service mix shifted (procedure pattern change detected).";
pub const INTENSITY_DRIVER: &str =
    "Service intensity proxy shifted (allowed amount pattern changed).";
pub const POS_DRIVER: &str =
    "Care setting distribution shifted (Place of Service mix changed).";
pub const NO_DRIVER: &str = "No major drift drivers detected across the selected window.";

/// Weights and thresholds used by the drift scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftConfig {
    /// Service-mix blend: weight of the entropy change
    pub entropy_weight: f64,
    /// Service-mix blend: weight of the top-share change
    pub top_share_weight: f64,

    /// Composite blend
    pub service_mix_weight: f64,
    pub intensity_weight: f64,
    pub pos_weight: f64,

    /// Sub-score (0-100) at which an axis is reported as a driver
    pub driver_threshold: u32,
    /// Lowest stability index labelled Stable
    pub stable_min: u32,
    /// Lowest stability index labelled Watch
    pub watch_min: u32,

    /// Percentile of provider-wide allowed amounts marking high intensity
    pub high_intensity_percentile: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            entropy_weight: 0.60,
            top_share_weight: 0.40,
            service_mix_weight: 0.40,
            intensity_weight: 0.35,
            pos_weight: 0.25,
            driver_threshold: 25,
            stable_min: 80,
            watch_min: 60,
            high_intensity_percentile: 75.0,
        }
    }
}

/// Rejected drift configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DriftConfigError {
    #[error("watch_min ({watch_min}) must not exceed stable_min ({stable_min})")]
    InvertedThresholds { stable_min: u32, watch_min: u32 },

    #[error("high_intensity_percentile must be within 0..=100, got {0}")]
    PercentileOutOfRange(f64),

    #[error("weight `{name}` must be finite and non-negative, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },
}

impl DriftConfig {
    /// Check label thresholds, percentile range and blend weights
    pub fn validate(&self) -> Result<(), DriftConfigError> {
        if self.watch_min > self.stable_min {
            return Err(DriftConfigError::InvertedThresholds {
                stable_min: self.stable_min,
                watch_min: self.watch_min,
            });
        }
        if !(0.0..=100.0).contains(&self.high_intensity_percentile) {
            return Err(DriftConfigError::PercentileOutOfRange(self.high_intensity_percentile));
        }

        let weights = [
            ("entropy_weight", self.entropy_weight),
            ("top_share_weight", self.top_share_weight),
            ("service_mix_weight", self.service_mix_weight),
            ("intensity_weight", self.intensity_weight),
            ("pos_weight", self.pos_weight),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(DriftConfigError::InvalidWeight { name, value });
            }
        }
        Ok(())
    }
}

/// Unweighted means of the tracked metrics over one window
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowAverages {
    pub service_entropy: f64,
    pub top_service_share: f64,
    pub weighted_allowed_mean: f64,
    pub pos_entropy: f64,
}

impl WindowAverages {
    /// Average a window; an empty window averages to zero
    pub fn of(window: &[PeriodMetrics]) -> Self {
        if window.is_empty() {
            return Self::default();
        }

        Self {
            service_entropy: window.iter().map(|m| m.service_entropy).mean(),
            top_service_share: window.iter().map(|m| m.top_service_share).mean(),
            weighted_allowed_mean: window.iter().map(|m| m.weighted_allowed_mean).mean(),
            pos_entropy: window.iter().map(|m| m.pos_entropy).mean(),
        }
    }
}

/// Scored comparison of a baseline window against a recent window
#[derive(Debug, Clone, PartialEq)]
pub struct DriftScores {
    pub baseline: WindowAverages,
    pub recent: WindowAverages,

    /// Fractional (0.0 to 1.0) drift per axis, before rounding
    pub service_mix_fraction: f64,
    pub intensity_fraction: f64,
    pub pos_fraction: f64,
    pub composite_fraction: f64,

    pub service_mix_drift: u32,
    pub intensity_drift: u32,
    pub pos_drift: u32,
    pub drift_score: u32,
    pub stability_index: u32,
    pub label: DriftLabel,
}

/// Drift scorer
///
/// Compares window averages axis by axis using a direction-agnostic relative
/// change capped at 1.0, then blends the axes into a composite score.
/// The composite is computed from the unrounded fractions and rounded once.
#[derive(Debug, Clone, Default)]
pub struct DriftScorer {
    config: DriftConfig,
}

impl DriftScorer {
    pub fn new(config: DriftConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DriftConfig {
        &self.config
    }

    /// Score a (baseline, recent) window pair
    pub fn score(&self, baseline: &[PeriodMetrics], recent: &[PeriodMetrics]) -> DriftScores {
        let base = WindowAverages::of(baseline);
        let rec = WindowAverages::of(recent);
        let cfg = &self.config;

        // 1. Relative change per tracked metric
        let entropy_change = relative_change(base.service_entropy, rec.service_entropy);
        let top_share_change = relative_change(base.top_service_share, rec.top_service_share);
        let intensity_change =
            relative_change(base.weighted_allowed_mean, rec.weighted_allowed_mean);
        let pos_change = relative_change(base.pos_entropy, rec.pos_entropy);

        // 2. Axis fractions
        let service_mix_fraction =
            cfg.entropy_weight * entropy_change + cfg.top_share_weight * top_share_change;
        let intensity_fraction = intensity_change;
        let pos_fraction = pos_change;

        // 3. Composite from unrounded fractions
        let composite_fraction = cfg.service_mix_weight * service_mix_fraction
            + cfg.intensity_weight * intensity_fraction
            + cfg.pos_weight * pos_fraction;

        let drift_score = to_percent(composite_fraction);
        let stability_index = 100u32.saturating_sub(drift_score);

        DriftScores {
            baseline: base,
            recent: rec,
            service_mix_fraction,
            intensity_fraction,
            pos_fraction,
            composite_fraction,
            service_mix_drift: to_percent(service_mix_fraction),
            intensity_drift: to_percent(intensity_fraction),
            pos_drift: to_percent(pos_fraction),
            drift_score,
            stability_index,
            label: DriftLabel::classify(stability_index, cfg.stable_min, cfg.watch_min),
        }
    }

    /// Driver sentences, in fixed axis order (service mix, intensity, place of service)
    pub fn drivers(&self, scores: &DriftScores) -> Vec<String> {
        let threshold = self.config.driver_threshold;
        let mut drivers = Vec::new();

        if scores.service_mix_drift >= threshold {
            drivers.push(SERVICE_MIX_DRIVER.to_string());
        }
        if scores.intensity_drift >= threshold {
            drivers.push(INTENSITY_DRIVER.to_string());
        }
        if scores.pos_drift >= threshold {
            drivers.push(POS_DRIVER.to_string());
        }
        if drivers.is_empty() {
            drivers.push(NO_DRIVER.to_string());
        }

        drivers
    }
}

/// |recent - baseline| / baseline, capped at 1.0; zero when baseline is zero
pub fn relative_change(baseline: f64, recent: f64) -> f64 {
    if baseline == 0.0 {
        return 0.0;
    }
    ((recent - baseline).abs() / baseline).min(1.0)
}

/// Signed percentage change from baseline to recent; zero when baseline is zero
pub fn signed_change_pct(baseline: f64, recent: f64) -> f64 {
    if baseline == 0.0 {
        return 0.0;
    }
    (recent - baseline) / baseline * 100.0
}

/// Round half up (toward positive infinity at .5)
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Fraction (0.0 to 1.0) to a whole percentage in [0, 100]
pub fn to_percent(fraction: f64) -> u32 {
    round_half_up(fraction * 100.0).clamp(0.0, 100.0) as u32
}
