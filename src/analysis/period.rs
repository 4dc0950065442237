use crate::analysis::distribution::{percentile, WeightedDistribution};
use crate::data::{ClaimLine, PeriodMetrics};
use std::collections::BTreeMap;

/// Per-period metrics aggregator for one provider
///
/// Algorithm:
/// 1. Compute the provider-wide high-intensity threshold once, as a
///    percentile of `allowed_amount` over ALL of the provider's lines
/// 2. For each period, build weighted service-code and place-of-service
///    distributions (weight = `service_count`)
/// 3. Derive entropy and top-share from each distribution
/// 4. Derive the weighted allowed mean and the share of volume at or above
///    the provider-wide threshold
///
/// The threshold is provider-relative on purpose: the high-intensity share
/// measures how much of a period's volume sits above the provider's own
/// overall high-cost line, not above a period-local one.
#[derive(Debug, Clone)]
pub struct PeriodAggregator {
    high_intensity_threshold: f64,
}

impl PeriodAggregator {
    /// Create an aggregator for one provider's full set of lines
    ///
    /// # Arguments
    /// * `provider_lines` - every line of the provider, across all periods
    /// * `high_intensity_percentile` - percentile for the threshold (e.g., 75.0)
    pub fn new(provider_lines: &[&ClaimLine], high_intensity_percentile: f64) -> Self {
        let allowed: Vec<f64> = provider_lines.iter().map(|l| l.allowed_amount).collect();

        Self {
            high_intensity_threshold: percentile(&allowed, high_intensity_percentile),
        }
    }

    pub fn high_intensity_threshold(&self) -> f64 {
        self.high_intensity_threshold
    }

    /// Aggregate the lines of a single period
    pub fn aggregate(&self, period: i32, lines: &[&ClaimLine]) -> PeriodMetrics {
        let services = WeightedDistribution::from_pairs(
            lines.iter().map(|l| (l.service_code.as_str(), l.service_count)),
        );
        let places = WeightedDistribution::from_pairs(
            lines.iter().map(|l| (l.place_of_service.as_str(), l.service_count)),
        );

        let (top_service_code, top_service_share) = services.top_share();
        let (top_pos, top_pos_share) = places.top_share();

        let total_weight: f64 = lines.iter().map(|l| l.service_count).sum();

        let (weighted_allowed_mean, high_intensity_share) = if total_weight > 0.0 {
            let weighted_allowed: f64 = lines.iter().map(|l| l.weighted_allowed()).sum();
            let high_volume: f64 = lines
                .iter()
                .filter(|l| l.allowed_amount >= self.high_intensity_threshold)
                .map(|l| l.service_count)
                .sum();
            (weighted_allowed / total_weight, high_volume / total_weight)
        } else {
            (0.0, 0.0)
        };

        PeriodMetrics {
            period,
            service_entropy: services.entropy(),
            top_service_code: top_service_code.to_string(),
            top_service_share,
            weighted_allowed_mean,
            high_intensity_share,
            pos_entropy: places.entropy(),
            top_pos: top_pos.to_string(),
            top_pos_share,
        }
    }

    /// Aggregate every period present in `provider_lines`, ascending by period
    pub fn aggregate_all(&self, provider_lines: &[&ClaimLine]) -> Vec<PeriodMetrics> {
        group_by_period(provider_lines)
            .into_iter()
            .map(|(period, lines)| self.aggregate(period, &lines))
            .collect()
    }
}

/// Group lines by period, ascending
pub fn group_by_period<'a>(lines: &[&'a ClaimLine]) -> BTreeMap<i32, Vec<&'a ClaimLine>> {
    let mut groups: BTreeMap<i32, Vec<&'a ClaimLine>> = BTreeMap::new();
    for line in lines {
        groups.entry(line.period).or_default().push(*line);
    }
    groups
}

/// Split an ordered sequence into (baseline, recent) windows
///
/// `mid = max(1, floor(n / 2))`, clamped to `n`. A single item leaves the
/// recent window empty; an empty input leaves both empty.
pub fn split_windows<T>(items: &[T]) -> (&[T], &[T]) {
    let mid = (items.len() / 2).max(1).min(items.len());
    items.split_at(mid)
}
