use crate::analysis::narrative::{executive_summary, SummaryInputs};
use crate::analysis::period::{split_windows, PeriodAggregator};
use crate::analysis::scoring::{DriftConfig, DriftConfigError, DriftScorer};
use crate::data::{ClaimLine, DriftResult};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Drift engine
///
/// Pure and synchronous: no shared mutable state, so a single engine can be
/// shared across threads and repeated calls on the same rows give identical
/// results.
#[derive(Debug, Clone, Default)]
pub struct DriftEngine {
    scorer: DriftScorer,
}

impl DriftEngine {
    /// Build an engine from a config the caller has already validated
    pub fn new(config: DriftConfig) -> Self {
        Self {
            scorer: DriftScorer::new(config),
        }
    }

    /// Build an engine, rejecting an invalid config
    pub fn try_new(config: DriftConfig) -> Result<Self, DriftConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &DriftConfig {
        self.scorer.config()
    }

    /// Compute drift for one provider
    ///
    /// A provider with no matching rows yields an all-zero result (empty
    /// periods, zero drift, stability 100); see `DriftResult::has_data`.
    pub fn compute_drift(&self, rows: &[ClaimLine], provider_id: &str) -> DriftResult {
        let lines: Vec<&ClaimLine> = rows
            .iter()
            .filter(|r| r.provider_id == provider_id)
            .collect();

        self.compute_for_lines(provider_id, &lines)
    }

    /// Compute drift for every provider, ascending by provider id
    ///
    /// Providers are spread over scoped worker threads; output order does
    /// not depend on scheduling.
    pub fn compute_all(&self, rows: &[ClaimLine]) -> Vec<DriftResult> {
        let groups: Vec<(&str, Vec<&ClaimLine>)> = group_by_provider(rows).into_iter().collect();
        if groups.is_empty() {
            return Vec::new();
        }

        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(groups.len());
        let chunk_size = groups.len().div_ceil(workers);

        debug!(providers = groups.len(), workers, "computing drift for all providers");

        let scoped = crossbeam::thread::scope(|s| {
            let handles: Vec<_> = groups
                .chunks(chunk_size)
                .map(|chunk| {
                    s.spawn(move |_| {
                        chunk
                            .iter()
                            .map(|(id, lines)| self.compute_for_lines(id, lines))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect::<Vec<_>>()
        });

        scoped.unwrap_or_else(|e| std::panic::resume_unwind(e))
    }

    fn compute_for_lines(&self, provider_id: &str, lines: &[&ClaimLine]) -> DriftResult {
        let config = self.scorer.config();

        // 1. Per-period metrics against the provider-wide intensity threshold
        let aggregator = PeriodAggregator::new(lines, config.high_intensity_percentile);
        let metrics_by_period = aggregator.aggregate_all(lines);
        let periods: Vec<i32> = metrics_by_period.iter().map(|m| m.period).collect();

        // 2. Baseline vs recent windows
        let (baseline, recent) = split_windows(&metrics_by_period);
        let scores = self.scorer.score(baseline, recent);

        // 3. Explanations
        let drivers = self.scorer.drivers(&scores);
        let executive_summary = executive_summary(&SummaryInputs::new(
            scores.label,
            &periods,
            &metrics_by_period,
            &scores,
        ));

        debug!(
            provider_id,
            lines = lines.len(),
            periods = periods.len(),
            drift_score = scores.drift_score,
            label = %scores.label,
            "computed provider drift"
        );

        DriftResult {
            provider_id: provider_id.to_string(),
            periods,
            metrics_by_period,
            service_mix_drift: scores.service_mix_drift,
            intensity_drift: scores.intensity_drift,
            pos_drift: scores.pos_drift,
            drift_score: scores.drift_score,
            stability_index: scores.stability_index,
            label: scores.label,
            executive_summary,
            drivers,
        }
    }
}

/// Distinct provider ids, ascending
pub fn list_providers(rows: &[ClaimLine]) -> Vec<String> {
    rows.iter()
        .map(|r| r.provider_id.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Compute drift for one provider with the default configuration
pub fn compute_drift(rows: &[ClaimLine], provider_id: &str) -> DriftResult {
    DriftEngine::default().compute_drift(rows, provider_id)
}

/// Group rows by provider id, ascending; row order within a provider is kept
pub fn group_by_provider(rows: &[ClaimLine]) -> BTreeMap<&str, Vec<&ClaimLine>> {
    let mut groups: BTreeMap<&str, Vec<&ClaimLine>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.provider_id.as_str()).or_default().push(row);
    }
    groups
}
