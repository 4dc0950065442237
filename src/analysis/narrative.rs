use crate::analysis::distribution::NO_CATEGORY;
use crate::analysis::scoring::{round_half_up, signed_change_pct, DriftScores};
use crate::data::{DriftLabel, PeriodMetrics};

pub const LIMITATION_SENTENCE: &str =
    "This is a behavioral risk signal (pattern shift), not a judgment of clinical correctness.";

/// Facts the executive summary is filled from
///
/// First/last shares come from the literal first and last periods; the
/// entropy and intensity changes compare the baseline and recent window
/// averages.
#[derive(Debug, Clone)]
pub struct SummaryInputs<'a> {
    pub label: DriftLabel,
    pub periods: &'a [i32],
    pub first: Option<&'a PeriodMetrics>,
    pub last: Option<&'a PeriodMetrics>,
    pub entropy_change_pct: f64,
    pub intensity_change_pct: f64,
}

impl<'a> SummaryInputs<'a> {
    pub fn new(
        label: DriftLabel,
        periods: &'a [i32],
        metrics_by_period: &'a [PeriodMetrics],
        scores: &DriftScores,
    ) -> Self {
        Self {
            label,
            periods,
            first: metrics_by_period.first(),
            last: metrics_by_period.last(),
            entropy_change_pct: signed_change_pct(
                scores.baseline.service_entropy,
                scores.recent.service_entropy,
            ),
            intensity_change_pct: signed_change_pct(
                scores.baseline.weighted_allowed_mean,
                scores.recent.weighted_allowed_mean,
            ),
        }
    }
}

/// Render the deterministic executive summary paragraph
pub fn executive_summary(inputs: &SummaryInputs<'_>) -> String {
    let span = period_span(inputs.periods);

    let service_from = inputs.first.map_or(0.0, |m| m.top_service_share);
    let service_to = inputs.last.map_or(0.0, |m| m.top_service_share);
    let service_code = inputs.last.map_or(NO_CATEGORY, |m| m.top_service_code.as_str());

    let pos_from = inputs.first.map_or(0.0, |m| m.top_pos_share);
    let pos_to = inputs.last.map_or(0.0, |m| m.top_pos_share);
    let pos_code = inputs.last.map_or(NO_CATEGORY, |m| m.top_pos.as_str());

    let concentration = if service_to > service_from {
        "more concentrated"
    } else {
        "less concentrated"
    };

    let diversity = if inputs.entropy_change_pct > 0.0 {
        "more diverse"
    } else if inputs.entropy_change_pct < 0.0 {
        "more narrow"
    } else {
        "unchanged"
    };

    let intensity = if inputs.intensity_change_pct > 0.0 {
        "increased"
    } else if inputs.intensity_change_pct < 0.0 {
        "decreased"
    } else {
        "stayed stable"
    };

    [
        format!("Clinical Pattern Stability: {} ({}).", inputs.label, span),
        format!(
            "Service mix shifted ({}): top service ({}) changed from {}% to {}%.",
            concentration,
            service_code,
            whole_percent(service_from),
            whole_percent(service_to),
        ),
        format!(
            "Decision diversity changed by {}% ({}).",
            round_half_up(inputs.entropy_change_pct) as i64,
            diversity,
        ),
        format!(
            "Intensity proxy {} by {}% (weighted allowed amount pattern).",
            intensity,
            round_half_up(inputs.intensity_change_pct.abs()) as i64,
        ),
        format!(
            "Care setting shifted: top Place of Service ({}) moved from {}% to {}%.",
            pos_code,
            whole_percent(pos_from),
            whole_percent(pos_to),
        ),
        LIMITATION_SENTENCE.to_string(),
    ]
    .join(" ")
}

/// "min–max" of the period identifiers, or "selected years" when empty
pub fn period_span(periods: &[i32]) -> String {
    match (periods.iter().min(), periods.iter().max()) {
        (Some(min), Some(max)) => format!("{min}–{max}"),
        _ => "selected years".to_string(),
    }
}

fn whole_percent(share: f64) -> i64 {
    round_half_up(share * 100.0) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(period: i32, code: &str, share: f64, pos: &str, pos_share: f64) -> PeriodMetrics {
        PeriodMetrics {
            period,
            service_entropy: 1.0,
            top_service_code: code.to_string(),
            top_service_share: share,
            weighted_allowed_mean: 100.0,
            high_intensity_share: 0.0,
            pos_entropy: 0.5,
            top_pos: pos.to_string(),
            top_pos_share: pos_share,
        }
    }

    #[test]
    fn test_summary_sentences() {
        let periods = [2023, 2024];
        let first = metrics(2023, "99213", 0.8, "O", 0.9);
        let last = metrics(2024, "99214", 0.5, "F", 0.6);

        let inputs = SummaryInputs {
            label: DriftLabel::Watch,
            periods: &periods,
            first: Some(&first),
            last: Some(&last),
            entropy_change_pct: 38.5,
            intensity_change_pct: -12.4,
        };

        let summary = executive_summary(&inputs);

        assert_eq!(
            summary,
            "Clinical Pattern Stability: Watch (2023–2024). \
             Service mix shifted (less concentrated): top service (99214) changed from 80% to 50%. \
             Decision diversity changed by 39% (more diverse). \
             Intensity proxy decreased by 12% (weighted allowed amount pattern). \
             Care setting shifted: top Place of Service (F) moved from 90% to 60%. \
             This is a behavioral risk signal (pattern shift), not a judgment of clinical correctness."
        );
    }

    #[test]
    fn test_summary_without_periods() {
        let inputs = SummaryInputs {
            label: DriftLabel::Stable,
            periods: &[],
            first: None,
            last: None,
            entropy_change_pct: 0.0,
            intensity_change_pct: 0.0,
        };

        let summary = executive_summary(&inputs);

        assert!(summary.starts_with("Clinical Pattern Stability: Stable (selected years)."));
        assert!(summary.contains("top service (N/A) changed from 0% to 0%"));
        assert!(summary.contains("(unchanged)"));
        assert!(summary.contains("Intensity proxy stayed stable by 0%"));
        assert!(summary.contains("top Place of Service (N/A) moved from 0% to 0%"));
    }

    #[test]
    fn test_negative_entropy_change_reads_narrow() {
        let periods = [2023, 2024];
        let m = metrics(2023, "A", 0.4, "O", 1.0);
        let inputs = SummaryInputs {
            label: DriftLabel::DriftRisk,
            periods: &periods,
            first: Some(&m),
            last: Some(&m),
            entropy_change_pct: -20.0,
            intensity_change_pct: 5.0,
        };

        let summary = executive_summary(&inputs);
        assert!(summary.contains("Clinical Pattern Stability: Drift Risk"));
        assert!(summary.contains("Decision diversity changed by -20% (more narrow)."));
        assert!(summary.contains("Intensity proxy increased by 5%"));
    }

    #[test]
    fn test_period_span() {
        assert_eq!(period_span(&[2024, 2022, 2023]), "2022–2024");
        assert_eq!(period_span(&[2023]), "2023–2023");
        assert_eq!(period_span(&[]), "selected years");
    }
}
