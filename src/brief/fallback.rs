use crate::analysis::narrative::period_span;
use crate::analysis::scoring::round_half_up;
use crate::brief::guard::{ensure_limitation_at_end, ensure_three_bullets};
use crate::brief::prompt::header_line;
use crate::data::{DriftResult, PeriodMetrics};

pub const NOT_AVAILABLE: &str = "Not available in the dataset.";

fn pct(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{}%", round_half_up(v * 100.0) as i64),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn whole(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{}", round_half_up(v) as i64),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn bits(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.2}"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Deterministic factual brief built only from the drift result
///
/// Served whenever enrichment is unavailable, fails, or is rejected by the
/// content guard.
pub fn fallback_brief(result: &DriftResult) -> String {
    let first: Option<&PeriodMetrics> = result.first_period();
    let last: Option<&PeriodMetrics> = result.last_period();

    // min–max span, same as the executive summary
    let span = if result.periods.is_empty() {
        "selected period".to_string()
    } else {
        period_span(&result.periods)
    };

    let drivers = if result.drivers.is_empty() {
        format!("Primary drivers: {NOT_AVAILABLE}")
    } else {
        let top: Vec<&str> = result.drivers.iter().take(3).map(String::as_str).collect();
        format!("Primary drivers: {}", top.join(" "))
    };

    let lines = [
        header_line(&result.provider_id),
        format!(
            "Status: {} (Stability Index: {}%) across {}.",
            result.label, result.stability_index, span
        ),
        format!(
            "Drift signals: Service Mix Drift {}%, Intensity Drift {}%, Place-of-Service Drift {}%.",
            result.service_mix_drift, result.intensity_drift, result.pos_drift
        ),
        format!(
            "Top service code: {}; share changed from {} to {}.",
            last.map_or(NOT_AVAILABLE, |m| m.top_service_code.as_str()),
            pct(first.map(|m| m.top_service_share)),
            pct(last.map(|m| m.top_service_share)),
        ),
        format!(
            "Service diversity (entropy, bits) changed from {} to {}.",
            bits(first.map(|m| m.service_entropy)),
            bits(last.map(|m| m.service_entropy)),
        ),
        format!(
            "Intensity proxy (weighted allowed mean) changed from {} to {}.",
            whole(first.map(|m| m.weighted_allowed_mean)),
            whole(last.map(|m| m.weighted_allowed_mean)),
        ),
        format!(
            "Top POS: {}; share changed from {} to {}.",
            last.map_or(NOT_AVAILABLE, |m| m.top_pos.as_str()),
            pct(first.map(|m| m.top_pos_share)),
            pct(last.map(|m| m.top_pos_share)),
        ),
        drivers,
        "Interpretation: this is a behavioral pattern shift signal for oversight; it does not assess clinical correctness."
            .to_string(),
        String::new(),
        "• Review top service code share + entropy shift (first vs last period).".to_string(),
        "• Confirm whether intensity/POS changes align with operational context.".to_string(),
        "• If unexplained, run a small sample review and document rationale.".to_string(),
    ];

    ensure_limitation_at_end(&ensure_three_bullets(&lines.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brief::guard::{looks_hallucinated, LIMITATION_LINE};
    use crate::data::ClaimLine;
    use crate::engine::compute_drift;

    fn result() -> DriftResult {
        let rows = vec![
            ClaimLine::new("1001", 2023, "A", "O", 80.0, 100.0),
            ClaimLine::new("1001", 2023, "B", "O", 20.0, 100.0),
            ClaimLine::new("1001", 2024, "A", "O", 50.0, 130.0),
            ClaimLine::new("1001", 2024, "B", "F", 50.0, 130.0),
        ];
        compute_drift(&rows, "1001")
    }

    #[test]
    fn test_fallback_brief_layout() {
        let brief = fallback_brief(&result());
        let lines: Vec<&str> = brief.lines().collect();

        assert_eq!(lines[0], "Executive Brief — Provider 1001");
        assert!(lines[1].starts_with("Status: "));
        assert!(lines[1].ends_with("across 2023–2024."));
        assert_eq!(lines[3], "Top service code: A; share changed from 80% to 50%.");
        assert_eq!(lines[4], "Service diversity (entropy, bits) changed from 0.72 to 1.00.");
        assert_eq!(lines[5], "Intensity proxy (weighted allowed mean) changed from 100 to 130.");
        assert_eq!(lines.iter().filter(|l| l.starts_with('•')).count(), 3);
        assert_eq!(lines.last().copied(), Some(LIMITATION_LINE));
    }

    #[test]
    fn test_fallback_brief_passes_guard() {
        assert!(!looks_hallucinated(&fallback_brief(&result())));
    }

    #[test]
    fn test_fallback_span_uses_first_and_last_period() {
        let rows = vec![
            ClaimLine::new("1001", 2021, "A", "O", 10.0, 100.0),
            ClaimLine::new("1001", 2022, "A", "O", 10.0, 100.0),
            ClaimLine::new("1001", 2023, "A", "O", 10.0, 100.0),
        ];
        let brief = fallback_brief(&compute_drift(&rows, "1001"));

        assert!(brief.contains("across 2021–2023."));
        assert!(!brief.contains("2021–2022–2023"));
    }

    #[test]
    fn test_fallback_brief_without_data() {
        let empty = compute_drift(&[], "9999");
        let brief = fallback_brief(&empty);

        assert!(brief.contains("across selected period."));
        assert!(brief.contains(&format!("Top service code: {NOT_AVAILABLE}")));
        assert!(brief.contains(&format!("changed from {NOT_AVAILABLE} to {NOT_AVAILABLE}")));
        assert!(!looks_hallucinated(&brief));
    }
}
