use crate::brief::facts::BriefFacts;
use crate::brief::guard::LIMITATION_LINE;

/// Prompt variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// First attempt
    Standard,
    /// Retry after the guard rejected invented details
    Strict,
}

/// Header line every brief starts with
pub fn header_line(provider_id: &str) -> String {
    format!("Executive Brief — Provider {provider_id}")
}

/// Render the enrichment prompt for a fact packet
pub fn render(facts: &BriefFacts, mode: PromptMode) -> String {
    match mode {
        PromptMode::Standard => standard(facts),
        PromptMode::Strict => strict(facts),
    }
}

fn format_rules(provider_id: &str) -> String {
    format!(
        "Output format (STRICT):\n\
         - Line 1 exactly: {header}\n\
         - 6–9 short sentences, plain text, no headings, no markdown\n\
         - Then exactly 3 bullets starting with \"•\"\n\
         - Final line exactly: {LIMITATION_LINE}",
        header = header_line(provider_id),
    )
}

fn standard(facts: &BriefFacts) -> String {
    format!(
        "Write for non-technical hospital leadership.\n\
         \n\
         CRITICAL: Use ONLY the facts in the JSON. Do NOT infer diseases, imaging types, referrals, \
         guidelines, CPT/ICD codes, quarters, peer comparisons, or anything not in JSON.\n\
         If a detail is missing, write: \"Not available in the dataset.\"\n\
         \n\
         {rules}\n\
         \n\
         You MUST mention:\n\
         - periods\n\
         - label + stabilityIndex\n\
         - serviceMixDrift + intensityDrift + posDrift\n\
         - topServiceCode + topServiceShare (first vs last) if present\n\
         - weightedAllowedMean (first vs last) if present\n\
         - topPOS + topPOSShare (first vs last) if present\n\
         - drivers\n\
         \n\
         JSON facts:\n\
         {json}",
        rules = format_rules(&facts.provider_id),
        json = facts.to_json(),
    )
}

fn strict(facts: &BriefFacts) -> String {
    format!(
        "Rewrite the brief using ONLY the JSON facts. Remove ANY invented clinical details \
         (no MRI/CT, no conditions, no guidelines, no referrals, no peer comparisons, no quarters).\n\
         If unknown, say: \"Not available in the dataset.\"\n\
         \n\
         Keep the same STRICT format rules.\n\
         {rules}\n\
         \n\
         JSON facts:\n\
         {json}",
        rules = format_rules(&facts.provider_id),
        json = facts.to_json(),
    )
}
