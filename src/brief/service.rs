use crate::brief::enricher::NarrativeEnricher;
use crate::brief::facts::BriefFacts;
use crate::brief::fallback::fallback_brief;
use crate::brief::guard::{finalize, looks_hallucinated};
use crate::brief::prompt::PromptMode;
use crate::data::DriftResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// Where the brief text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BriefSource {
    Enriched,
    Fallback,
}

/// Executive brief for one provider
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Brief {
    pub text: String,
    pub source: BriefSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl Brief {
    /// Deterministic brief, optionally annotated with why enrichment was skipped
    pub fn fallback(result: &DriftResult, warning: Option<String>) -> Self {
        Self {
            text: fallback_brief(result),
            source: BriefSource::Fallback,
            warning,
            generated_at: Utc::now(),
        }
    }

    fn enriched(text: String) -> Self {
        Self {
            text,
            source: BriefSource::Enriched,
            warning: None,
            generated_at: Utc::now(),
        }
    }
}

/// Produces executive briefs, preferring enriched text when it is clean
pub struct BriefService<E> {
    enricher: E,
}

impl<E: NarrativeEnricher> BriefService<E> {
    pub fn new(enricher: E) -> Self {
        Self { enricher }
    }

    pub fn enricher(&self) -> &E {
        &self.enricher
    }

    /// Generate a brief for a drift result
    ///
    /// Algorithm:
    /// 1. Ask the enricher with the standard prompt
    /// 2. On failure or empty output, serve the fallback with a warning
    /// 3. Post-process and check for invented details
    /// 4. If flagged, retry once with the strict prompt
    /// 5. Accept the retry only if it is clean, otherwise serve the fallback
    ///
    /// Never fails: every upstream problem degrades to the fallback.
    pub async fn generate(&self, result: &DriftResult) -> Brief {
        let facts = BriefFacts::from_result(result);

        // 1. Standard attempt
        let first = match self.enricher.enrich(&facts, PromptMode::Standard).await {
            Ok(text) if !text.trim().is_empty() => finalize(&text),
            Ok(_) => {
                warn!(provider = %result.provider_id, "Enrichment returned empty text");
                return Brief::fallback(result, Some("Enrichment returned empty text".to_string()));
            }
            Err(e) => {
                warn!(provider = %result.provider_id, "Enrichment failed: {}", e);
                return Brief::fallback(result, Some(e.to_string()));
            }
        };

        // 2. Guard
        if !looks_hallucinated(&first) {
            return Brief::enriched(first);
        }

        info!(provider = %result.provider_id, "Enriched brief flagged, retrying with strict prompt");

        // 3. Strict retry
        let rejected = || Some("Enriched brief rejected by content guard".to_string());
        match self.enricher.enrich(&facts, PromptMode::Strict).await {
            Ok(text) if !text.trim().is_empty() => {
                let retry = finalize(&text);
                if looks_hallucinated(&retry) {
                    warn!(provider = %result.provider_id, "Strict retry still flagged, using fallback");
                    Brief::fallback(result, rejected())
                } else {
                    Brief::enriched(retry)
                }
            }
            Ok(_) => Brief::fallback(result, rejected()),
            Err(e) => {
                warn!(provider = %result.provider_id, "Strict retry failed: {}", e);
                Brief::fallback(result, rejected())
            }
        }
    }
}
