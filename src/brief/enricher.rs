use crate::brief::facts::BriefFacts;
use crate::brief::prompt::PromptMode;
use std::future::Future;
use thiserror::Error;

/// Upstream narrative service failure
///
/// Never fatal: every variant degrades to the fallback brief.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("no API key found in environment variable {0}")]
    MissingApiKey(String),

    #[error("invalid enrichment endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("enrichment request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("enrichment service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode enrichment response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("enrichment service returned no text")]
    Empty,
}

/// Optional narrative decorator around the deterministic drift output
pub trait NarrativeEnricher {
    /// Produce a brief from the fact packet
    fn enrich(
        &self,
        facts: &BriefFacts,
        mode: PromptMode,
    ) -> impl Future<Output = Result<String, EnrichError>> + Send;
}
