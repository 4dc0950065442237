pub mod enricher;
pub mod facts;
pub mod fallback;
pub mod gemini;
pub mod guard;
pub mod prompt;
pub mod service;

pub use enricher::{EnrichError, NarrativeEnricher};
pub use facts::BriefFacts;
pub use fallback::fallback_brief;
pub use gemini::{BriefConfig, GeminiClient};
pub use guard::{finalize, looks_hallucinated, LIMITATION_LINE};
pub use prompt::PromptMode;
pub use service::{Brief, BriefService, BriefSource};
