use crate::brief::enricher::{EnrichError, NarrativeEnricher};
use crate::brief::facts::BriefFacts;
use crate::brief::prompt::{render, PromptMode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

/// Narrative enrichment settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BriefConfig {
    pub enabled: bool,
    /// API base, e.g. https://generativelanguage.googleapis.com/v1beta
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for BriefConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            temperature: 0.15,
            max_output_tokens: 700,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    finish_reason: Option<String>,
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Gemini `generateContent` client
pub struct GeminiClient {
    client: Client,
    api_key: String,
    url: Url,
    temperature: f64,
    max_output_tokens: u32,
}

impl GeminiClient {
    /// Create a client with an explicit API key
    pub fn new(api_key: impl Into<String>, config: &BriefConfig) -> Result<Self, EnrichError> {
        let base = config.endpoint.trim_end_matches('/');
        let url = Url::parse(&format!("{}/models/{}:generateContent", base, config.model))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            url,
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// Create a client reading the key from `config.api_key_env`
    pub fn from_env(config: &BriefConfig) -> Result<Self, EnrichError> {
        match std::env::var(&config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Self::new(key.trim(), config),
            _ => Err(EnrichError::MissingApiKey(config.api_key_env.clone())),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Send one prompt and join the first candidate's text parts
    pub async fn generate(&self, prompt: &str) -> Result<String, EnrichError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(self.url.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;

        if !status.is_success() {
            error!("Enrichment request failed: {} - {}", status, raw);
            return Err(EnrichError::Status {
                status: status.as_u16(),
                body: raw,
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&raw)?;
        let candidate = parsed.candidates.into_iter().next();

        if let Some(reason) = candidate.as_ref().and_then(|c| c.finish_reason.as_deref()) {
            debug!(finish_reason = reason, "enrichment finished");
        }

        let text = candidate
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(EnrichError::Empty);
        }
        Ok(text.to_string())
    }
}

impl NarrativeEnricher for GeminiClient {
    async fn enrich(&self, facts: &BriefFacts, mode: PromptMode) -> Result<String, EnrichError> {
        self.generate(&render(facts, mode)).await
    }
}
