//! AI summarization collaborators.
//!
//! Two external services sit behind traits so handlers depend on the
//! interface, not the vendor: a document text-extraction service (raw file
//! bytes in, plain text out) and a text-summarization service (prompt in,
//! summary out). Both are optional at startup; an unconfigured collaborator
//! surfaces as an upstream error at call time, never as a silent fallback.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

/// Maximum number of characters of document text included in the prompt.
const PROMPT_TEXT_LIMIT: usize = 4000;

/// Token budget for the generated summary.
const SUMMARY_MAX_TOKENS: u32 = 800;

/// Errors from collaborator calls.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("Collaborator request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Collaborator rejected the request ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Collaborator returned an empty or malformed response")]
    MalformedResponse,
}

/// Extracts plain text from raw document bytes.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, bytes: Vec<u8>) -> Result<String, CollaboratorError>;
}

/// Produces a structured summary string from prompt text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, prompt: &str) -> Result<String, CollaboratorError>;
}

// ---------------------------------------------------------------------------
// Text extraction over HTTP
// ---------------------------------------------------------------------------

/// HTTP text-extraction client: POSTs the raw file bytes and expects the
/// extracted plain text as the response body.
pub struct HttpTextExtractor {
    http: reqwest::Client,
    url: String,
}

impl HttpTextExtractor {
    /// Build from `TEXT_EXTRACTOR_URL`; `None` when unset.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("TEXT_EXTRACTOR_URL")
            .ok()
            .filter(|s| !s.is_empty())?;
        Some(Self {
            http: reqwest::Client::new(),
            url,
        })
    }
}

#[async_trait]
impl TextExtractor for HttpTextExtractor {
    async fn extract_text(&self, bytes: Vec<u8>) -> Result<String, CollaboratorError> {
        let response = self
            .http
            .post(&self.url)
            .header("content-type", "application/pdf")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Api { status, body });
        }

        Ok(response.text().await?)
    }
}

// ---------------------------------------------------------------------------
// Summarization via Azure OpenAI
// ---------------------------------------------------------------------------

/// Azure OpenAI connection settings.
#[derive(Debug, Clone)]
pub struct AzureOpenAiConfig {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
}

impl AzureOpenAiConfig {
    /// Load from `AZURE_OPENAI_ENDPOINT` / `AZURE_OPENAI_API_KEY` /
    /// `AZURE_OPENAI_DEPLOYMENT` / `AZURE_OPENAI_API_VERSION`.
    ///
    /// Returns `None` when any required value is unset.
    pub fn from_env() -> Option<Self> {
        let endpoint = std::env::var("AZURE_OPENAI_ENDPOINT")
            .ok()
            .filter(|s| !s.is_empty())?;
        let api_key = std::env::var("AZURE_OPENAI_API_KEY")
            .ok()
            .filter(|s| !s.is_empty())?;
        let deployment = std::env::var("AZURE_OPENAI_DEPLOYMENT")
            .ok()
            .filter(|s| !s.is_empty())?;
        let api_version = std::env::var("AZURE_OPENAI_API_VERSION")
            .unwrap_or_else(|_| "2024-02-15-preview".into());
        Some(Self {
            endpoint,
            api_key,
            deployment,
            api_version,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Summarizer backed by an Azure OpenAI chat-completions deployment.
pub struct AzureOpenAiSummarizer {
    http: reqwest::Client,
    config: AzureOpenAiConfig,
}

impl AzureOpenAiSummarizer {
    pub fn new(config: AzureOpenAiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.deployment,
            self.config.api_version
        )
    }
}

#[async_trait]
impl Summarizer for AzureOpenAiSummarizer {
    async fn summarize(&self, prompt: &str) -> Result<String, CollaboratorError> {
        let response = self
            .http
            .post(self.completions_url())
            .header("api-key", &self.config.api_key)
            .json(&json!({
                "messages": [
                    {
                        "role": "system",
                        "content": "You are an educational assistant. Produce clear, \
                                    structured summaries that help students learn."
                    },
                    { "role": "user", "content": prompt }
                ],
                "max_tokens": SUMMARY_MAX_TOKENS,
                "temperature": 0.7,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Api { status, body });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(CollaboratorError::MalformedResponse)
    }
}

// ---------------------------------------------------------------------------
// Prompt construction
// ---------------------------------------------------------------------------

/// Build the summarization prompt for a lesson document.
///
/// Document text is truncated to [`PROMPT_TEXT_LIMIT`] characters on a char
/// boundary so arbitrary input cannot blow the request size.
pub fn build_prompt(document_text: &str) -> String {
    let excerpt: String = document_text.chars().take(PROMPT_TEXT_LIMIT).collect();
    format!(
        "Analyze the following course document and provide a well-structured \
         summary with these sections:\n\n\
         OVERVIEW (2-3 sentences)\n\
         KEY CONCEPTS (3-5 bullet points)\n\
         IMPORTANT POINTS (3-5 bullet points)\n\
         PRACTICAL APPLICATIONS\n\
         LEARNING OUTCOMES\n\n\
         Document text:\n{excerpt}"
    )
}
