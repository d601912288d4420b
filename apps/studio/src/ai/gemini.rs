/// Gemini client: the only place that talks to the content model over HTTP.
///
/// Every structured call runs in JSON mode and is decoded with serde. Scores are clamped and
/// suggestion lists normalised before they leave this module.
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ai::{
    assign_fresh_ids, check_upload, clamp_score, normalize_suggestions, prompts, ContentService,
    ParseError, ServiceError,
};
use crate::models::analysis::{AtsCheck, ImprovementSuggestions, JobAnalysis};
use crate::models::resume::ResumeData;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// Model used for every call.
pub const MODEL: &str = "gemini-2.5-flash";
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
enum RequestPart<'a> {
    Text(&'a str),
    InlineData { mime_type: &'a str, data: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateResponse {
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Candidate {
    pub content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CandidateContent {
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsageMetadata {
    pub prompt_token_count: u32,
    pub candidates_token_count: u32,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, if it has any.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .candidates
            .first()?
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// Scores come back as JSON numbers of any shape; they are clamped into `u8`.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawJobAnalysis {
    match_score: f64,
    keyword_gaps: Vec<String>,
    missing_skills: Vec<String>,
    improvement_suggestions: ImprovementSuggestions,
}

impl From<RawJobAnalysis> for JobAnalysis {
    fn from(raw: RawJobAnalysis) -> Self {
        let non_blank = |s: Option<String>| s.filter(|v| !v.trim().is_empty());
        Self {
            match_score: clamp_score(raw.match_score),
            keyword_gaps: raw.keyword_gaps,
            missing_skills: raw.missing_skills,
            improvement_suggestions: ImprovementSuggestions {
                summary: non_blank(raw.improvement_suggestions.summary),
                experience: non_blank(raw.improvement_suggestions.experience),
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawAtsCheck {
    ats_score: f64,
    suggestions: Vec<String>,
}

impl From<RawAtsCheck> for AtsCheck {
    fn from(raw: RawAtsCheck) -> Self {
        Self {
            ats_score: clamp_score(raw.ats_score),
            suggestions: raw.suggestions,
        }
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self, ServiceError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key,
            endpoint: format!("{API_BASE}/{MODEL}:generateContent"),
        })
    }

    /// One `generateContent` call. Retries on 429 and 5xx with exponential backoff.
    async fn call(
        &self,
        request: &GenerateRequest<'_>,
    ) -> Result<GenerateResponse, ServiceError> {
        let mut last_error: Option<ServiceError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Content service call failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.endpoint)
                .header("x-goog-api-key", &self.api_key)
                .json(request)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(ServiceError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!(%status, "Content service returned a retryable status");
                last_error = Some(ServiceError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ServiceError::Api {
                    status: status.as_u16(),
                    message: api_error_message(body),
                });
            }

            let parsed: GenerateResponse = response.json().await?;
            if let Some(usage) = &parsed.usage_metadata {
                debug!(
                    prompt_tokens = usage.prompt_token_count,
                    output_tokens = usage.candidates_token_count,
                    "Content service call succeeded"
                );
            }
            return Ok(parsed);
        }

        Err(last_error.unwrap_or(ServiceError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    async fn call_text(&self, parts: Vec<RequestPart<'_>>) -> Result<String, ServiceError> {
        let request = GenerateRequest {
            contents: vec![RequestContent { parts }],
            generation_config: None,
        };
        let response = self.call(&request).await?;
        Ok(response.text().ok_or(ServiceError::EmptyContent)?.trim().to_string())
    }

    /// JSON-mode call decoded straight into `T`.
    async fn call_json<T: DeserializeOwned>(
        &self,
        parts: Vec<RequestPart<'_>>,
    ) -> Result<T, ServiceError> {
        let request = GenerateRequest {
            contents: vec![RequestContent { parts }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
            }),
        };
        let response = self.call(&request).await?;
        let text = response.text().ok_or(ServiceError::EmptyContent)?;
        decode_json(&text)
    }
}

#[async_trait]
impl ContentService for GeminiClient {
    async fn parse_resume(&self, file: Bytes, mime_type: &str) -> Result<ResumeData, ParseError> {
        check_upload(&file, mime_type)?;
        info!(mime_type, size = file.len(), "Parsing uploaded résumé");

        let parts = vec![
            RequestPart::InlineData {
                mime_type,
                data: STANDARD.encode(&file),
            },
            RequestPart::Text(prompts::PARSE_RESUME),
        ];
        let mut doc: ResumeData = self.call_json(parts).await?;
        assign_fresh_ids(&mut doc);
        Ok(doc)
    }

    async fn generate_suggestions(
        &self,
        job_title: &str,
        company: &str,
    ) -> Result<Vec<String>, ServiceError> {
        let prompt = prompts::suggestions(job_title, company);
        let raw: Vec<String> = self.call_json(vec![RequestPart::Text(&prompt)]).await?;
        normalize_suggestions(raw)
    }

    async fn analyze_job_match(
        &self,
        doc: &ResumeData,
        job_description: &str,
    ) -> Result<JobAnalysis, ServiceError> {
        let prompt = prompts::job_match(doc, job_description);
        let raw: RawJobAnalysis = self.call_json(vec![RequestPart::Text(&prompt)]).await?;
        Ok(raw.into())
    }

    async fn check_ats(&self, doc: &ResumeData) -> Result<AtsCheck, ServiceError> {
        let prompt = prompts::ats_check(doc);
        let raw: RawAtsCheck = self.call_json(vec![RequestPart::Text(&prompt)]).await?;
        Ok(raw.into())
    }

    async fn generate_cover_letter(
        &self,
        doc: &ResumeData,
        job_description: &str,
    ) -> Result<String, ServiceError> {
        let prompt = prompts::cover_letter(doc, job_description);
        self.call_text(vec![RequestPart::Text(&prompt)]).await
    }
}

fn decode_json<T: DeserializeOwned>(text: &str) -> Result<T, ServiceError> {
    serde_json::from_str(strip_json_fences(text)).map_err(ServiceError::Decode)
}

fn api_error_message(body: String) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(stripped) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    let stripped = stripped.trim_start();
    stripped
        .strip_suffix("```")
        .map(str::trim)
        .unwrap_or(stripped)
}
