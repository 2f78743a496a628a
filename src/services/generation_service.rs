//! Schedule generation against an OpenAI-compatible chat-completions API.
//!
//! The flow is cache lookup, provider call, payload extraction, structural
//! validation, cache write. The cache is consulted before any network traffic
//! and only ever written after validation succeeded, so a cache hit is always
//! a well-formed schedule. There are no automatic retries; transient failures
//! surface to the caller with a retry-worthy error code instead.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult, GenerationErrorCode};
use crate::models::ScheduleResponse;
use crate::services::cache_service::CacheService;
use crate::services::prompt_templates::{build_schedule_payload, schedule_system_prompt};
use crate::services::validator;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const TEMPERATURE: f64 = 0.3;

/// Matches a fenced code block, optionally tagged `json`, capturing the body.
static FENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)```").expect("valid fence regex")
});

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl GenerationConfig {
    /// Read provider settings from the environment. `FLOWWEEK_API_KEY` is
    /// required; base URL and model fall back to OpenAI defaults.
    pub fn from_env() -> AppResult<Self> {
        let api_key = std::env::var("FLOWWEEK_API_KEY")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                AppError::generation(
                    GenerationErrorCode::MissingApiKey,
                    "generation API key is not configured (set FLOWWEEK_API_KEY)",
                )
            })?;

        let base_url = std::env::var("FLOWWEEK_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let model = std::env::var("FLOWWEEK_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self {
            api_key,
            base_url,
            model,
            timeout: HTTP_TIMEOUT,
        })
    }
}

/// Thin HTTP client around the chat-completions endpoint.
struct Provider {
    client: reqwest::Client,
    config: GenerationConfig,
}

impl Provider {
    fn new(config: GenerationConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| AppError::other(format!("failed to build http client: {err}")))?;
        Ok(Self { client, config })
    }

    /// Single-attempt completion call; returns the assistant message content.
    async fn complete(&self, user_payload: &JsonValue, correlation_id: &str) -> AppResult<String> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);
        let body = json!({
            "model": self.config.model,
            "temperature": TEMPERATURE,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": schedule_system_prompt() },
                { "role": "user", "content": user_payload.to_string() },
            ],
        });

        debug!(
            target: "app::ai",
            correlation_id,
            model = %self.config.model,
            "sending generation request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| map_transport_error(&err, correlation_id))?;

        let status = response.status();
        if !status.is_success() {
            let (code, message, retryable) = map_http_error(status);
            warn!(
                target: "app::ai",
                correlation_id,
                status = status.as_u16(),
                retryable,
                "generation request failed"
            );
            return Err(AppError::generation_with_correlation(
                code,
                message,
                Some(correlation_id),
            ));
        }

        let envelope: JsonValue = response.json().await.map_err(|err| {
            AppError::generation_with_correlation(
                GenerationErrorCode::InvalidResponse,
                format!("unreadable provider response: {err}"),
                Some(correlation_id),
            )
        })?;

        envelope["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::generation_with_correlation(
                    GenerationErrorCode::InvalidResponse,
                    "provider response has no message content",
                    Some(correlation_id),
                )
            })
    }
}

/// Classify a non-success HTTP status. The retryable flag records whether a
/// later identical request could plausibly succeed; the service itself never
/// retries.
pub(crate) fn map_http_error(status: StatusCode) -> (GenerationErrorCode, &'static str, bool) {
    match status {
        StatusCode::UNAUTHORIZED => (
            GenerationErrorCode::Unauthorized,
            "generation API rejected the configured credentials",
            false,
        ),
        StatusCode::FORBIDDEN => (
            GenerationErrorCode::Unauthorized,
            "generation API denied access to the requested model",
            false,
        ),
        StatusCode::TOO_MANY_REQUESTS => (
            GenerationErrorCode::RateLimited,
            "generation API rate limit exceeded",
            true,
        ),
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => (
            GenerationErrorCode::InvalidRequest,
            "generation API rejected the request",
            false,
        ),
        status if status.is_server_error() => (
            GenerationErrorCode::ServiceUnavailable,
            "generation API is temporarily unavailable",
            true,
        ),
        _ => (
            GenerationErrorCode::Unknown,
            "generation API returned an unexpected status",
            false,
        ),
    }
}

fn map_transport_error(err: &reqwest::Error, correlation_id: &str) -> AppError {
    if err.is_timeout() {
        AppError::generation_with_correlation(
            GenerationErrorCode::HttpTimeout,
            "generation request timed out",
            Some(correlation_id),
        )
    } else if err.is_connect() {
        AppError::generation_with_correlation(
            GenerationErrorCode::ServiceUnavailable,
            "could not connect to the generation API",
            Some(correlation_id),
        )
    } else {
        AppError::generation_with_correlation(
            GenerationErrorCode::Unknown,
            format!("generation request failed: {err}"),
            Some(correlation_id),
        )
    }
}

/// Pull the JSON document out of a model reply. Tries a fenced code block
/// first, then the outermost brace span, then the trimmed raw text.
pub(crate) fn extract_payload(content: &str) -> String {
    if let Some(captures) = FENCE_RE.captures(content) {
        return captures[1].trim().to_string();
    }

    if let (Some(open), Some(close)) = (content.find('{'), content.rfind('}')) {
        if open < close {
            return content[open..=close].to_string();
        }
    }

    content.trim().to_string()
}

#[derive(Clone)]
pub struct GenerationService {
    provider: Arc<Provider>,
    cache: CacheService,
}

impl GenerationService {
    pub fn new(config: GenerationConfig, cache: CacheService) -> AppResult<Self> {
        Ok(Self {
            provider: Arc::new(Provider::new(config)?),
            cache,
        })
    }

    pub fn cache(&self) -> &CacheService {
        &self.cache
    }

    /// Produce a validated weekly schedule for the given free-text input.
    pub async fn generate(&self, input: &str) -> AppResult<ScheduleResponse> {
        let input = input.trim();
        let correlation_id = Uuid::new_v4().to_string();

        if let Some(cached) = self.cache.get_schedule(input)? {
            info!(target: "app::ai", correlation_id = %correlation_id, "serving schedule from cache");
            return Ok(cached);
        }

        let payload = build_schedule_payload(input);
        let content = self.provider.complete(&payload, &correlation_id).await?;

        let extracted = extract_payload(&content);
        let parsed: JsonValue = serde_json::from_str(&extracted).map_err(|err| {
            AppError::generation_with_correlation(
                GenerationErrorCode::InvalidResponse,
                format!("generation response is not valid JSON: {err}"),
                Some(&correlation_id),
            )
        })?;

        let schedule = validator::validate(&parsed)?;

        self.cache.put_schedule(input, &schedule)?;
        self.cache.save_last_input(input)?;

        info!(
            target: "app::ai",
            correlation_id = %correlation_id,
            activities = schedule.activities.len(),
            goals = schedule.weekly_goals.len(),
            "generated schedule"
        );
        Ok(schedule)
    }
}

/// Constructors and internals exposed for integration tests.
pub mod testing {
    use super::*;

    /// Build a service pointed at an arbitrary endpoint (e.g. a local mock
    /// server) with a short timeout.
    pub fn service_with_endpoint(
        base_url: &str,
        cache: CacheService,
    ) -> AppResult<GenerationService> {
        let config = GenerationConfig {
            api_key: "test-key".to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: "test-model".to_string(),
            timeout: Duration::from_secs(5),
        };
        GenerationService::new(config, cache)
    }
}
