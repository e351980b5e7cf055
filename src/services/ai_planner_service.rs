use std::time::{Duration as StdDuration, Instant};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{json, Value as JsonValue};
use tokio::time::sleep;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{AiErrorCode, AppError, AppResult};
use crate::models::plan::WeekPlan;
use crate::models::preferences::PlannerPreferences;
use crate::services::prompt_templates::{build_week_context, week_planner_system_prompt};

/// The narrative layer is an optional collaborator: the planner produces a
/// complete week plan whether or not an implementation of this trait exists.
#[async_trait]
pub trait WeekPlanSummarizer: Send + Sync {
    async fn summarize(
        &self,
        plan: &WeekPlan,
        preferences: &PlannerPreferences,
    ) -> AppResult<String>;
}

#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub api_key: String,
    pub api_base_url: String,
    pub model: String,
    pub http_timeout: StdDuration,
}

impl SummarizerConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base_url: "https://api.deepseek.com".to_string(),
            model: "deepseek-chat".to_string(),
            http_timeout: StdDuration::from_secs(30),
        }
    }
}

#[derive(Debug)]
pub struct DeepSeekSummarizer {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl DeepSeekSummarizer {
    pub fn try_new(config: SummarizerConfig) -> AppResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AppError::ai(
                AiErrorCode::MissingApiKey,
                "DeepSeek API key is not configured",
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Some(StdDuration::from_secs(90)))
            .build()
            .map_err(|err| {
                AppError::other(format!("failed to build DeepSeek HTTP client: {err}"))
            })?;

        let base_url = config.api_base_url.trim_end_matches('/').to_string();
        let endpoint = format!("{}/v1/chat/completions", base_url);

        Ok(Self {
            client,
            api_key: config.api_key,
            endpoint,
            model: config.model,
        })
    }

    async fn invoke_chat(&self, payload: &JsonValue) -> AppResult<String> {
        let correlation_id = Uuid::new_v4().to_string();
        let request_body = self.build_request_body(payload);
        let backoff_schedule = [
            StdDuration::from_secs(0),
            StdDuration::from_secs(1),
            StdDuration::from_secs(2),
            StdDuration::from_secs(4),
        ];

        let mut last_error: Option<AppError> = None;

        for (attempt, delay) in backoff_schedule.iter().enumerate() {
            if *delay > StdDuration::from_secs(0) {
                sleep(*delay).await;
            }

            debug!(
                target: "app::ai",
                attempt = attempt + 1,
                correlation_id = %correlation_id,
                "invoking DeepSeek summarizer"
            );

            let start = Instant::now();
            let response = self
                .client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await;

            match response {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let latency_ms = start.elapsed().as_millis();
                        debug!(
                            target: "app::ai",
                            correlation_id = %correlation_id,
                            latency_ms,
                            "DeepSeek responded"
                        );

                        let body: JsonValue = resp.json().await.map_err(|err| {
                            AppError::ai_with_details(
                                AiErrorCode::InvalidResponse,
                                "failed to decode DeepSeek response",
                                Some(correlation_id.as_str()),
                                Some(json!({ "reason": err.to_string() })),
                            )
                        })?;

                        let content = body
                            .pointer("/choices/0/message/content")
                            .and_then(|value| value.as_str())
                            .ok_or_else(|| {
                                AppError::ai_with_details(
                                    AiErrorCode::InvalidResponse,
                                    "DeepSeek response is missing message.content",
                                    Some(correlation_id.as_str()),
                                    Some(json!({ "reason": "missing_message_content" })),
                                )
                            })?;

                        let narrative = content.trim();
                        if narrative.is_empty() {
                            return Err(AppError::ai_with_details(
                                AiErrorCode::InvalidResponse,
                                "DeepSeek returned an empty narrative",
                                Some(correlation_id.as_str()),
                                None,
                            ));
                        }
                        return Ok(narrative.to_string());
                    }

                    let (error, retryable) = map_http_error(status, correlation_id.as_str());
                    warn!(
                        target: "app::ai",
                        correlation_id = %correlation_id,
                        status = status.as_u16(),
                        retryable,
                        "DeepSeek returned a non-success status"
                    );

                    if !retryable || attempt == backoff_schedule.len() - 1 {
                        return Err(error);
                    }

                    last_error = Some(error);
                    continue;
                }
                Err(err) => {
                    let (error, retryable) = error_from_reqwest(err, correlation_id.as_str());
                    warn!(
                        target: "app::ai",
                        correlation_id = %correlation_id,
                        retryable,
                        "DeepSeek request failed"
                    );

                    if !retryable || attempt == backoff_schedule.len() - 1 {
                        return Err(error);
                    }

                    last_error = Some(error);
                    continue;
                }
            }
        }

        if let Some(error) = last_error {
            Err(error)
        } else {
            Err(AppError::ai_with_details(
                AiErrorCode::DeepseekUnavailable,
                "DeepSeek request did not complete",
                Some(correlation_id.as_str()),
                None,
            ))
        }
    }

    fn build_request_body(&self, payload: &JsonValue) -> JsonValue {
        let user_content = serde_json::to_string(payload).unwrap_or_else(|_| "{}".to_string());
        json!({
            "model": self.model,
            "temperature": 0.3,
            "top_p": 0.9,
            "messages": [
                { "role": "system", "content": week_planner_system_prompt() },
                { "role": "user", "content": user_content }
            ]
        })
    }
}

#[async_trait]
impl WeekPlanSummarizer for DeepSeekSummarizer {
    async fn summarize(
        &self,
        plan: &WeekPlan,
        preferences: &PlannerPreferences,
    ) -> AppResult<String> {
        let context = build_week_context(plan, preferences);
        self.invoke_chat(&context).await
    }
}

fn map_http_error(status: StatusCode, correlation_id: &str) -> (AppError, bool) {
    match status {
        StatusCode::UNAUTHORIZED => (
            AppError::ai_with_details(
                AiErrorCode::MissingApiKey,
                "DeepSeek API key is invalid or unauthorized",
                Some(correlation_id),
                None,
            ),
            false,
        ),
        StatusCode::FORBIDDEN => (
            AppError::ai_with_details(
                AiErrorCode::Forbidden,
                "DeepSeek API access is forbidden",
                Some(correlation_id),
                None,
            ),
            false,
        ),
        StatusCode::TOO_MANY_REQUESTS => (
            AppError::ai_with_details(
                AiErrorCode::RateLimited,
                "DeepSeek is rate limiting requests, try again later",
                Some(correlation_id),
                None,
            ),
            true,
        ),
        status if status.is_server_error() => (
            AppError::ai_with_details(
                AiErrorCode::DeepseekUnavailable,
                format!("DeepSeek returned server error {status}"),
                Some(correlation_id),
                None,
            ),
            true,
        ),
        status => (
            AppError::ai_with_details(
                AiErrorCode::Unknown,
                format!("DeepSeek returned unexpected status {status}"),
                Some(correlation_id),
                None,
            ),
            false,
        ),
    }
}

fn error_from_reqwest(err: reqwest::Error, correlation_id: &str) -> (AppError, bool) {
    if err.is_timeout() {
        (
            AppError::ai_with_details(
                AiErrorCode::HttpTimeout,
                "DeepSeek request timed out",
                Some(correlation_id),
                Some(json!({ "reason": err.to_string() })),
            ),
            true,
        )
    } else {
        (
            AppError::ai_with_details(
                AiErrorCode::DeepseekUnavailable,
                "DeepSeek request failed to send",
                Some(correlation_id),
                Some(json!({ "reason": err.to_string() })),
            ),
            true,
        )
    }
}
