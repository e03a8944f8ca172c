//! Minimal OpenAI client for our use-cases.
//!
//! We only call chat.completions and always request a strict JSON object.
//! Calls are instrumented and log model name, latency, and token usage
//! (never contents). The API key is never logged.
//!
//! Failures are split into two kinds because they recover differently:
//! `GenError::Service` (network/auth/rate-limit/envelope) triggers the
//! whole-response fallback, `GenError::Contract` (reply content is not JSON)
//! triggers per-field defaulting in `tutor`.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

use crate::config::Prompts;
use crate::domain::LessonContext;
use crate::prompt;
use crate::util::trunc_for_log;

#[derive(Debug, Error)]
pub enum GenError {
  /// The call itself failed: network, non-2xx status, or an undecodable
  /// completion envelope.
  #[error("generation service call failed: {0}")]
  Service(String),
  /// The call succeeded but the model content is not the JSON object we
  /// asked for.
  #[error("generation reply violated the output contract: {0}")]
  Contract(String),
}

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

/// Lenient view of a conversation reply. Every field is optional; `tutor`
/// fills defaults field-by-field.
#[derive(Debug, Default, Deserialize)]
pub struct RawTutorReply {
  #[serde(default)] pub response_vi: Option<String>,
  #[serde(default)] pub response_en: Option<String>,
  #[serde(default)] pub accuracy: Option<f64>,
  #[serde(default)] pub pronunciation_tips: Option<Vec<String>>,
  #[serde(default)] pub grammar_correction: Option<String>,
  #[serde(default)] pub cultural_note: Option<String>,
  /// Some replies volunteer a star count; we ignore it and always compute
  /// stars locally.
  #[serde(default)] pub stars_earned: Option<f64>,
}

/// Lenient view of a pronunciation-evaluation reply.
#[derive(Debug, Default, Deserialize)]
pub struct RawPronunciationReply {
  #[serde(default)] pub score: Option<f64>,
  #[serde(default)] pub feedback_vi: Option<String>,
  #[serde(default)] pub tips: Option<Vec<String>>,
}

/// Lenient view of a generated lesson definition.
#[derive(Debug, Default, Deserialize)]
pub struct RawLessonReply {
  #[serde(default)] pub lesson_id: Option<String>,
  #[serde(default)] pub topic: Option<String>,
  #[serde(default)] pub intro_vi: Option<String>,
  #[serde(default)] pub target_phrases: Vec<RawLessonPhrase>,
  #[serde(default)] pub cultural_context: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawLessonPhrase {
  #[serde(default)] pub english: Option<String>,
  #[serde(default)] pub vietnamese: Option<String>,
  #[serde(default)] pub phonetic: Option<String>,
  #[serde(default)] pub difficulty: Option<String>,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None
  /// and the process runs in fallback-only mode for its lifetime.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, model })
  }

  /// JSON-object chat completion. Generic over the target type T, which
  /// should be lenient (all-optional fields) so that missing fields are an
  /// `Ok`, not an error.
  #[instrument(level = "info", skip(self, system, user, temperature), fields(model = %self.model, %temperature))]
  async fn chat_json<T: for<'a> Deserialize<'a>>(
    &self,
    system: &str,
    user: &str,
    temperature: f32,
    max_tokens: Option<u32>,
  ) -> Result<T, GenError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      response_format: Some(ResponseFormat { r#type: "json_object".into() }),
      max_tokens,
    };

    let start = std::time::Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, "chattyvn-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await
      .map_err(|e| GenError::Service(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_openai_error(&body).unwrap_or_else(|| trunc_for_log(&body, 200));
      return Err(GenError::Service(format!("HTTP {}: {}", status, msg)));
    }

    let body: ChatCompletionResponse =
      res.json().await.map_err(|e| GenError::Service(e.to_string()))?;
    if let Some(usage) = &body.usage {
      info!(
        elapsed = ?start.elapsed(),
        prompt_tokens = ?usage.prompt_tokens,
        completion_tokens = ?usage.completion_tokens,
        total_tokens = ?usage.total_tokens,
        "OpenAI usage"
      );
    }
    let text = body.choices.get(0)
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default();

    serde_json::from_str::<T>(&text)
      .map_err(|e| GenError::Contract(format!("JSON parse error: {}", e)))
  }

  // --- High-level helpers (domain-specialized) ---

  /// One conversation turn: graded feedback for the learner's message.
  #[instrument(level = "info", skip(self, prompts, ctx, message, level), fields(%level, msg_len = message.len()))]
  pub async fn conversation_feedback(
    &self,
    prompts: &Prompts,
    level: &str,
    ctx: &LessonContext,
    message: &str,
  ) -> Result<RawTutorReply, GenError> {
    let system = prompt::build_system_prompt(prompts, level, ctx);
    let user = prompt::build_user_prompt(prompts, message, ctx);
    self.chat_json(&system, &user, 0.7, Some(500)).await
  }

  /// Pronunciation-only evaluation of an attempt against a target phrase.
  #[instrument(level = "info", skip(self, prompts, target, attempt), fields(target_len = target.len(), attempt_len = attempt.len()))]
  pub async fn pronunciation_feedback(
    &self,
    prompts: &Prompts,
    target: &str,
    attempt: &str,
    difficulty: &str,
  ) -> Result<RawPronunciationReply, GenError> {
    let user = prompt::build_pronunciation_prompt(prompts, target, attempt, difficulty);
    self.chat_json(&prompts.pronunciation_system, &user, 0.3, None).await
  }

  /// Generate a full lesson definition from recorded weaknesses.
  #[instrument(level = "info", skip(self, prompts, weaknesses, completed_lessons, level), fields(%level, weakness_count = weaknesses.len()))]
  pub async fn personalized_lesson(
    &self,
    prompts: &Prompts,
    weaknesses: &[String],
    completed_lessons: &[String],
    level: &str,
  ) -> Result<RawLessonReply, GenError> {
    let user = prompt::build_personalization_prompt(prompts, weaknesses, completed_lessons, level);
    self.chat_json(&prompts.personalize_system, &user, 0.8, None).await
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  response_format: Option<ResponseFormat>,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from an OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn raw_tutor_reply_tolerates_missing_fields() {
    let r: RawTutorReply = serde_json::from_str(r#"{"accuracy": 88.5}"#).expect("parse");
    assert_eq!(r.accuracy, Some(88.5));
    assert!(r.response_vi.is_none());
    assert!(r.pronunciation_tips.is_none());

    let r: RawTutorReply = serde_json::from_str("{}").expect("parse");
    assert!(r.accuracy.is_none());
  }

  #[test]
  fn non_json_content_is_a_contract_violation_shape() {
    let err = serde_json::from_str::<RawTutorReply>("Sorry, I can't do that.");
    assert!(err.is_err());
  }

  #[test]
  fn error_extraction_reads_openai_envelopes() {
    let body = r#"{"error": {"message": "Rate limit reached", "type": "requests"}}"#;
    assert_eq!(extract_openai_error(body).as_deref(), Some("Rate limit reached"));
    assert_eq!(extract_openai_error("plain text error"), None);
  }
}
