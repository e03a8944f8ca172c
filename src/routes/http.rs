//! HTTP endpoint handlers. These are thin wrappers that validate input and
//! forward to core logic. Missing/empty required fields are caller errors
//! and are rejected here; the core never compensates for them.

use std::sync::Arc;

use axum::{
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use tracing::{info, instrument};

use crate::domain::LessonContext;
use crate::protocol::*;
use crate::state::AppState;
use crate::tutor::{self, PersonalizeError};

const DEFAULT_LEVEL: &str = "A2";

fn bad_request(msg: &str) -> (StatusCode, Json<ErrorOut>) {
  (StatusCode::BAD_REQUEST, Json(ErrorOut { error: msg.into() }))
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state), fields(day = q.day.unwrap_or(1)))]
pub async fn http_get_daily_lesson(
  State(state): State<Arc<AppState>>,
  Query(q): Query<DailyQuery>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorOut>)> {
  let day = q.day.unwrap_or(1);
  let lesson = state.daily_lesson(day).ok_or_else(|| {
    (StatusCode::NOT_FOUND, Json(ErrorOut { error: "lesson catalog is empty".into() }))
  })?;
  info!(target: "lesson", day, id = %lesson.lesson_id, "HTTP daily lesson served");
  Ok(Json(lesson.clone()))
}

#[instrument(level = "info", skip(state), fields(id = %q.id))]
pub async fn http_get_lesson(
  State(state): State<Arc<AppState>>,
  Query(q): Query<LessonQuery>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorOut>)> {
  let lesson = state.lesson_by_id(&q.id).ok_or_else(|| {
    (StatusCode::NOT_FOUND, Json(ErrorOut { error: format!("unknown lesson: {}", q.id) }))
  })?;
  Ok(Json(lesson.clone()))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_lessons(
  State(state): State<Arc<AppState>>,
  Query(q): Query<LessonsQuery>,
) -> impl IntoResponse {
  let mut lessons: Vec<_> = match &q.level {
    Some(level) => state.lessons_by_level(level),
    None => state.lessons.values().collect(),
  };
  if let Some(topic) = &q.topic {
    let needle = topic.to_lowercase();
    lessons.retain(|l| l.topic.to_lowercase().contains(&needle));
  }
  lessons.sort_by(|a, b| a.lesson_id.cmp(&b.lesson_id));
  Json(lessons.into_iter().cloned().collect::<Vec<_>>())
}

#[instrument(level = "info", skip(state, body), fields(lesson_id = %body.lesson_id, msg_len = body.message.len()))]
pub async fn http_post_chat(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ChatIn>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorOut>)> {
  if body.message.trim().is_empty() {
    return Err(bad_request("message must not be empty"));
  }
  let lesson = state
    .lesson_by_id(&body.lesson_id)
    .ok_or_else(|| bad_request(&format!("unknown lesson: {}", body.lesson_id)))?;

  let ctx = LessonContext::from_lesson(lesson, body.stage, body.current_target_id);
  let level = body.level.unwrap_or_else(|| DEFAULT_LEVEL.into());

  let result = tutor::handle_conversation(&state, &body.message, &ctx, &level).await;
  info!(target: "tutor", lesson_id = %body.lesson_id, accuracy = result.feedback.accuracy, stars = result.feedback.stars_earned, "HTTP chat turn evaluated");
  Ok(Json(result))
}

#[instrument(level = "info", skip(state, body), fields(target_len = body.target.len(), attempt_len = body.attempt.len()))]
pub async fn http_post_pronunciation(
  State(state): State<Arc<AppState>>,
  Json(body): Json<PronunciationIn>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorOut>)> {
  if body.target.trim().is_empty() {
    return Err(bad_request("target must not be empty"));
  }
  if body.attempt.trim().is_empty() {
    return Err(bad_request("attempt must not be empty"));
  }
  let difficulty = body.difficulty.unwrap_or_else(|| "medium".into());

  let eval = tutor::evaluate_pronunciation(&state, &body.target, &body.attempt, &difficulty).await;
  info!(target: "tutor", score = eval.score, "HTTP pronunciation evaluated");
  Ok(Json(eval))
}

#[instrument(level = "info", skip(state, body), fields(weakness_count = body.weaknesses.len()))]
pub async fn http_post_personalized(
  State(state): State<Arc<AppState>>,
  Json(body): Json<PersonalizeIn>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorOut>)> {
  let level = body.level.unwrap_or_else(|| DEFAULT_LEVEL.into());

  match tutor::generate_personalized_lesson(&state, &body.weaknesses, &body.completed_lessons, &level).await {
    Ok(lesson) => Ok(Json(lesson)),
    Err(PersonalizeError::Unavailable) => Err((
      StatusCode::SERVICE_UNAVAILABLE,
      Json(ErrorOut { error: "personalized lessons are not available".into() }),
    )),
    Err(PersonalizeError::Generation(e)) => Err((
      StatusCode::BAD_GATEWAY,
      Json(ErrorOut { error: format!("lesson generation failed: {}", e) }),
    )),
  }
}
