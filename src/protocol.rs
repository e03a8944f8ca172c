//! Public request/response structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//!
//! Feedback bodies (`FeedbackResult`, `PronunciationEval`, `LessonDefinition`)
//! serialize straight from `domain`; only inbound shapes live here.

use serde::{Deserialize, Serialize};

/// POST /api/v1/chat
#[derive(Debug, Deserialize)]
pub struct ChatIn {
    pub message: String,
    #[serde(rename = "lessonId")]
    pub lesson_id: String,
    /// CEFR-ish level; defaults to "A2".
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(rename = "currentTargetId", default)]
    pub current_target_id: Option<u32>,
}

/// POST /api/v1/pronunciation
#[derive(Debug, Deserialize)]
pub struct PronunciationIn {
    pub target: String,
    pub attempt: String,
    #[serde(default)]
    pub difficulty: Option<String>,
}

/// POST /api/v1/lesson/personalized
#[derive(Debug, Deserialize)]
pub struct PersonalizeIn {
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(rename = "completedLessons", default)]
    pub completed_lessons: Vec<String>,
    #[serde(default)]
    pub level: Option<String>,
}

/// GET /api/v1/lesson/daily
#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub day: Option<u32>,
}

/// GET /api/v1/lesson
#[derive(Debug, Deserialize)]
pub struct LessonQuery {
    pub id: String,
}

/// GET /api/v1/lessons
#[derive(Debug, Deserialize)]
pub struct LessonsQuery {
    pub level: Option<String>,
    pub topic: Option<String>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

/// Body of every non-2xx API response.
#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}
