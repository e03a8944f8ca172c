//! Domain models used by the backend: lessons, phrases, feedback, and
//! personalized lesson definitions.

use serde::{Deserialize, Serialize};

/// Relative difficulty of a target phrase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}
impl Default for Difficulty {
  fn default() -> Self { Difficulty::Medium }
}

/// An English sentence the learner is practicing, with its Vietnamese
/// translation, IPA transcription, and the mistakes we usually see.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Phrase {
  pub id: u32,
  pub english: String,
  pub vietnamese: String,
  pub phonetic: String,
  #[serde(default)] pub difficulty: Difficulty,
  #[serde(default)] pub common_mistakes: Vec<String>,
}

/// A catalog lesson: topic, intro, and the phrases to practice.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lesson {
  pub lesson_id: String,
  pub level: String, // CEFR-ish (e.g., "A2", "B1")
  pub topic: String,
  pub intro_vi: String,
  pub target_phrases: Vec<Phrase>,
  #[serde(default)] pub cultural_context: Option<String>,
  #[serde(default)] pub vietnamese_challenges: Vec<String>,
}

/// Immutable snapshot of the lesson state a chat turn happens in.
/// Built by the transport layer from a `Lesson`; never mutated by the core.
#[derive(Clone, Debug)]
pub struct LessonContext {
  pub topic: String,
  pub target_phrases: Vec<Phrase>,
  pub stage: String,
  pub current_target: Option<Phrase>,
}

impl LessonContext {
  /// Snapshot a lesson for one chat turn. `stage` defaults to "practice";
  /// an unknown `current_target_id` simply leaves `current_target` empty.
  pub fn from_lesson(lesson: &Lesson, stage: Option<String>, current_target_id: Option<u32>) -> Self {
    let current_target = current_target_id
      .and_then(|id| lesson.target_phrases.iter().find(|p| p.id == id).cloned());
    Self {
      topic: lesson.topic.clone(),
      target_phrases: lesson.target_phrases.clone(),
      stage: stage.unwrap_or_else(|| "practice".into()),
      current_target,
    }
  }
}

/// Graded feedback attached to a tutor reply.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Feedback {
  pub accuracy: u8,
  pub pronunciation_tips: Vec<String>,
  pub stars_earned: u8,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub grammar_correction: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cultural_note: Option<String>,
}

/// One full tutor reply: Vietnamese feedback, an English model sentence,
/// and the graded feedback block. Created fresh per request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FeedbackResult {
  pub response_vi: String,
  pub response_en: String,
  pub feedback: Feedback,
}

/// Result of a pronunciation-only evaluation.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PronunciationEval {
  pub score: u8,
  pub feedback_vi: String,
  pub tips: Vec<String>,
}

/// A generated lesson tailored to a learner's recorded weaknesses.
#[derive(Clone, Debug, Serialize)]
pub struct LessonDefinition {
  pub lesson_id: String,
  pub topic: String,
  pub intro_vi: String,
  pub target_phrases: Vec<Phrase>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cultural_context: Option<String>,
}
