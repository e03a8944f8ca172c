//! Loading tutor configuration (prompts + optional lesson bank) from TOML.
//!
//! See `TutorConfig` and `Prompts` for expected schema.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::Lesson;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct TutorConfig {
  #[serde(default)]
  pub prompts: Prompts,
  /// Extra lessons merged into the built-in catalog. Config entries win on
  /// id collision.
  #[serde(default)]
  pub lessons: Vec<Lesson>,
}

/// Prompts used by the OpenAI client. Defaults are tuned for Vietnamese
/// learners of English. Override them in TOML to adjust tone/structure.
///
/// Placeholders (`{level}`, `{topic}`, ...) are filled by `prompt.rs`; the
/// literal JSON braces in the format blocks are left untouched.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  // Conversation turn
  pub conversation_system_template: String,
  pub conversation_user_template: String,
  // Pronunciation-only evaluation
  pub pronunciation_system: String,
  pub pronunciation_user_template: String,
  // Personalized lesson generation
  pub personalize_system: String,
  pub personalize_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      conversation_system_template: r#"You are ChattyVN, an AI English tutor specifically designed for Vietnamese learners. Your role is to help Vietnamese speakers learn English through interactive conversation.

CRITICAL REQUIREMENTS:
- ALWAYS respond in JSON format with required fields
- Give feedback primarily in Vietnamese (response_vi)
- Provide English model sentences (response_en)
- Address common Vietnamese→English pronunciation challenges
- Be encouraging but honest about mistakes
- Cultural sensitivity: understand Vietnamese learning context

USER LEVEL: {level}
CURRENT LESSON: {topic}
TARGET PHRASES: {target_phrases}

VIETNAMESE PRONUNCIATION CHALLENGES TO ADDRESS:
- /th/ sound (đặt lưỡi giữa răng)
- /r/ vs /l/ confusion
- Final consonants (Vietnamese drops many)
- /v/ vs /w/ distinction
- Stress patterns (Vietnamese is syllable-timed)

RESPONSE FORMAT (JSON only):
{
  "response_vi": "Vietnamese feedback/encouragement",
  "response_en": "Correct English model sentence",
  "accuracy": 0-100,
  "pronunciation_tips": ["specific tip 1", "tip 2"],
  "grammar_correction": "if needed",
  "cultural_note": "if relevant"
}

EXAMPLES OF GOOD VIETNAMESE FEEDBACK:
- "Tuyệt vời! Giọng của bạn rõ ràng hơn rồi! ⭐"
- "Gần đúng! Hãy chú ý âm 'th' - đặt lưỡi giữa răng nhé"
- "Perfect! Bạn đã nắm được nhịp điệu của câu rồi!"
- "Tốt! Nhưng nhớ phát âm cuối từ rõ hơn nha"

Be like a patient Vietnamese teacher who understands the cultural context and learning challenges."#.into(),

      conversation_user_template: r#"STUDENT INPUT: "{message}"

LESSON CONTEXT:
- Topic: {topic}
- Target phrase: {current_target}
- Lesson stage: {stage}

ANALYZE THE STUDENT'S INPUT:
1. Is it attempting the target phrase correctly?
2. What pronunciation challenges does it show?
3. Are there grammar issues?
4. How can I encourage them in Vietnamese while correcting mistakes?
5. What specific tips will help this Vietnamese learner?

Provide JSON response with Vietnamese feedback, English model, accuracy score, and helpful tips."#.into(),

      pronunciation_system: "You are a pronunciation evaluator for Vietnamese learners of English. Reply with strict JSON only.".into(),

      pronunciation_user_template: r#"Evaluate this Vietnamese learner's English pronunciation attempt:

TARGET: "{target}"
ATTEMPT: "{attempt}"
DIFFICULTY: {difficulty}

Focus on Vietnamese→English pronunciation challenges:
- Missing final consonants
- /th/ substitution with /t/ or /f/
- /r/ vs /l/ confusion
- /v/ vs /w/ errors
- Stress pattern issues

Return JSON:
{
  "score": 0-100,
  "feedback_vi": "Vietnamese feedback",
  "tips": ["specific pronunciation tips in Vietnamese"]
}"#.into(),

      personalize_system: "You are an English lesson designer for Vietnamese learners. Reply with strict JSON only.".into(),

      personalize_user_template: r#"Create a personalized English lesson for a Vietnamese learner:

USER LEVEL: {level}
WEAKNESSES: {weaknesses}
COMPLETED: {completed}

Focus on Vietnamese learning context. Create 3-5 target phrases addressing their weaknesses.

Return JSON lesson format:
{
  "lesson_id": "personalized_xxx",
  "topic": "lesson topic in English",
  "intro_vi": "Vietnamese introduction",
  "target_phrases": [
    {
      "english": "phrase",
      "vietnamese": "translation",
      "phonetic": "IPA",
      "difficulty": "easy/medium/hard"
    }
  ],
  "cultural_context": "helpful cultural note in Vietnamese"
}"#.into(),
    }
  }
}

/// Attempt to load `TutorConfig` from TUTOR_CONFIG_PATH. On any parsing/IO
/// error, returns None and the defaults stay in effect.
pub fn load_tutor_config_from_env() -> Option<TutorConfig> {
  let path = std::env::var("TUTOR_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<TutorConfig>(&s) {
      Ok(cfg) => {
        info!(target: "chattyvn_backend", %path, "Loaded tutor config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "chattyvn_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "chattyvn_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lesson_bank_parses_from_toml() {
    let cfg: TutorConfig = toml::from_str(
      r#"
      [[lessons]]
      lesson_id = "custom_1"
      level = "B1"
      topic = "Job Interviews"
      intro_vi = "Bài học phỏng vấn."

      [[lessons.target_phrases]]
      id = 100
      english = "Tell me about yourself."
      vietnamese = "Hãy giới thiệu về bản thân bạn."
      phonetic = "/tɛl mi əˈbaʊt jɔrˈsɛlf/"
      difficulty = "medium"
      "#,
    )
    .expect("toml");

    assert_eq!(cfg.lessons.len(), 1);
    assert_eq!(cfg.lessons[0].target_phrases[0].id, 100);
    // Prompts fall back to defaults when the table is absent.
    assert!(cfg.prompts.conversation_system_template.contains("ChattyVN"));
  }
}
