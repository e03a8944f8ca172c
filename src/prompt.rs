//! Prompt assembly for the generation service.
//!
//! Pure string templating over the `Prompts` config: lesson context is
//! interpolated into the system/user templates via `util::fill_template`.
//! The system prompt pins the JSON field set the reply parser relies on, so
//! template overrides must keep the RESPONSE FORMAT block intact.

use crate::config::Prompts;
use crate::domain::LessonContext;
use crate::util::fill_template;

/// System prompt for a conversation turn: persona, known pronunciation
/// pitfalls, the required output shape, and the lesson context.
pub fn build_system_prompt(prompts: &Prompts, level: &str, ctx: &LessonContext) -> String {
  // An empty phrase list serializes as "[]", which is still a valid prompt.
  let target_phrases =
    serde_json::to_string(&ctx.target_phrases).unwrap_or_else(|_| "[]".into());
  fill_template(
    &prompts.conversation_system_template,
    &[
      ("level", level),
      ("topic", &ctx.topic),
      ("target_phrases", &target_phrases),
    ],
  )
}

/// User prompt for a conversation turn: the learner's message plus the
/// current phrase and stage.
pub fn build_user_prompt(prompts: &Prompts, message: &str, ctx: &LessonContext) -> String {
  let current_target = ctx
    .current_target
    .as_ref()
    .map(|p| p.english.as_str())
    .unwrap_or("None");
  fill_template(
    &prompts.conversation_user_template,
    &[
      ("message", message),
      ("topic", &ctx.topic),
      ("current_target", current_target),
      ("stage", &ctx.stage),
    ],
  )
}

/// Narrow prompt for pronunciation-only evaluation.
pub fn build_pronunciation_prompt(
  prompts: &Prompts,
  target: &str,
  attempt: &str,
  difficulty: &str,
) -> String {
  fill_template(
    &prompts.pronunciation_user_template,
    &[("target", target), ("attempt", attempt), ("difficulty", difficulty)],
  )
}

/// Broad prompt requesting a full personalized lesson definition.
pub fn build_personalization_prompt(
  prompts: &Prompts,
  weaknesses: &[String],
  completed_lessons: &[String],
  level: &str,
) -> String {
  fill_template(
    &prompts.personalize_user_template,
    &[
      ("level", level),
      ("weaknesses", &weaknesses.join(", ")),
      ("completed", &completed_lessons.join(", ")),
    ],
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Difficulty, Phrase};

  fn ctx(phrases: Vec<Phrase>) -> LessonContext {
    LessonContext {
      topic: "Greetings & Introductions".into(),
      current_target: phrases.first().cloned(),
      target_phrases: phrases,
      stage: "practice".into(),
    }
  }

  fn phrase() -> Phrase {
    Phrase {
      id: 1,
      english: "Hello, nice to meet you!".into(),
      vietnamese: "Xin chào, rất vui được gặp bạn!".into(),
      phonetic: "/həˈloʊ naɪs tu mit yu/".into(),
      difficulty: Difficulty::Easy,
      common_mistakes: vec![],
    }
  }

  #[test]
  fn system_prompt_interpolates_context() {
    let prompts = Prompts::default();
    let out = build_system_prompt(&prompts, "A2", &ctx(vec![phrase()]));
    assert!(out.contains("USER LEVEL: A2"));
    assert!(out.contains("Greetings & Introductions"));
    assert!(out.contains("Hello, nice to meet you!"));
    // The output-shape contract must survive interpolation.
    assert!(out.contains("\"response_vi\""));
    assert!(out.contains("\"pronunciation_tips\""));
  }

  #[test]
  fn system_prompt_survives_empty_phrase_list() {
    let prompts = Prompts::default();
    let out = build_system_prompt(&prompts, "A2", &ctx(vec![]));
    assert!(!out.is_empty());
    assert!(out.contains("TARGET PHRASES: []"));
  }

  #[test]
  fn user_prompt_carries_message_and_stage() {
    let prompts = Prompts::default();
    let out = build_user_prompt(&prompts, "hello teacher", &ctx(vec![phrase()]));
    assert!(out.contains("STUDENT INPUT: \"hello teacher\""));
    assert!(out.contains("Target phrase: Hello, nice to meet you!"));
    assert!(out.contains("Lesson stage: practice"));

    let out = build_user_prompt(&prompts, "hi", &ctx(vec![]));
    assert!(out.contains("Target phrase: None"));
  }

  #[test]
  fn pronunciation_prompt_names_both_sentences() {
    let prompts = Prompts::default();
    let out = build_pronunciation_prompt(&prompts, "Have a great day!", "have great day", "medium");
    assert!(out.contains("TARGET: \"Have a great day!\""));
    assert!(out.contains("ATTEMPT: \"have great day\""));
    assert!(out.contains("DIFFICULTY: medium"));
  }
}
