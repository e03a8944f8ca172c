//! Core tutor behaviors shared by the HTTP handlers.
//!
//! This includes:
//!   - Conversation turns (generative path + two fallback tiers)
//!   - Pronunciation-only evaluation
//!   - Personalized lesson generation
//!
//! Fallback tiers are deliberately distinct: a failed service call returns
//! one fixed canned reply, while a reply that parses with missing fields is
//! repaired field-by-field. Stars are always computed locally from the
//! resolved accuracy, whatever the reply claimed.

use thiserror::Error;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{
  Difficulty, Feedback, FeedbackResult, LessonContext, LessonDefinition, Phrase,
  PronunciationEval,
};
use crate::heuristics;
use crate::openai::{GenError, RawLessonReply, RawPronunciationReply, RawTutorReply};
use crate::reward;
use crate::state::AppState;

// Field-level defaults for replies that parsed but came back incomplete.
const DEFAULT_RESPONSE_VI: &str = "Tốt lắm! Hãy tiếp tục luyện tập!";
const DEFAULT_RESPONSE_EN: &str = "Good job!";
const DEFAULT_ACCURACY: u8 = 75;

// Whole-response fallback for failed service calls.
const FALLBACK_RESPONSE_VI: &str = "Tốt lắm! Hãy tiếp tục luyện tập nhé! 💪";
const FALLBACK_RESPONSE_EN: &str = "Keep practicing!";
const FALLBACK_ACCURACY: u8 = 70;

const PRONUNCIATION_FALLBACK_VI: &str = "Tốt! Hãy thử lại để cải thiện thêm nhé!";
const PRONUNCIATION_FALLBACK_TIP: &str = "Nói chậm và rõ ràng từng từ";

/// Why no personalized lesson came back. `Unavailable` (no credential) is a
/// distinct signal: there is no deterministic substitute for a generated
/// lesson, so callers must be able to tell it apart from a failed attempt.
#[derive(Debug, Error)]
pub enum PersonalizeError {
  #[error("personalization unavailable: no generation credential configured")]
  Unavailable,
  #[error("personalized lesson generation failed: {0}")]
  Generation(#[from] GenError),
}

/// One conversation turn. Always returns a well-formed `FeedbackResult`;
/// which path produced it is visible only in the logs.
#[instrument(level = "info", skip(state, message, ctx, level), fields(%level, msg_len = message.len(), topic = %ctx.topic))]
pub async fn handle_conversation(
  state: &AppState,
  message: &str,
  ctx: &LessonContext,
  level: &str,
) -> FeedbackResult {
  let Some(oa) = &state.openai else {
    info!(target: "tutor", "No generation client; heuristic feedback");
    return heuristics::fallback_feedback(message, ctx);
  };

  match oa.conversation_feedback(&state.prompts, level, ctx, message).await {
    Ok(raw) => resolve_reply(raw),
    Err(GenError::Contract(e)) => {
      warn!(target: "tutor", error = %e, "Reply violated output contract; using field defaults");
      resolve_reply(RawTutorReply::default())
    }
    Err(GenError::Service(e)) => {
      error!(target: "tutor", error = %e, "Generation call failed; using canned fallback");
      canned_fallback()
    }
  }
}

/// Pronunciation-only evaluation of `attempt` against `target`.
#[instrument(level = "info", skip(state, target, attempt, difficulty), fields(%difficulty, target_len = target.len()))]
pub async fn evaluate_pronunciation(
  state: &AppState,
  target: &str,
  attempt: &str,
  difficulty: &str,
) -> PronunciationEval {
  let Some(oa) = &state.openai else {
    // Deterministic path: token-overlap score, canned feedback.
    return PronunciationEval {
      score: heuristics::score(target, attempt),
      feedback_vi: PRONUNCIATION_FALLBACK_VI.into(),
      tips: vec![PRONUNCIATION_FALLBACK_TIP.into()],
    };
  };

  match oa.pronunciation_feedback(&state.prompts, target, attempt, difficulty).await {
    Ok(raw) => resolve_pronunciation(raw),
    Err(e) => {
      error!(target: "tutor", error = %e, "Pronunciation eval failed; using canned result");
      PronunciationEval {
        score: 70,
        feedback_vi: PRONUNCIATION_FALLBACK_VI.into(),
        tips: vec![PRONUNCIATION_FALLBACK_TIP.into()],
      }
    }
  }
}

/// Ask the generator for a lesson tailored to the learner's weaknesses.
/// Thin marshaling; all judgment lives in the model.
#[instrument(level = "info", skip(state, weaknesses, completed_lessons, level), fields(%level, weakness_count = weaknesses.len()))]
pub async fn generate_personalized_lesson(
  state: &AppState,
  weaknesses: &[String],
  completed_lessons: &[String],
  level: &str,
) -> Result<LessonDefinition, PersonalizeError> {
  let Some(oa) = &state.openai else {
    return Err(PersonalizeError::Unavailable);
  };

  let raw = oa
    .personalized_lesson(&state.prompts, weaknesses, completed_lessons, level)
    .await?;
  let lesson = resolve_lesson(raw)?;
  info!(target: "tutor", lesson_id = %lesson.lesson_id, phrases = lesson.target_phrases.len(), "Personalized lesson generated");
  Ok(lesson)
}

// -------- Reply resolution (pure, field-by-field) --------

fn non_empty(s: Option<String>) -> Option<String> {
  s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn clamp_accuracy(raw: Option<f64>, default: u8) -> u8 {
  match raw {
    Some(a) if a.is_finite() => a.clamp(0.0, 100.0).round() as u8,
    _ => default,
  }
}

/// Fill defaults for whatever the reply left out, then grade locally.
fn resolve_reply(raw: RawTutorReply) -> FeedbackResult {
  let accuracy = clamp_accuracy(raw.accuracy, DEFAULT_ACCURACY);
  if let Some(claimed) = raw.stars_earned {
    tracing::debug!(target: "tutor", claimed, "Ignoring upstream star count");
  }
  FeedbackResult {
    response_vi: non_empty(raw.response_vi).unwrap_or_else(|| DEFAULT_RESPONSE_VI.into()),
    response_en: non_empty(raw.response_en).unwrap_or_else(|| DEFAULT_RESPONSE_EN.into()),
    feedback: Feedback {
      accuracy,
      pronunciation_tips: raw.pronunciation_tips.unwrap_or_default(),
      stars_earned: reward::stars(accuracy),
      grammar_correction: non_empty(raw.grammar_correction),
      cultural_note: non_empty(raw.cultural_note),
    },
  }
}

/// The fixed reply for a failed service call. Simpler than the field-default
/// object on purpose.
fn canned_fallback() -> FeedbackResult {
  FeedbackResult {
    response_vi: FALLBACK_RESPONSE_VI.into(),
    response_en: FALLBACK_RESPONSE_EN.into(),
    feedback: Feedback {
      accuracy: FALLBACK_ACCURACY,
      pronunciation_tips: vec![
        "Hãy nói chậm và rõ ràng".into(),
        "Chú ý phát âm từng từ một".into(),
      ],
      stars_earned: reward::stars(FALLBACK_ACCURACY),
      grammar_correction: None,
      cultural_note: None,
    },
  }
}

fn resolve_pronunciation(raw: RawPronunciationReply) -> PronunciationEval {
  PronunciationEval {
    score: clamp_accuracy(raw.score, 70),
    feedback_vi: non_empty(raw.feedback_vi).unwrap_or_else(|| PRONUNCIATION_FALLBACK_VI.into()),
    tips: raw.tips.unwrap_or_else(|| vec![PRONUNCIATION_FALLBACK_TIP.into()]),
  }
}

/// Turn a raw lesson reply into a usable `LessonDefinition`. A reply with no
/// usable phrases counts as a contract violation, not an empty lesson.
fn resolve_lesson(raw: RawLessonReply) -> Result<LessonDefinition, GenError> {
  let phrases: Vec<Phrase> = raw
    .target_phrases
    .into_iter()
    .filter_map(|p| {
      let english = non_empty(p.english)?;
      let vietnamese = non_empty(p.vietnamese)?;
      Some((english, vietnamese, p.phonetic, p.difficulty))
    })
    .enumerate()
    .map(|(i, (english, vietnamese, phonetic, difficulty))| Phrase {
      id: (i + 1) as u32,
      english,
      vietnamese,
      phonetic: phonetic.unwrap_or_default(),
      difficulty: parse_difficulty(difficulty.as_deref()),
      common_mistakes: vec![],
    })
    .collect();

  if phrases.is_empty() {
    return Err(GenError::Contract("lesson reply contained no usable target phrases".into()));
  }

  Ok(LessonDefinition {
    lesson_id: non_empty(raw.lesson_id)
      .unwrap_or_else(|| format!("personalized_{}", Uuid::new_v4())),
    topic: non_empty(raw.topic).unwrap_or_else(|| "Personalized Practice".into()),
    intro_vi: non_empty(raw.intro_vi)
      .unwrap_or_else(|| "Bài học được thiết kế riêng cho bạn!".into()),
    target_phrases: phrases,
    cultural_context: non_empty(raw.cultural_context),
  })
}

fn parse_difficulty(s: Option<&str>) -> Difficulty {
  match s.map(|s| s.trim().to_lowercase()).as_deref() {
    Some("easy") => Difficulty::Easy,
    Some("hard") => Difficulty::Hard,
    _ => Difficulty::Medium,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::openai::RawLessonPhrase;

  #[test]
  fn complete_reply_passes_through_with_local_stars() {
    let raw = RawTutorReply {
      response_vi: Some("Tuyệt vời!".into()),
      response_en: Some("Hello, nice to meet you!".into()),
      accuracy: Some(92.0),
      pronunciation_tips: Some(vec!["Chú ý âm cuối".into()]),
      grammar_correction: None,
      cultural_note: Some("Chào hỏi ngắn gọn là đủ.".into()),
      stars_earned: Some(1.0), // reply lies about stars; we ignore it
    };
    let fb = resolve_reply(raw);
    assert_eq!(fb.feedback.accuracy, 92);
    assert_eq!(fb.feedback.stars_earned, 3);
    assert_eq!(fb.response_vi, "Tuyệt vời!");
    assert_eq!(fb.feedback.cultural_note.as_deref(), Some("Chào hỏi ngắn gọn là đủ."));
  }

  #[test]
  fn missing_fields_get_defaults() {
    let fb = resolve_reply(RawTutorReply::default());
    assert_eq!(fb.response_vi, DEFAULT_RESPONSE_VI);
    assert_eq!(fb.response_en, DEFAULT_RESPONSE_EN);
    assert_eq!(fb.feedback.accuracy, DEFAULT_ACCURACY);
    assert_eq!(fb.feedback.stars_earned, reward::stars(DEFAULT_ACCURACY));
    assert!(fb.feedback.pronunciation_tips.is_empty());
    assert!(fb.feedback.grammar_correction.is_none());
  }

  #[test]
  fn blank_response_vi_is_replaced() {
    let raw = RawTutorReply { response_vi: Some("   ".into()), ..Default::default() };
    let fb = resolve_reply(raw);
    assert_eq!(fb.response_vi, DEFAULT_RESPONSE_VI);
    assert!(!fb.response_vi.is_empty());
  }

  #[test]
  fn out_of_range_accuracy_is_clamped() {
    let raw = RawTutorReply { accuracy: Some(250.0), ..Default::default() };
    assert_eq!(resolve_reply(raw).feedback.accuracy, 100);
    let raw = RawTutorReply { accuracy: Some(-3.0), ..Default::default() };
    assert_eq!(resolve_reply(raw).feedback.accuracy, 0);
    let raw = RawTutorReply { accuracy: Some(f64::NAN), ..Default::default() };
    assert_eq!(resolve_reply(raw).feedback.accuracy, DEFAULT_ACCURACY);
  }

  #[test]
  fn canned_fallback_is_the_fixed_tuple() {
    let fb = canned_fallback();
    assert_eq!(fb.response_vi, FALLBACK_RESPONSE_VI);
    assert_eq!(fb.response_en, FALLBACK_RESPONSE_EN);
    assert_eq!(fb.feedback.accuracy, 70);
    assert_eq!(fb.feedback.stars_earned, 1);
    assert_eq!(fb.feedback.pronunciation_tips.len(), 2);
  }

  #[test]
  fn pronunciation_resolution_fills_defaults() {
    let eval = resolve_pronunciation(RawPronunciationReply::default());
    assert_eq!(eval.score, 70);
    assert_eq!(eval.feedback_vi, PRONUNCIATION_FALLBACK_VI);
    assert_eq!(eval.tips.len(), 1);

    let eval = resolve_pronunciation(RawPronunciationReply {
      score: Some(95.4),
      feedback_vi: Some("Rất tốt!".into()),
      tips: Some(vec![]),
    });
    assert_eq!(eval.score, 95);
    assert!(eval.tips.is_empty());
  }

  #[test]
  fn lesson_with_no_usable_phrases_is_a_contract_violation() {
    let raw = RawLessonReply {
      target_phrases: vec![RawLessonPhrase {
        english: None,
        vietnamese: Some("chỉ có tiếng Việt".into()),
        phonetic: None,
        difficulty: None,
      }],
      ..Default::default()
    };
    assert!(matches!(resolve_lesson(raw), Err(GenError::Contract(_))));
  }

  #[test]
  fn lesson_resolution_numbers_phrases_and_parses_difficulty() {
    let raw = RawLessonReply {
      lesson_id: None,
      topic: Some("Th sounds".into()),
      intro_vi: None,
      target_phrases: vec![
        RawLessonPhrase {
          english: Some("Thank you very much.".into()),
          vietnamese: Some("Cảm ơn bạn rất nhiều.".into()),
          phonetic: Some("/θæŋk ju ˈvɛri mʌtʃ/".into()),
          difficulty: Some("Easy".into()),
        },
        RawLessonPhrase {
          english: Some("I think this is right.".into()),
          vietnamese: Some("Tôi nghĩ điều này đúng.".into()),
          phonetic: None,
          difficulty: Some("unknown".into()),
        },
      ],
      cultural_context: None,
    };
    let lesson = resolve_lesson(raw).expect("lesson");
    assert!(lesson.lesson_id.starts_with("personalized_"));
    assert_eq!(lesson.target_phrases.len(), 2);
    assert_eq!(lesson.target_phrases[0].id, 1);
    assert_eq!(lesson.target_phrases[0].difficulty, Difficulty::Easy);
    assert_eq!(lesson.target_phrases[1].difficulty, Difficulty::Medium);
    assert_eq!(lesson.intro_vi, "Bài học được thiết kế riêng cho bạn!");
  }

  #[test]
  fn unavailable_is_distinguishable_from_generation_failure() {
    let unavailable = PersonalizeError::Unavailable;
    let failed = PersonalizeError::Generation(GenError::Contract("empty".into()));
    assert!(matches!(unavailable, PersonalizeError::Unavailable));
    assert!(matches!(failed, PersonalizeError::Generation(_)));
  }
}
