//! Deterministic scoring and canned feedback used whenever no generation
//! client is configured.
//!
//! Two independent paths live here:
//!   - `score`: rough token-overlap accuracy for pronunciation attempts
//!   - `fallback_feedback`: conversational feedback picked from canned
//!     Vietnamese strings based on keyword overlap and utterance length

use tracing::debug;

use crate::domain::{Feedback, FeedbackResult, LessonContext};
use crate::reward;
use crate::util::{first_word_lower, tokens_lower};

/// Trimmed messages shorter than this many chars are treated as not really
/// attempting the phrase.
const SHORT_UTTERANCE_CHARS: usize = 5;

// Heuristic scores never touch 0 or 100.
const SCORE_FLOOR: u8 = 40;
const SCORE_CEIL: u8 = 90;

/// Approximate accuracy of `attempt` against `target`, in [40, 90].
///
/// Both strings are whitespace-tokenized and lowercased. A target token
/// counts as matched when any attempt token is a substring of it or vice
/// versa, so "you" still matches "you!". Order and duplicates are ignored.
/// A target with no tokens scores the floor (40).
pub fn score(target: &str, attempt: &str) -> u8 {
  let target_tokens = tokens_lower(target);
  if target_tokens.is_empty() {
    return SCORE_FLOOR;
  }
  let attempt_tokens = tokens_lower(attempt);

  let matched = target_tokens
    .iter()
    .filter(|t| attempt_tokens.iter().any(|a| t.contains(a.as_str()) || a.contains(t.as_str())))
    .count();

  let raw = (matched * 100 / target_tokens.len()) as u8;
  raw.clamp(SCORE_FLOOR, SCORE_CEIL)
}

/// Conversational feedback without a model: inspect the message against the
/// lesson's target phrases and pick one of three canned replies.
///
/// Two stacked checks, in order:
///   1. keyword overlap — does the first word of any target phrase occur in
///      the message? (case-insensitive substring)
///   2. utterance length — very short messages override the keyword result
pub fn fallback_feedback(message: &str, ctx: &LessonContext) -> FeedbackResult {
  let message_lower = message.to_lowercase();
  let keyword_hit = ctx
    .target_phrases
    .iter()
    .filter_map(|p| first_word_lower(&p.english))
    .any(|w| !w.is_empty() && message_lower.contains(&w));

  let (mut accuracy, mut response_vi, mut tips) = if keyword_hit {
    (
      85u8,
      "Tuyệt vời! Bạn đã dùng đúng từ khóa rồi! ⭐".to_string(),
      vec![
        "Nhớ phát âm rõ âm cuối của từng từ".to_string(),
        "Thử nói cả câu theo mẫu nhé".to_string(),
      ],
    )
  } else {
    (
      70u8,
      "Cố gắng lắm! Hãy thử nói theo câu mẫu nhé!".to_string(),
      vec![
        "Nói chậm và rõ ràng".to_string(),
        "Chú ý trọng âm của câu".to_string(),
      ],
    )
  };

  if message.trim().chars().count() < SHORT_UTTERANCE_CHARS {
    accuracy = 60;
    response_vi = "Câu của bạn hơi ngắn. Hãy thử nói cả câu nhé!".to_string();
    tips = vec![
      "Hãy nói đầy đủ cả câu mẫu".to_string(),
      "Đừng ngại nói dài hơn một chút".to_string(),
    ];
  }

  let response_en = ctx
    .current_target
    .as_ref()
    .map(|p| p.english.clone())
    .unwrap_or_else(|| "Keep practicing!".into());

  debug!(target: "tutor", accuracy, keyword_hit, "Heuristic conversational feedback");

  FeedbackResult {
    response_vi,
    response_en,
    feedback: Feedback {
      accuracy,
      pronunciation_tips: tips,
      stars_earned: reward::stars(accuracy),
      grammar_correction: None,
      cultural_note: None,
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Difficulty, Phrase};

  fn phrase(id: u32, english: &str) -> Phrase {
    Phrase {
      id,
      english: english.into(),
      vietnamese: String::new(),
      phonetic: String::new(),
      difficulty: Difficulty::Easy,
      common_mistakes: vec![],
    }
  }

  fn ctx(phrases: Vec<Phrase>) -> LessonContext {
    LessonContext {
      topic: "Greetings & Introductions".into(),
      current_target: phrases.first().cloned(),
      target_phrases: phrases,
      stage: "practice".into(),
    }
  }

  #[test]
  fn score_counts_substring_token_matches() {
    // "hello" matches "hello,", "meet" matches "meet", "you" matches "you!"
    let s = score("Hello, nice to meet you!", "hello meet you");
    assert!(s >= 60, "expected at least 3/5 tokens matched, got {s}");
  }

  #[test]
  fn score_stays_inside_clamp_band() {
    assert_eq!(score("one two three", "one two three"), SCORE_CEIL);
    assert_eq!(score("one two three", "zzz"), SCORE_FLOOR);
    for attempt in ["", "one", "one two", "completely different words here"] {
      let s = score("the quick brown fox", attempt);
      assert!((SCORE_FLOOR..=SCORE_CEIL).contains(&s));
    }
  }

  #[test]
  fn empty_target_scores_the_floor() {
    assert_eq!(score("", "anything at all"), SCORE_FLOOR);
    assert_eq!(score("   ", "anything at all"), SCORE_FLOOR);
  }

  #[test]
  fn keyword_overlap_scores_85() {
    let c = ctx(vec![phrase(1, "Hello, nice to meet you!")]);
    let fb = fallback_feedback("hello teacher", &c);
    assert_eq!(fb.feedback.accuracy, 85);
    assert_eq!(fb.feedback.stars_earned, 2);
    assert!(!fb.response_vi.is_empty());
  }

  #[test]
  fn no_overlap_scores_70() {
    let c = ctx(vec![phrase(1, "Hello, nice to meet you!")]);
    let fb = fallback_feedback("something unrelated", &c);
    assert_eq!(fb.feedback.accuracy, 70);
    assert_eq!(fb.feedback.stars_earned, 1);
  }

  #[test]
  fn short_utterance_overrides_keyword_hit() {
    // "hi" hits the first word of "Hi there!" but is below the length bar.
    let c = ctx(vec![phrase(1, "Hi there!")]);
    let fb = fallback_feedback("hi", &c);
    assert_eq!(fb.feedback.accuracy, 60);
    assert_eq!(fb.feedback.stars_earned, 1);
  }

  #[test]
  fn model_sentence_comes_from_current_target() {
    let c = ctx(vec![phrase(1, "Where are you from?")]);
    let fb = fallback_feedback("where you from", &c);
    assert_eq!(fb.response_en, "Where are you from?");

    let empty = ctx(vec![]);
    let fb = fallback_feedback("anything", &empty);
    assert_eq!(fb.response_en, "Keep practicing!");
  }
}
