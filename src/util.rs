//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Lowercased whitespace tokens of a sentence.
/// Punctuation is kept attached to its token; the scorer's substring
/// matching absorbs it ("you" matches "you!").
pub fn tokens_lower(s: &str) -> Vec<String> {
  s.split_whitespace().map(|t| t.to_lowercase()).collect()
}

/// First whitespace token of a phrase, lowercased ("Hello, nice..." -> "hello,").
pub fn first_word_lower(s: &str) -> Option<String> {
  s.split_whitespace().next().map(|t| {
    t.trim_matches(|c: char| c.is_ascii_punctuation()).to_lowercase()
  })
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
/// Counts chars, not bytes: feedback text is mostly Vietnamese.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.chars().count() <= max {
    s.to_string()
  } else {
    let head: String = s.chars().take(max).collect();
    format!("{}… ({} bytes total)", head, s.len())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_replaces_all_occurrences() {
    let out = fill_template("{a} and {b} and {a}", &[("a", "x"), ("b", "y")]);
    assert_eq!(out, "x and y and x");
  }

  #[test]
  fn first_word_strips_punctuation() {
    assert_eq!(first_word_lower("Hello, nice to meet you!").as_deref(), Some("hello"));
    assert_eq!(first_word_lower("  "), None);
  }
}
