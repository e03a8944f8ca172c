//! Application state: lesson catalog, prompts, and the optional OpenAI client.
//!
//! Everything here is built once at startup and read-only afterwards; a
//! request never mutates shared state. Whether a generation credential was
//! supplied is visible only as `openai: Option<OpenAI>`.

use std::collections::HashMap;

use tracing::{info, instrument, warn};

use crate::config::{load_tutor_config_from_env, Prompts};
use crate::domain::Lesson;
use crate::lessons::builtin_lessons;
use crate::openai::OpenAI;

pub struct AppState {
    pub lessons: HashMap<String, Lesson>,
    /// Lesson ids in daily-rotation order (built-ins first, config extras after).
    pub daily_order: Vec<String>,
    pub prompts: Prompts,
    pub openai: Option<OpenAI>,
}

impl AppState {
    /// Build state from env: load config, merge the lesson catalog, init OpenAI.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg_opt = load_tutor_config_from_env();
        let prompts = cfg_opt
            .as_ref()
            .map(|c| c.prompts.clone())
            .unwrap_or_default();

        let mut lessons = HashMap::<String, Lesson>::new();
        let mut daily_order = Vec::<String>::new();

        for lesson in builtin_lessons() {
            daily_order.push(lesson.lesson_id.clone());
            lessons.insert(lesson.lesson_id.clone(), lesson);
        }
        let builtin_count = daily_order.len();

        // Config lessons override built-ins on id collision and extend the
        // rotation otherwise.
        if let Some(cfg) = &cfg_opt {
            for lesson in &cfg.lessons {
                if lesson.target_phrases.is_empty() {
                    warn!(target: "lesson", id = %lesson.lesson_id, "Skipping config lesson: no target phrases");
                    continue;
                }
                if lessons.insert(lesson.lesson_id.clone(), lesson.clone()).is_none() {
                    daily_order.push(lesson.lesson_id.clone());
                }
            }
        }

        info!(
            target: "lesson",
            builtin = builtin_count,
            from_config = lessons.len() - builtin_count,
            total = lessons.len(),
            "Startup lesson inventory"
        );

        let openai = OpenAI::from_env();
        if let Some(oa) = &openai {
            info!(target: "chattyvn_backend", base_url = %oa.base_url, model = %oa.model, "OpenAI enabled.");
        } else {
            info!(target: "chattyvn_backend", "OpenAI disabled (no OPENAI_API_KEY). Using heuristic fallbacks.");
        }

        Self { lessons, daily_order, prompts, openai }
    }

    /// Read-only access to a lesson by id.
    pub fn lesson_by_id(&self, id: &str) -> Option<&Lesson> {
        self.lessons.get(id)
    }

    /// Lesson for a 1-based day number; wraps around the catalog.
    pub fn daily_lesson(&self, day: u32) -> Option<&Lesson> {
        if self.daily_order.is_empty() {
            return None;
        }
        let index = day.saturating_sub(1) as usize % self.daily_order.len();
        self.lessons.get(&self.daily_order[index])
    }

    /// All lessons at a given level (exact, case-insensitive).
    pub fn lessons_by_level(&self, level: &str) -> Vec<&Lesson> {
        self.lessons
            .values()
            .filter(|l| l.level.eq_ignore_ascii_case(level))
            .collect()
    }

    /// Lessons whose topic contains `needle` (case-insensitive).
    pub fn search_by_topic(&self, needle: &str) -> Vec<&Lesson> {
        let needle = needle.to_lowercase();
        self.lessons
            .values()
            .filter(|l| l.topic.to_lowercase().contains(&needle))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_state() -> AppState {
        let mut lessons = HashMap::new();
        let mut daily_order = Vec::new();
        for lesson in builtin_lessons() {
            daily_order.push(lesson.lesson_id.clone());
            lessons.insert(lesson.lesson_id.clone(), lesson);
        }
        AppState { lessons, daily_order, prompts: Prompts::default(), openai: None }
    }

    #[test]
    fn daily_lesson_wraps_modulo_catalog_size() {
        let state = bare_state();
        let day1 = state.daily_lesson(1).expect("day 1").lesson_id.clone();
        let day4 = state.daily_lesson(4).expect("day 4").lesson_id.clone();
        assert_eq!(day1, day4);
        // Day 0 is treated as day 1 rather than panicking.
        assert_eq!(state.daily_lesson(0).expect("day 0").lesson_id, day1);
    }

    #[test]
    fn lookup_and_filters_work() {
        let state = bare_state();
        assert!(state.lesson_by_id("day_1_greetings").is_some());
        assert!(state.lesson_by_id("nope").is_none());
        assert_eq!(state.lessons_by_level("a2").len(), 3);
        assert!(state.lessons_by_level("C2").is_empty());
        assert_eq!(state.search_by_topic("food").len(), 1);
    }
}
