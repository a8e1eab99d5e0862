//! Accumulated questions with a selection for export.

use indexmap::{IndexMap, IndexSet};

use crate::layout::Question;

/// Insertion-ordered questions keyed by id, plus the subset selected for
/// export.
///
/// Newly inserted questions start out selected.
#[derive(Debug, Clone, Default)]
pub struct QuestionSet {
    questions: IndexMap<String, Question>,
    selected: IndexSet<String>,
}

impl QuestionSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of questions.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the set holds no questions.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Add a question and select it. A question with the same id is
    /// replaced in place; the replaced question is returned.
    pub fn insert(&mut self, question: Question) -> Option<Question> {
        let id = question.id.clone();
        let previous = self.questions.insert(id.clone(), question);
        if previous.is_some() {
            log::warn!("Duplicate question id {}; keeping the newest crop", id);
        }
        self.selected.insert(id);
        previous
    }

    /// Look up a question by id.
    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.get(id)
    }

    /// All questions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.values()
    }

    /// All ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.questions.keys().map(String::as_str)
    }

    /// Whether `id` is currently selected.
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    /// Select a question. Returns `false` for unknown ids.
    pub fn select(&mut self, id: &str) -> bool {
        if !self.questions.contains_key(id) {
            return false;
        }
        self.selected.insert(id.to_string());
        true
    }

    /// Deselect a question. Returns whether it was selected.
    pub fn deselect(&mut self, id: &str) -> bool {
        self.selected.shift_remove(id)
    }

    /// Flip the selection of a question and return its new state.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.deselect(id) {
            false
        } else {
            self.select(id)
        }
    }

    /// Select every question.
    pub fn select_all(&mut self) {
        self.selected = self.questions.keys().cloned().collect();
    }

    /// Deselect every question.
    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Number of selected questions.
    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Selected questions in insertion order.
    pub fn selected(&self) -> impl Iterator<Item = &Question> {
        self.questions
            .values()
            .filter(move |q| self.selected.contains(&q.id))
    }

    /// Remove all questions and the selection.
    pub fn clear(&mut self) {
        self.questions.clear();
        self.selected.clear();
    }
}

impl Extend<Question> for QuestionSet {
    fn extend<T: IntoIterator<Item = Question>>(&mut self, iter: T) {
        for question in iter {
            self.insert(question);
        }
    }
}
