//! Lemma-level categorization of naming texts into designations and
//! epithets.
//!
//! The interactive part is a small state machine: the caller feeds one
//! [`LemmaChoice`] per pending lemma and may step back at any point. The
//! undo stack is session-local; remembered categories and the ignore list
//! live in [`LemmaTables`] and survive the session.

use crate::dictionary::{LemmaCategory, LemmaTables};
use once_cell::sync::Lazy;
use regex::Regex;

static RE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

/// Alphabetic tokens of a naming text, lowercased. Punctuation and digits
/// are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    RE_TOKEN
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .filter(|t| t.chars().all(char::is_alphabetic) && !t.is_empty())
        .collect()
}

/// Resolve every token of a naming text to its lemma.
pub fn lemmatize(text: &str, tables: &LemmaTables) -> Vec<String> {
    tokenize(text).iter().map(|t| tables.resolve(t)).collect()
}

/// The annotator's answer for one lemma.
#[derive(Debug, Clone)]
pub enum LemmaChoice {
    /// Take the remembered category. Only valid when one exists.
    Accept,
    /// Classify this lemma and remember the category.
    Assign(LemmaCategory),
    /// Put the lemma on the permanent ignore list.
    Ignore,
    /// Record a corrected form instead of the lemma, with its category.
    Replace {
        text: String,
        category: LemmaCategory,
    },
    /// Step back to the previous decision.
    Back,
}

#[derive(Debug, Clone)]
enum Action {
    Assigned {
        index: usize,
        category: LemmaCategory,
    },
    Ignored {
        index: usize,
        lemma: String,
    },
    Overrode {
        index: usize,
        replacement: String,
        category: LemmaCategory,
        previous: Option<LemmaCategory>,
    },
}

/// Designation slots per entry; excess assignments are refused up front.
pub const MAX_DESIGNATIONS: usize = 4;
/// Epithet slots per entry.
pub const MAX_EPITHETS: usize = 5;

/// One entry's classification pass over its lemma sequence.
pub struct CategorizationSession<'a> {
    lemmas: Vec<String>,
    tables: &'a mut LemmaTables,
    designations: Vec<String>,
    epithets: Vec<String>,
    undo: Vec<Action>,
    index: usize,
}

impl<'a> CategorizationSession<'a> {
    pub fn new(lemmas: Vec<String>, tables: &'a mut LemmaTables) -> Self {
        let mut session = CategorizationSession {
            lemmas,
            tables,
            designations: Vec::new(),
            epithets: Vec::new(),
            undo: Vec::new(),
            index: 0,
        };
        session.skip_ignored();
        session
    }

    fn skip_ignored(&mut self) {
        while self
            .lemmas
            .get(self.index)
            .is_some_and(|l| self.tables.is_ignored(l))
        {
            self.index += 1;
        }
    }

    pub fn is_done(&self) -> bool {
        self.index >= self.lemmas.len()
    }

    /// The lemma awaiting a decision, with its remembered category if any.
    pub fn current(&self) -> Option<(&str, Option<LemmaCategory>)> {
        self.lemmas
            .get(self.index)
            .map(|l| (l.as_str(), self.tables.category_of(l)))
    }

    /// Apply the annotator's choice to the current lemma. Returns `false`
    /// when the choice could not be applied (accept without a remembered
    /// category, back at the beginning, full slot list); the caller should
    /// re-prompt.
    pub fn apply(&mut self, choice: LemmaChoice) -> bool {
        if matches!(choice, LemmaChoice::Back) {
            return self.step_back();
        }
        let Some(lemma) = self.lemmas.get(self.index).cloned() else {
            return false;
        };

        match choice {
            LemmaChoice::Accept => {
                let Some(category) = self.tables.category_of(&lemma) else {
                    return false;
                };
                if !self.push_classified(lemma, category) {
                    return false;
                }
                self.undo.push(Action::Assigned {
                    index: self.index,
                    category,
                });
            }
            LemmaChoice::Assign(category) => {
                if !self.push_classified(lemma.clone(), category) {
                    return false;
                }
                self.tables.set_category(&lemma, category);
                self.undo.push(Action::Assigned {
                    index: self.index,
                    category,
                });
            }
            LemmaChoice::Ignore => {
                self.tables.ignore(&lemma);
                self.undo.push(Action::Ignored {
                    index: self.index,
                    lemma,
                });
            }
            LemmaChoice::Replace { text, category } => {
                let replacement = text.trim().to_lowercase();
                if replacement.is_empty() || !self.push_classified(replacement.clone(), category) {
                    return false;
                }
                let previous = self.tables.category_of(&replacement);
                self.tables.set_category(&replacement, category);
                self.undo.push(Action::Overrode {
                    index: self.index,
                    replacement,
                    category,
                    previous,
                });
            }
            LemmaChoice::Back => return false,
        }

        self.index += 1;
        self.skip_ignored();
        true
    }

    fn push_classified(&mut self, text: String, category: LemmaCategory) -> bool {
        let (list, cap) = match category {
            LemmaCategory::Designation => (&mut self.designations, MAX_DESIGNATIONS),
            LemmaCategory::Epithet => (&mut self.epithets, MAX_EPITHETS),
        };
        if list.len() >= cap {
            return false;
        }
        list.push(text);
        true
    }

    fn step_back(&mut self) -> bool {
        let Some(action) = self.undo.pop() else {
            return false;
        };
        match action {
            Action::Assigned { index, category } => {
                self.pop_classified(category);
                self.index = index;
            }
            Action::Ignored { index, lemma } => {
                self.tables.unignore(&lemma);
                self.index = index;
            }
            Action::Overrode {
                index,
                replacement,
                category,
                previous,
            } => {
                self.pop_classified(category);
                match previous {
                    Some(prev) => self.tables.set_category(&replacement, prev),
                    None => self.tables.clear_category(&replacement),
                }
                self.index = index;
            }
        }
        true
    }

    fn pop_classified(&mut self, category: LemmaCategory) {
        match category {
            LemmaCategory::Designation => self.designations.pop(),
            LemmaCategory::Epithet => self.epithets.pop(),
        };
    }

    /// The collected designation and epithet lists, in decision order.
    pub fn into_result(self) -> (Vec<String>, Vec<String>) {
        (self.designations, self.epithets)
    }

    pub fn is_empty_result(&self) -> bool {
        self.designations.is_empty() && self.epithets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::LemmaTables;

    #[test]
    fn test_tokenize_keeps_only_words() {
        assert_eq!(
            tokenize("Diu schœne, kriemhilt!"),
            vec!["diu", "schœne", "kriemhilt"]
        );
        assert_eq!(tokenize("an. 3 zîten"), vec!["an", "zîten"]);
        assert!(tokenize("...").is_empty());
    }

    #[test]
    fn test_lemmatize_resolves_variants() {
        let mut tables = LemmaTables::default();
        tables.add_mapping("kuene", "kuenen");
        assert_eq!(lemmatize("der kuenen helt", &tables), vec!["der", "kuene", "helt"]);
    }

    #[test]
    fn test_session_assigns_and_collects() {
        let mut tables = LemmaTables::default();
        let lemmas = vec!["guot".to_string(), "man".to_string()];
        let mut session = CategorizationSession::new(lemmas, &mut tables);

        assert!(session.apply(LemmaChoice::Assign(LemmaCategory::Epithet)));
        assert!(session.apply(LemmaChoice::Assign(LemmaCategory::Designation)));
        assert!(session.is_done());

        let (designations, epithets) = session.into_result();
        assert_eq!(designations, vec!["man"]);
        assert_eq!(epithets, vec!["guot"]);
        assert_eq!(tables.category_of("man"), Some(LemmaCategory::Designation));
    }

    #[test]
    fn test_accept_requires_remembered_category() {
        let mut tables = LemmaTables::default();
        let mut session = CategorizationSession::new(vec!["guot".to_string()], &mut tables);
        assert!(!session.apply(LemmaChoice::Accept));

        // Once remembered, accept works.
        session.tables.set_category("guot", LemmaCategory::Epithet);
        assert!(session.apply(LemmaChoice::Accept));
        assert!(session.is_done());
    }

    #[test]
    fn test_ignored_lemmas_are_skipped() {
        let mut tables = LemmaTables::default();
        tables.ignore("der");
        let lemmas = vec!["der".to_string(), "kuene".to_string()];
        let session = CategorizationSession::new(lemmas, &mut tables);
        assert_eq!(session.current().map(|(l, _)| l.to_string()), Some("kuene".to_string()));
    }

    #[test]
    fn test_back_reverts_assignment() {
        let mut tables = LemmaTables::default();
        let lemmas = vec!["guot".to_string(), "man".to_string()];
        let mut session = CategorizationSession::new(lemmas, &mut tables);

        session.apply(LemmaChoice::Assign(LemmaCategory::Epithet));
        assert!(session.apply(LemmaChoice::Back));
        assert_eq!(session.current().map(|(l, _)| l.to_string()), Some("guot".to_string()));
        assert!(session.is_empty_result());

        // At the beginning, back is refused.
        assert!(!session.apply(LemmaChoice::Back));
    }

    #[test]
    fn test_back_reverts_ignore() {
        let mut tables = LemmaTables::default();
        let mut session = CategorizationSession::new(vec!["der".to_string()], &mut tables);
        session.apply(LemmaChoice::Ignore);
        assert!(session.is_done());

        session.apply(LemmaChoice::Back);
        assert_eq!(session.current().map(|(l, _)| l.to_string()), Some("der".to_string()));
        assert!(!session.tables.is_ignored("der"));
    }

    #[test]
    fn test_back_reverts_replacement_category() {
        let mut tables = LemmaTables::default();
        let mut session = CategorizationSession::new(vec!["kvene".to_string()], &mut tables);
        session.apply(LemmaChoice::Replace {
            text: "kuene".to_string(),
            category: LemmaCategory::Epithet,
        });
        assert_eq!(session.tables.category_of("kuene"), Some(LemmaCategory::Epithet));

        session.apply(LemmaChoice::Back);
        assert_eq!(session.tables.category_of("kuene"), None);
        assert!(session.is_empty_result());
    }

    #[test]
    fn test_designation_slots_are_capped() {
        let mut tables = LemmaTables::default();
        let lemmas: Vec<String> = (0..5).map(|i| format!("lemma{i}")).collect();
        let mut session = CategorizationSession::new(lemmas, &mut tables);
        for _ in 0..MAX_DESIGNATIONS {
            assert!(session.apply(LemmaChoice::Assign(LemmaCategory::Designation)));
        }
        assert!(!session.apply(LemmaChoice::Assign(LemmaCategory::Designation)));
        assert!(session.apply(LemmaChoice::Assign(LemmaCategory::Epithet)));
    }
}
