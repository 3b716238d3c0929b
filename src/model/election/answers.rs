use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::election::{Configuration, QuestionId, QuestionKind};

/// A voter's answer to a single question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    /// One flag per choice.
    Select(Vec<bool>),
    /// Destination position per choice, forming a permutation.
    Rank(Vec<u32>),
    /// One free-text string per declared field.
    Text(Vec<String>),
}

/// All answers of one ballot, keyed by question ID.
pub type AnswerSet = BTreeMap<QuestionId, Answer>;

/// Check an answer set against the election configuration. Runs before any
/// encoding or network call; a violation means the voter corrects their
/// input locally.
pub fn validate_answers(
    configuration: &Configuration,
    answers: &AnswerSet,
) -> Result<(), ValidationError> {
    let questions = configuration.questions();

    for id in answers.keys() {
        if !questions.iter().any(|q| &q.id == id) {
            return Err(ValidationError::UnknownQuestion {
                question: id.clone(),
            });
        }
    }

    for question in questions {
        let answer = answers
            .get(&question.id)
            .ok_or_else(|| ValidationError::MissingAnswer {
                question: question.id.clone(),
            })?;
        let expected = question.value_count();
        match (&question.kind, answer) {
            (QuestionKind::Select { min, max, .. }, Answer::Select(flags)) => {
                if flags.len() != expected {
                    return Err(ValidationError::WrongValueCount {
                        question: question.id.clone(),
                        expected,
                        got: flags.len(),
                    });
                }
                let selected = flags.iter().filter(|&&flag| flag).count();
                if selected < *min || selected > *max {
                    return Err(ValidationError::SelectionCount {
                        question: question.id.clone(),
                        min: *min,
                        max: *max,
                        got: selected,
                    });
                }
            }
            (QuestionKind::Rank { .. }, Answer::Rank(positions)) => {
                if positions.len() != expected {
                    return Err(ValidationError::WrongValueCount {
                        question: question.id.clone(),
                        expected,
                        got: positions.len(),
                    });
                }
                let mut seen = vec![false; expected];
                for &position in positions {
                    match seen.get_mut(position as usize) {
                        Some(slot) if !*slot => *slot = true,
                        _ => {
                            return Err(ValidationError::NotAPermutation {
                                question: question.id.clone(),
                            })
                        }
                    }
                }
            }
            (
                QuestionKind::Text {
                    max_length,
                    pattern,
                    ..
                },
                Answer::Text(texts),
            ) => {
                if texts.len() != expected {
                    return Err(ValidationError::WrongValueCount {
                        question: question.id.clone(),
                        expected,
                        got: texts.len(),
                    });
                }
                let regex = pattern
                    .as_deref()
                    .map(Regex::new)
                    .transpose()
                    .map_err(|e| ValidationError::BadPattern {
                        question: question.id.clone(),
                        message: e.to_string(),
                    })?;
                for text in texts {
                    if text.chars().count() > *max_length {
                        return Err(ValidationError::TextTooLong {
                            question: question.id.clone(),
                            max: *max_length,
                        });
                    }
                    if let Some(ref regex) = regex {
                        if !regex.is_match(text) {
                            return Err(ValidationError::PatternMismatch {
                                question: question.id.clone(),
                            });
                        }
                    }
                }
            }
            _ => {
                return Err(ValidationError::WrongAnswerType {
                    question: question.id.clone(),
                })
            }
        }
    }

    Ok(())
}
