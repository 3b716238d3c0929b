use serde::{Deserialize, Serialize};

use crate::model::election::QuestionId;

/// The questions of an election, arranged as an ordered tree of subject
/// headings with leaf questions. The tree order is canonical: ballots are
/// encoded question-by-question in depth-first order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Configuration {
    /// Election title.
    pub title: String,
    /// Top-level subjects and questions.
    pub children: Vec<ConfigNode>,
}

impl Configuration {
    /// All leaf questions in canonical (depth-first) order.
    pub fn questions(&self) -> Vec<&Question> {
        let mut questions = Vec::new();
        for node in &self.children {
            node.collect(&mut questions);
        }
        questions
    }

    /// Look up a question by ID.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions().into_iter().find(|q| q.id == id)
    }
}

/// A node of the configuration tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigNode {
    Subject(Subject),
    Question(Question),
}

impl ConfigNode {
    fn collect<'c>(&'c self, questions: &mut Vec<&'c Question>) {
        match self {
            Self::Subject(subject) => {
                for child in &subject.children {
                    child.collect(questions);
                }
            }
            Self::Question(question) => questions.push(question),
        }
    }
}

/// A subject heading grouping nested subjects and questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Subject {
    pub id: QuestionId,
    pub title: String,
    pub children: Vec<ConfigNode>,
}

/// A single question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Question {
    /// Question unique ID, stable across the election's lifetime.
    pub id: QuestionId,
    /// Question text.
    pub title: String,
    /// What kind of answer the question takes.
    pub kind: QuestionKind,
}

/// The answer shape a question declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionKind {
    /// Pick between `min` and `max` of the listed choices.
    Select {
        choices: Vec<String>,
        min: usize,
        max: usize,
    },
    /// Order all listed choices.
    Rank { choices: Vec<String> },
    /// One free-text answer per listed field, each at most `max_length`
    /// characters and optionally matching `pattern`.
    Text {
        fields: Vec<String>,
        max_length: usize,
        pattern: Option<String>,
    },
}

impl Question {
    /// Number of values an answer to this question carries.
    pub fn value_count(&self) -> usize {
        match &self.kind {
            QuestionKind::Select { choices, .. } | QuestionKind::Rank { choices } => choices.len(),
            QuestionKind::Text { fields, .. } => fields.len(),
        }
    }

    /// The type tag used in the ballot plaintext encoding.
    pub fn tag(&self) -> &'static str {
        match &self.kind {
            QuestionKind::Select { .. } => "select",
            QuestionKind::Rank { .. } => "rank",
            QuestionKind::Text { .. } => "text",
        }
    }
}
