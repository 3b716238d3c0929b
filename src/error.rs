use reqwest::StatusCode;
use thiserror::Error;

use crate::lifecycle::Action;
use crate::model::election::{ElectionStatus, NodeId, QuestionId};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Invalid transition: cannot {action} while the election is {status}")]
    InvalidTransition {
        status: ElectionStatus,
        action: Action,
    },
    #[error("Cannot vote while the election is {status}")]
    VotingClosed { status: ElectionStatus },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Node {node} reported failed key generation: {message}")]
    NodeFailed { node: NodeId, message: String },
    #[error("Request rejected with {status}: {message}")]
    Rejected { status: StatusCode, message: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("Confirmation timed out after {attempts} attempts")]
    Timeout { attempts: u32 },
    #[error("Malformed curve point encoding")]
    MalformedPoint,
    #[error("Chunk of {0} bytes exceeds the embeddable maximum")]
    ChunkTooLarge(usize),
}

impl Error {
    /// Is this failure worth another attempt within the polling budget?
    /// Transport-level errors and 5xx responses are; everything else is fatal.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Rejected { status, .. } => status.is_server_error(),
            _ => false,
        }
    }
}

/// Rejections raised while checking an answer set against the election
/// configuration, before any network call is made.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Question {question} expects {expected} values but got {got}")]
    WrongValueCount {
        question: QuestionId,
        expected: usize,
        got: usize,
    },
    #[error("Question {question} requires between {min} and {max} selections, got {got}")]
    SelectionCount {
        question: QuestionId,
        min: usize,
        max: usize,
        got: usize,
    },
    #[error("Ranking for question {question} is not a permutation of its choices")]
    NotAPermutation { question: QuestionId },
    #[error("Answer to question {question} exceeds the maximum length of {max}")]
    TextTooLong { question: QuestionId, max: usize },
    #[error("Answer to question {question} does not match the required pattern")]
    PatternMismatch { question: QuestionId },
    #[error("Invalid pattern on question {question}: {message}")]
    BadPattern {
        question: QuestionId,
        message: String,
    },
    #[error("Answer type does not match question {question}")]
    WrongAnswerType { question: QuestionId },
    #[error("No answer given for question {question}")]
    MissingAnswer { question: QuestionId },
    #[error("Answer given for unknown question {question}")]
    UnknownQuestion { question: QuestionId },
    #[error("Malformed ballot plaintext: {0}")]
    MalformedBallot(String),
}
