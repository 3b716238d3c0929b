mod answers;
mod question;
mod record;
mod status;

pub use answers::{validate_answers, Answer, AnswerSet};
pub use question::{ConfigNode, Configuration, Question, QuestionKind, Subject};
pub use record::{Election, RosterNode};
pub use status::{DkgState, ElectionStatus, NodeKeygenState};

/// Our election IDs are opaque strings assigned by the election service.
pub type ElectionId = String;
/// Our question IDs are stable strings from the election configuration.
pub type QuestionId = String;
/// Our voter/operator IDs are strings supplied by the authentication collaborator.
pub type UserId = String;
/// Our node IDs are the roster member identifiers.
pub type NodeId = String;
