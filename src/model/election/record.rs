use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::cipher::{PublicKey, MAX_CHUNK_BYTES};
use crate::error::{Error, Result};
use crate::model::election::{
    AnswerSet, Configuration, ElectionId, ElectionStatus, NodeId, Question, UserId,
};

/// The full election record, as served by the election service. Owned by
/// that service; this client mutates its status only through validated
/// lifecycle transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Election {
    #[serde(rename = "ElectionID")]
    pub id: ElectionId,
    pub status: ElectionStatus,
    /// The nodes running the cryptographic pipeline, in roster order.
    pub roster: Vec<RosterNode>,
    /// The threshold public key produced by distributed key generation.
    /// Absent until setup has completed.
    #[serde(default)]
    pub public_key: Option<PublicKey>,
    /// Size in bytes of the padded ballot plaintext.
    pub ballot_size: usize,
    /// Number of independently encrypted chunks per ballot.
    pub chunks_per_ballot: usize,
    /// Identities allowed to cast a vote.
    pub voters: HashSet<UserId>,
    /// The question tree.
    pub configuration: Configuration,
    /// Decrypted per-ballot results, once available.
    #[serde(default)]
    pub results: Vec<AnswerSet>,
}

/// One member of the election's node roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RosterNode {
    /// Node identifier.
    pub id: NodeId,
    /// The network address through which the node is reached.
    pub proxy: String,
}

impl Election {
    /// Size in bytes of each ballot chunk. The ballot size must split
    /// evenly into chunks small enough to embed; anything else is a
    /// configuration error, not a runtime one.
    pub fn chunk_size(&self) -> Result<usize> {
        if self.chunks_per_ballot == 0 || self.ballot_size % self.chunks_per_ballot != 0 {
            return Err(Error::InvalidConfiguration(format!(
                "ballot size {} does not split into {} equal chunks",
                self.ballot_size, self.chunks_per_ballot
            )));
        }
        let chunk_size = self.ballot_size / self.chunks_per_ballot;
        if chunk_size > MAX_CHUNK_BYTES {
            return Err(Error::InvalidConfiguration(format!(
                "chunk size {chunk_size} exceeds the embeddable maximum of {MAX_CHUNK_BYTES}"
            )));
        }
        Ok(chunk_size)
    }

    /// Look up a roster node by ID.
    pub fn roster_node(&self, id: &str) -> Option<&RosterNode> {
        self.roster.iter().find(|node| node.id == id)
    }

    /// All leaf questions in canonical order.
    pub fn questions(&self) -> Vec<&Question> {
        self.configuration.questions()
    }

    /// The threshold public key, which must exist before any ballot can be
    /// encrypted.
    pub fn require_public_key(&self) -> Result<&PublicKey> {
        self.public_key.as_ref().ok_or_else(|| {
            Error::InvalidConfiguration("election has no threshold public key yet".to_string())
        })
    }
}


/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;
    use crate::model::election::{ConfigNode, QuestionKind};

    impl Election {
        pub fn example() -> Self {
            Self {
                id: "deadbeef01".to_string(),
                status: ElectionStatus::Initial,
                roster: vec![
                    RosterNode {
                        id: "node-0".to_string(),
                        proxy: "http://node0.example.com:2001".to_string(),
                    },
                    RosterNode {
                        id: "node-1".to_string(),
                        proxy: "http://node1.example.com:2001".to_string(),
                    },
                    RosterNode {
                        id: "node-2".to_string(),
                        proxy: "http://node2.example.com:2001".to_string(),
                    },
                ],
                public_key: None,
                ballot_size: 87,
                chunks_per_ballot: 3,
                voters: HashSet::from(["alice".to_string(), "bob".to_string()]),
                configuration: Configuration {
                    title: "Annual vote".to_string(),
                    children: vec![
                        ConfigNode::Question(Question {
                            id: "q1".to_string(),
                            title: "Board members".to_string(),
                            kind: QuestionKind::Select {
                                choices: vec!["Ann".to_string(), "Ben".to_string()],
                                min: 1,
                                max: 1,
                            },
                        }),
                        ConfigNode::Question(Question {
                            id: "q2".to_string(),
                            title: "Venue preference".to_string(),
                            kind: QuestionKind::Rank {
                                choices: vec!["North".to_string(), "South".to_string()],
                            },
                        }),
                    ],
                },
                results: Vec::new(),
            }
        }
    }
}
