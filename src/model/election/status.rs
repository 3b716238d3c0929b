use std::fmt::{self, Display, Formatter};

use serde_repr::{Deserialize_repr, Serialize_repr};

/// States in the election lifecycle.
///
/// Values below 10 are authoritative at the election service and travel on
/// the wire; the others are derived or transient and exist only client-side
/// while we wait for the node roster to confirm an action.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u16)]
pub enum ElectionStatus {
    Initial = 0,
    Open = 1,
    Closed = 2,
    ShuffledBallots = 3,
    PubSharesSubmitted = 4,
    ResultAvailable = 5,
    Canceled = 6,
    /// Every roster node holds an initialized DKG actor.
    Initialized = 10,
    /// Key generation has completed across the roster.
    Setup = 11,
    OnGoingSetup = 12,
    OnGoingShuffle = 13,
    OnGoingDecryption = 14,
}

impl ElectionStatus {
    /// Transient statuses are set optimistically while an action awaits
    /// confirmation and are rolled back on failure.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Self::OnGoingSetup | Self::OnGoingShuffle | Self::OnGoingDecryption
        )
    }
}

impl Display for ElectionStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                Self::Initial => "initial",
                Self::Open => "open",
                Self::Closed => "closed",
                Self::ShuffledBallots => "ballots shuffled",
                Self::PubSharesSubmitted => "public shares submitted",
                Self::ResultAvailable => "result available",
                Self::Canceled => "canceled",
                Self::Initialized => "initialized",
                Self::Setup => "setup",
                Self::OnGoingSetup => "setup in progress",
                Self::OnGoingShuffle => "shuffle in progress",
                Self::OnGoingDecryption => "decryption in progress",
            }
        )
    }
}

/// DKG actor states as reported in a node's status body.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u16)]
pub enum DkgState {
    Initialized = 0,
    Setup = 1,
    Failed = 2,
}

/// The key-generation state of one (election, node) pair, recomputed on
/// demand by polling and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKeygenState {
    /// The node has no DKG actor for this election yet (HTTP 404).
    NotInitialized,
    Initialized,
    Setup,
    Failed(String),
}

impl Display for NodeKeygenState {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(formatter, "not initialized"),
            Self::Initialized => write!(formatter, "initialized"),
            Self::Setup => write!(formatter, "setup"),
            Self::Failed(message) => write!(formatter, "failed: {message}"),
        }
    }
}
