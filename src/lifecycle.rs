//! The election lifecycle state machine.
//!
//! An operator action enters through [`Coordinator::apply`], which checks
//! the table-driven policy and transition rules, optimistically sets the
//! transient status, issues the single externally-owned state-changing
//! call, and then polls the authoritative source until the target status is
//! confirmed. A failed or timed-out confirmation rolls the local status
//! back to its pre-action value; there is no automatic retry of the action
//! itself.

use std::fmt::{self, Display, Formatter};

use log::{debug, info, warn};

use crate::aggregator;
use crate::cipher;
use crate::client::{DkgAction, Transport};
use crate::codec;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::actor::{Actor, Role};
use crate::model::ballot::{EncryptedBallot, VoteReceipt};
use crate::model::election::{AnswerSet, Election, ElectionStatus, NodeId};
use crate::poll::{CancelToken, PollOutcome, StatusPoll};

/// Operator actions on the election lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Create a DKG actor on every roster node.
    Initialize,
    /// Run key generation, coordinated by the chosen roster node.
    Setup { coordinator: NodeId },
    Open,
    Close,
    Cancel,
    /// Mix the cast ballots.
    Shuffle,
    /// Have the chosen node compute and submit public decryption shares.
    Decrypt { coordinator: NodeId },
    /// Combine the submitted shares into the final result.
    Combine,
}

impl Display for Action {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                Self::Initialize => "initialize",
                Self::Setup { .. } => "setup",
                Self::Open => "open",
                Self::Close => "close",
                Self::Cancel => "cancel",
                Self::Shuffle => "shuffle",
                Self::Decrypt { .. } => "decrypt",
                Self::Combine => "combine",
            }
        )
    }
}

/// One row of the transition table: the single status an action is enabled
/// in, the transient status shown while awaiting confirmation, and the
/// stable status committed once confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: ElectionStatus,
    pub transient: Option<ElectionStatus>,
    pub to: ElectionStatus,
}

impl Action {
    /// The transition row for this action.
    pub fn transition(&self) -> Transition {
        use ElectionStatus::*;
        let (from, transient, to) = match self {
            Self::Initialize => (Initial, None, Initialized),
            Self::Setup { .. } => (Initialized, Some(OnGoingSetup), Setup),
            Self::Open => (Setup, None, Open),
            Self::Close => (Open, None, Closed),
            Self::Cancel => (Open, None, Canceled),
            Self::Shuffle => (Closed, Some(OnGoingShuffle), ShuffledBallots),
            Self::Decrypt { .. } => (ShuffledBallots, Some(OnGoingDecryption), PubSharesSubmitted),
            Self::Combine => (PubSharesSubmitted, None, ResultAvailable),
        };
        Transition {
            from,
            transient,
            to,
        }
    }
}

/// The one policy question: may this role drive this action while the
/// election is in this status?
pub fn allowed(role: Role, status: ElectionStatus, action: &Action) -> bool {
    role_allows(role, action) && action.transition().from == status
}

fn role_allows(role: Role, action: &Action) -> bool {
    match (role, action) {
        (Role::Admin | Role::Operator, _) => true,
        (Role::Voter, _) => false,
    }
}

/// Drives lifecycle actions and vote submission against a transport.
pub struct Coordinator<T> {
    transport: T,
    poll: StatusPoll,
}

impl<T: Transport> Coordinator<T> {
    pub fn new(transport: T, config: &Config) -> Self {
        Self::with_poll(
            transport,
            StatusPoll::new(config.poll_interval(), config.poll_max_attempts()),
        )
    }

    /// Construct with an explicit polling cadence.
    pub fn with_poll(transport: T, poll: StatusPoll) -> Self {
        Self { transport, poll }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Validate and execute a lifecycle action.
    ///
    /// On confirmation the election's status is committed to the action's
    /// target. On any failure after submission the status reverts to its
    /// pre-action value and the error surfaces. Cancellation through the
    /// token also reverts, but resolves to [`PollOutcome::Cancelled`]
    /// rather than an error.
    pub async fn apply(
        &self,
        election: &mut Election,
        action: Action,
        actor: &Actor,
        cancel: &CancelToken,
    ) -> Result<PollOutcome<()>> {
        if !role_allows(actor.role, &action) {
            return Err(Error::Unauthorized(format!(
                "{} {} may not {action} elections",
                actor.role, actor.id
            )));
        }
        let transition = action.transition();
        if election.status != transition.from {
            return Err(Error::InvalidTransition {
                status: election.status,
                action,
            });
        }

        let prior = election.status;
        if let Some(transient) = transition.transient {
            election.status = transient;
        }
        info!("election {}: applying {action}", election.id);

        let confirmed = match self.execute(election, &action).await {
            Ok(()) => self.confirm(election, &action, transition.to, cancel).await,
            Err(error) => Err(error),
        };

        match confirmed {
            Ok(PollOutcome::Confirmed(())) => {
                election.status = transition.to;
                info!("election {}: now {}", election.id, election.status);
                Ok(PollOutcome::Confirmed(()))
            }
            Ok(PollOutcome::Cancelled) => {
                election.status = prior;
                debug!("election {}: {action} cancelled, reverting to {prior}", election.id);
                Ok(PollOutcome::Cancelled)
            }
            Err(error) => {
                election.status = prior;
                warn!(
                    "election {}: {action} failed ({error}), rolling back to {prior}",
                    election.id
                );
                Err(error)
            }
        }
    }

    /// The single externally-owned call behind each action.
    async fn execute(&self, election: &Election, action: &Action) -> Result<()> {
        match action {
            Action::Initialize => aggregator::initialize_roster(&self.transport, election).await,
            Action::Setup { coordinator } => {
                let node = election.roster_node(coordinator).ok_or_else(|| {
                    Error::InvalidConfiguration(format!("node {coordinator} is not on the roster"))
                })?;
                self.transport
                    .dkg_actor_action(
                        &node.proxy,
                        &election.id,
                        DkgAction::Setup { proxy: &node.proxy },
                    )
                    .await
            }
            Action::Open => self.transport.election_action(&election.id, "open").await,
            Action::Close => self.transport.election_action(&election.id, "close").await,
            Action::Cancel => self.transport.election_action(&election.id, "cancel").await,
            Action::Shuffle => self.transport.shuffle(&election.id).await,
            Action::Decrypt { coordinator } => {
                let node = election.roster_node(coordinator).ok_or_else(|| {
                    Error::InvalidConfiguration(format!("node {coordinator} is not on the roster"))
                })?;
                self.transport
                    .dkg_actor_action(&node.proxy, &election.id, DkgAction::Decrypt)
                    .await
            }
            Action::Combine => {
                self.transport
                    .election_action(&election.id, "combineShares")
                    .await
            }
        }
    }

    /// Poll the authoritative source until it reports the target status.
    /// Initialization and setup confirm through the node roster; everything
    /// else through the election record.
    async fn confirm(
        &self,
        election: &Election,
        action: &Action,
        target: ElectionStatus,
        cancel: &CancelToken,
    ) -> Result<PollOutcome<()>> {
        let transport = &self.transport;
        match action {
            Action::Initialize | Action::Setup { .. } => {
                self.poll
                    .run(
                        || async move {
                            let derived = aggregator::derived_status(transport, election).await?;
                            Ok((derived == target).then_some(()))
                        },
                        cancel,
                    )
                    .await
            }
            _ => {
                self.poll
                    .run(
                        || async move {
                            let fetched = transport.fetch_election(&election.id).await?;
                            Ok((fetched.status == target).then_some(()))
                        },
                        cancel,
                    )
                    .await
            }
        }
    }

    /// Encrypt and submit a ballot for a registered voter. Validation
    /// failures resolve locally; nothing is sent unless the answer set is
    /// well-formed.
    pub async fn cast_vote(
        &self,
        election: &Election,
        answers: &AnswerSet,
        voter: &Actor,
    ) -> Result<VoteReceipt> {
        if election.status != ElectionStatus::Open {
            return Err(Error::VotingClosed {
                status: election.status,
            });
        }
        if !election.voters.contains(&voter.id) {
            return Err(Error::Unauthorized(format!(
                "{} is not a registered voter of election {}",
                voter.id, election.id
            )));
        }
        let key = election.require_public_key()?;
        let chunks = codec::encode(election, answers)?;

        let mut rng = rand::thread_rng();
        let ballot = EncryptedBallot(
            chunks
                .iter()
                .map(|chunk| cipher::encrypt_chunk(chunk, key, &mut rng))
                .collect::<Result<_>>()?,
        );

        debug!(
            "election {}: submitting ballot of {} chunks for {}",
            election.id,
            ballot.0.len(),
            voter.id
        );
        self.transport
            .cast_vote(&election.id, &ballot, &voter.id)
            .await
    }
}
