//! Roster-wide key-generation status.
//!
//! Each roster node exposes the state of its DKG actor; polling happens in
//! parallel and the per-node states reduce into one election-wide derived
//! status.

use futures::future::join_all;
use log::warn;

use crate::client::Transport;
use crate::error::{Error, Result};
use crate::model::election::{Election, ElectionStatus, NodeId, NodeKeygenState};

/// Poll every roster node in parallel. One node's failure does not block
/// the others; each result is reported independently.
pub async fn roster_states<T: Transport>(
    transport: &T,
    election: &Election,
) -> Vec<(NodeId, Result<NodeKeygenState>)> {
    join_all(election.roster.iter().map(|node| async move {
        let state = transport.dkg_actor_state(&node.proxy, &election.id).await;
        (node.id.clone(), state)
    }))
    .await
}

/// Reduce per-node states into the election-wide derived status.
///
/// A failed node takes precedence over everything and surfaces as an
/// error. Otherwise any node in `Setup` derives `Setup`, a fully
/// initialized roster derives `Initialized`, and anything less keeps the
/// election at `Initial`.
pub fn aggregate(states: &[(NodeId, NodeKeygenState)]) -> Result<ElectionStatus> {
    for (node, state) in states {
        if let NodeKeygenState::Failed(message) = state {
            return Err(Error::NodeFailed {
                node: node.clone(),
                message: message.clone(),
            });
        }
    }
    if states
        .iter()
        .any(|(_, state)| *state == NodeKeygenState::Setup)
    {
        return Ok(ElectionStatus::Setup);
    }
    if !states.is_empty()
        && states
            .iter()
            .all(|(_, state)| *state == NodeKeygenState::Initialized)
    {
        return Ok(ElectionStatus::Initialized);
    }
    Ok(ElectionStatus::Initial)
}

/// Poll the whole roster and derive the election-wide status. Any node
/// that cannot be polled fails the derivation with its own error.
pub async fn derived_status<T: Transport>(
    transport: &T,
    election: &Election,
) -> Result<ElectionStatus> {
    let mut states = Vec::with_capacity(election.roster.len());
    for (node, state) in roster_states(transport, election).await {
        states.push((node, state?));
    }
    aggregate(&states)
}

/// Create the election's DKG actor on every roster node in parallel.
/// Individual failures are logged and tolerated as long as at least one
/// node accepted; the nodes left behind surface through the derived status
/// staying below `Initialized`.
pub async fn initialize_roster<T: Transport>(transport: &T, election: &Election) -> Result<()> {
    let results = join_all(election.roster.iter().map(|node| async move {
        let outcome = transport.init_dkg_actor(&node.proxy, &election.id).await;
        (node.id.clone(), outcome)
    }))
    .await;

    let mut first_error = None;
    let mut accepted = 0usize;
    for (node, outcome) in results {
        match outcome {
            Ok(()) => accepted += 1,
            Err(error) => {
                warn!("initializing DKG actor on node {node} failed: {error}");
                first_error.get_or_insert(error);
            }
        }
    }
    match (accepted, first_error) {
        (0, Some(error)) => Err(error),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(states: &[NodeKeygenState]) -> Vec<(NodeId, NodeKeygenState)> {
        states
            .iter()
            .enumerate()
            .map(|(i, state)| (format!("node-{i}"), state.clone()))
            .collect()
    }

    #[test]
    fn fully_initialized_roster_derives_initialized() {
        let states = named(&[
            NodeKeygenState::Initialized,
            NodeKeygenState::Initialized,
            NodeKeygenState::Initialized,
        ]);
        assert_eq!(aggregate(&states).unwrap(), ElectionStatus::Initialized);
    }

    #[test]
    fn any_setup_node_derives_setup() {
        let states = named(&[
            NodeKeygenState::Initialized,
            NodeKeygenState::Initialized,
            NodeKeygenState::Setup,
        ]);
        assert_eq!(aggregate(&states).unwrap(), ElectionStatus::Setup);
    }

    #[test]
    fn partially_initialized_roster_stays_initial() {
        let states = named(&[
            NodeKeygenState::Initialized,
            NodeKeygenState::NotInitialized,
        ]);
        assert_eq!(aggregate(&states).unwrap(), ElectionStatus::Initial);
    }

    #[test]
    fn failed_node_wins_over_setup() {
        let states = named(&[
            NodeKeygenState::Setup,
            NodeKeygenState::Failed("share verification failed".to_string()),
        ]);
        let error = aggregate(&states).unwrap_err();
        assert!(matches!(
            error,
            Error::NodeFailed { node, .. } if node == "node-1"
        ));
    }

    #[test]
    fn empty_roster_stays_initial() {
        assert_eq!(aggregate(&[]).unwrap(), ElectionStatus::Initial);
    }
}
