//! HTTP surface consumed by the coordination core: the election service
//! plus the DKG actor endpoint on each roster node's proxy.

use async_trait::async_trait;
use reqwest::Response;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::ballot::{EncryptedBallot, VoteReceipt};
use crate::model::election::{Election, NodeKeygenState};

mod dkg;
mod election;

pub use dkg::DkgAction;

/// The network calls the lifecycle machinery depends on. Implemented over
/// HTTP by [`HttpTransport`]; tests substitute an in-process fake.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the authoritative election record.
    async fn fetch_election(&self, election_id: &str) -> Result<Election>;
    /// Submit a lifecycle action to the election service.
    async fn election_action(&self, election_id: &str, action: &str) -> Result<()>;
    /// Ask the shuffle service to mix the cast ballots.
    async fn shuffle(&self, election_id: &str) -> Result<()>;
    /// Submit an encrypted ballot on behalf of a voter.
    async fn cast_vote(
        &self,
        election_id: &str,
        ballot: &EncryptedBallot,
        user_id: &str,
    ) -> Result<VoteReceipt>;
    /// Create the DKG actor for this election on one node.
    async fn init_dkg_actor(&self, proxy: &str, election_id: &str) -> Result<()>;
    /// Read one node's DKG actor state. HTTP 404 means the actor does not
    /// exist yet and maps to [`NodeKeygenState::NotInitialized`].
    async fn dkg_actor_state(&self, proxy: &str, election_id: &str) -> Result<NodeKeygenState>;
    /// Drive one node's DKG actor (key setup or public-share computation).
    async fn dkg_actor_action(
        &self,
        proxy: &str,
        election_id: &str,
        action: DkgAction<'_>,
    ) -> Result<()>;
}

/// The production transport, speaking JSON over HTTP.
pub struct HttpTransport {
    http: reqwest::Client,
    service: String,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()?;
        Ok(Self {
            http,
            service: config.service_url().trim_end_matches('/').to_string(),
        })
    }

    fn service_url(&self, path: &str) -> String {
        format!("{}{path}", self.service)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch_election(&self, election_id: &str) -> Result<Election> {
        self.get_election(election_id).await
    }

    async fn election_action(&self, election_id: &str, action: &str) -> Result<()> {
        self.put_election_action(election_id, action).await
    }

    async fn shuffle(&self, election_id: &str) -> Result<()> {
        self.put_shuffle(election_id).await
    }

    async fn cast_vote(
        &self,
        election_id: &str,
        ballot: &EncryptedBallot,
        user_id: &str,
    ) -> Result<VoteReceipt> {
        self.post_vote(election_id, ballot, user_id).await
    }

    async fn init_dkg_actor(&self, proxy: &str, election_id: &str) -> Result<()> {
        self.put_dkg_init(proxy, election_id).await
    }

    async fn dkg_actor_state(&self, proxy: &str, election_id: &str) -> Result<NodeKeygenState> {
        self.get_dkg_state(proxy, election_id).await
    }

    async fn dkg_actor_action(
        &self,
        proxy: &str,
        election_id: &str,
        action: DkgAction<'_>,
    ) -> Result<()> {
        self.put_dkg_action(proxy, election_id, action).await
    }
}

/// Map a response onto the §6 contract: 2xx passes through, anything else
/// is a rejection carrying the body as its message. 404 handling for actor
/// statuses happens at the call site, where it is not an error.
pub(crate) async fn expect_ok(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let message = response.text().await.unwrap_or_default();
        Err(Error::Rejected { status, message })
    }
}
