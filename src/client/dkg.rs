//! DKG actor endpoints on a roster node's proxy.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::election::{DkgState, NodeKeygenState};

use super::{expect_ok, HttpTransport};

/// Actions accepted by a node's DKG actor endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DkgAction<'a> {
    /// Run distributed key generation, coordinated through the given proxy.
    Setup { proxy: &'a str },
    /// Compute and submit this node's public decryption shares.
    Decrypt,
}

#[derive(Serialize)]
struct InitRequest<'a> {
    #[serde(rename = "ElectionID")]
    election_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ActorRequest<'a> {
    action: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    proxy: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ActorStatus {
    status: DkgState,
    #[serde(default)]
    error: Option<String>,
}

impl HttpTransport {
    fn actors_url(proxy: &str, path: &str) -> String {
        format!("{}/evoting/dkg/actors{path}", proxy.trim_end_matches('/'))
    }

    pub(super) async fn put_dkg_init(&self, proxy: &str, election_id: &str) -> Result<()> {
        let response = self
            .http
            .put(Self::actors_url(proxy, ""))
            .json(&InitRequest { election_id })
            .send()
            .await?;
        expect_ok(response).await?;
        Ok(())
    }

    pub(super) async fn get_dkg_state(
        &self,
        proxy: &str,
        election_id: &str,
    ) -> Result<NodeKeygenState> {
        let response = self
            .http
            .get(Self::actors_url(proxy, &format!("/{election_id}")))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(NodeKeygenState::NotInitialized);
        }
        let body: ActorStatus = expect_ok(response).await?.json().await?;
        Ok(match body.status {
            DkgState::Initialized => NodeKeygenState::Initialized,
            DkgState::Setup => NodeKeygenState::Setup,
            DkgState::Failed => NodeKeygenState::Failed(body.error.unwrap_or_default()),
        })
    }

    pub(super) async fn put_dkg_action(
        &self,
        proxy: &str,
        election_id: &str,
        action: DkgAction<'_>,
    ) -> Result<()> {
        let request = match action {
            DkgAction::Setup { proxy } => ActorRequest {
                action: "setup",
                proxy: Some(proxy),
            },
            DkgAction::Decrypt => ActorRequest {
                action: "decrypt",
                proxy: None,
            },
        };
        let response = self
            .http
            .put(Self::actors_url(proxy, &format!("/{election_id}")))
            .json(&request)
            .send()
            .await?;
        expect_ok(response).await?;
        Ok(())
    }
}
