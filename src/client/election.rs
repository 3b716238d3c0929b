//! Election service and shuffle service endpoints.

use serde::Serialize;

use crate::error::Result;
use crate::model::ballot::{EncryptedBallot, VoteReceipt};
use crate::model::election::Election;

use super::{expect_ok, HttpTransport};

#[derive(Serialize)]
struct ElectionActionRequest<'a> {
    #[serde(rename = "Action")]
    action: &'a str,
}

#[derive(Serialize)]
struct VoteRequest<'a> {
    #[serde(rename = "Ballot")]
    ballot: &'a EncryptedBallot,
    #[serde(rename = "UserID")]
    user_id: &'a str,
}

impl HttpTransport {
    pub(super) async fn get_election(&self, election_id: &str) -> Result<Election> {
        let response = self
            .http
            .get(self.service_url(&format!("/evoting/elections/{election_id}")))
            .send()
            .await?;
        Ok(expect_ok(response).await?.json().await?)
    }

    pub(super) async fn put_election_action(&self, election_id: &str, action: &str) -> Result<()> {
        let response = self
            .http
            .put(self.service_url(&format!("/evoting/elections/{election_id}")))
            .json(&ElectionActionRequest { action })
            .send()
            .await?;
        expect_ok(response).await?;
        Ok(())
    }

    pub(super) async fn put_shuffle(&self, election_id: &str) -> Result<()> {
        let response = self
            .http
            .put(self.service_url(&format!("/evoting/services/shuffle/{election_id}")))
            .send()
            .await?;
        expect_ok(response).await?;
        Ok(())
    }

    pub(super) async fn post_vote(
        &self,
        election_id: &str,
        ballot: &EncryptedBallot,
        user_id: &str,
    ) -> Result<VoteReceipt> {
        let response = self
            .http
            .post(self.service_url(&format!("/evoting/elections/{election_id}/vote")))
            .json(&VoteRequest { ballot, user_id })
            .send()
            .await?;
        Ok(expect_ok(response).await?.json().await?)
    }
}
