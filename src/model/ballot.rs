use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::election::{ElectionId, UserId};

/// One encrypted ballot chunk: the ephemeral public point `K` and the
/// blinded message point `C`, both as 32-byte compressed encodings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext {
    #[serde(rename = "K", with = "serde_point")]
    pub k: [u8; 32],
    #[serde(rename = "C", with = "serde_point")]
    pub c: [u8; 32],
}

/// A complete encrypted ballot: exactly `chunks_per_ballot` ciphertexts in
/// chunk order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedBallot(pub Vec<Ciphertext>);

/// The submission receipt returned by the election service after a vote is
/// accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VoteReceipt {
    #[serde(rename = "ElectionID")]
    pub election: ElectionId,
    #[serde(rename = "UserID")]
    pub user: UserId,
    pub timestamp: DateTime<Utc>,
}

/// Serialize a compressed curve point as lowercase hex.
pub(crate) mod serde_point {
    use data_encoding::HEXLOWER;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&HEXLOWER.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let hex = String::deserialize(deserializer)?;
        let decoded = HEXLOWER
            .decode(hex.as_bytes())
            .map_err(D::Error::custom)?;
        decoded
            .try_into()
            .map_err(|_| D::Error::custom("expected a 32-byte point encoding"))
    }
}
