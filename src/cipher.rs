//! Ballot chunk encryption over edwards25519.
//!
//! Each plaintext chunk is embedded as a group element `M`, then encrypted
//! ElGamal-style under the election's threshold public key: a fresh
//! ephemeral scalar `k` gives `K = k·G` and `C = k·P + M`. The node roster
//! collectively recovers `k·P` from its key shares and computes
//! `M = C − k·P`; this client only produces `(K, C)` and defines the wire
//! shapes.

use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::ballot::{serde_point, Ciphertext};

/// Maximum bytes embeddable into one point: one byte of the 32-byte
/// encoding holds the data length, and the tail must stay free for the
/// embedding trials.
pub const MAX_CHUNK_BYTES: usize = 29;

/// The election-wide threshold public key, as a compressed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey(#[serde(with = "serde_point")] pub [u8; 32]);

impl PublicKey {
    /// Decompress to a usable group element.
    pub fn point(&self) -> Result<EdwardsPoint> {
        CompressedEdwardsY(self.0)
            .decompress()
            .ok_or(Error::MalformedPoint)
    }
}

/// Encrypt one plaintext chunk under the election public key.
pub fn encrypt_chunk(
    chunk: &[u8],
    key: &PublicKey,
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<Ciphertext> {
    let message = embed(chunk, rng)?;
    let ephemeral = Scalar::random(rng);
    let k = EdwardsPoint::mul_base(&ephemeral);
    let c = ephemeral * key.point()? + message;
    Ok(Ciphertext {
        k: k.compress().to_bytes(),
        c: c.compress().to_bytes(),
    })
}

/// Embed a byte chunk as a curve point. The compressed encoding is
/// `[len, data..., random tail]`; trials redraw the tail until the bytes
/// decompress to a point whose re-compression is identical, which makes
/// un-embedding exact. Each trial succeeds with probability about one half.
pub fn embed(data: &[u8], rng: &mut (impl RngCore + CryptoRng)) -> Result<EdwardsPoint> {
    if data.len() > MAX_CHUNK_BYTES {
        return Err(Error::ChunkTooLarge(data.len()));
    }
    let mut buf = [0u8; 32];
    buf[0] = data.len() as u8;
    buf[1..=data.len()].copy_from_slice(data);
    loop {
        rng.fill_bytes(&mut buf[1 + data.len()..]);
        if let Some(point) = CompressedEdwardsY(buf).decompress() {
            if point.compress().to_bytes() == buf {
                return Ok(point);
            }
        }
    }
}

/// Recover the embedded bytes from a decrypted message point.
pub fn unembed(point: &EdwardsPoint) -> Result<Vec<u8>> {
    let bytes = point.compress().to_bytes();
    let len = bytes[0] as usize;
    if len > MAX_CHUNK_BYTES {
        return Err(Error::MalformedPoint);
    }
    Ok(bytes[1..=len].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Decrypt with the full secret scalar, standing in for the roster's
    /// combined key shares.
    fn decrypt_chunk(ciphertext: &Ciphertext, secret: &Scalar) -> Vec<u8> {
        let k = CompressedEdwardsY(ciphertext.k).decompress().unwrap();
        let c = CompressedEdwardsY(ciphertext.c).decompress().unwrap();
        let message = c - secret * k;
        unembed(&message).unwrap()
    }

    #[test]
    fn round_trips_every_chunk_size() {
        let mut rng = rand::thread_rng();
        let secret = Scalar::random(&mut rng);
        let key = PublicKey(EdwardsPoint::mul_base(&secret).compress().to_bytes());

        for size in 0..=MAX_CHUNK_BYTES {
            let chunk: Vec<u8> = (0..size).map(|i| i as u8).collect();
            let ciphertext = encrypt_chunk(&chunk, &key, &mut rng).unwrap();
            assert_eq!(decrypt_chunk(&ciphertext, &secret), chunk);
        }
    }

    #[test]
    fn embedding_is_exact() {
        let mut rng = rand::thread_rng();
        let chunk = b"select:q1:1,0";
        let point = embed(chunk, &mut rng).unwrap();
        assert_eq!(unembed(&point).unwrap(), chunk);
    }

    #[test]
    fn rejects_oversized_chunks() {
        let mut rng = rand::thread_rng();
        let chunk = [0u8; MAX_CHUNK_BYTES + 1];
        assert!(matches!(
            embed(&chunk, &mut rng),
            Err(Error::ChunkTooLarge(_))
        ));
    }

    #[test]
    fn fresh_ephemeral_keys_per_chunk() {
        let mut rng = rand::thread_rng();
        let secret = Scalar::random(&mut rng);
        let key = PublicKey(EdwardsPoint::mul_base(&secret).compress().to_bytes());
        let first = encrypt_chunk(b"same chunk", &key, &mut rng).unwrap();
        let second = encrypt_chunk(b"same chunk", &key, &mut rng).unwrap();
        assert_ne!(first.k, second.k);
        assert_ne!(first.c, second.c);
    }
}
