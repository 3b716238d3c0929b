//! Client-side coordination core for a threshold-encrypted voting system.
//!
//! Elections run on a roster of independent nodes that jointly generate a
//! threshold key, shuffle the encrypted ballots and decrypt the result.
//! This crate drives that pipeline from the operator's side: it validates
//! and executes lifecycle transitions against the authoritative election
//! service, polls the roster's key-generation actors, encodes and encrypts
//! ballots client-side, and tallies the decrypted results.
//!
//! Authentication, page rendering and the election service's own storage
//! are external collaborators; this crate consumes an authenticated
//! [`model::actor::Actor`] and the HTTP contracts in [`client`].

pub mod aggregator;
pub mod cipher;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod model;
pub mod poll;
pub mod tally;

pub use config::Config;
pub use error::{Error, Result};
pub use lifecycle::{Action, Coordinator};
