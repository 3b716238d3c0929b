//! Bounded, cancellable confirmation polling.
//!
//! After a state-changing action, the authoritative status is probed at a
//! fixed interval with a hard cap on attempts. The loop carries a
//! cooperative cancellation token; cancelling an in-flight poll is a normal
//! outcome, not an error.

use std::future::Future;

use log::warn;
use tokio::sync::watch;
use tokio::time::{sleep, Duration};

use crate::error::{Error, Result};

/// Create a linked cancellation pair. The handle side cancels; the token
/// side is handed to poll loops (and can be cloned freely).
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (sender, receiver) = watch::channel(false);
    (CancelHandle { sender }, CancelToken { receiver })
}

/// The cancelling side, held by whoever supersedes or abandons the action.
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancel all linked tokens. Idempotent.
    pub fn cancel(&self) {
        let _ = self.sender.send(true);
    }
}

/// The observing side, polled cooperatively inside poll loops.
#[derive(Debug, Clone)]
pub struct CancelToken {
    receiver: watch::Receiver<bool>,
}

impl CancelToken {
    /// A token that can never be cancelled, for fire-and-forget callers.
    pub fn never() -> Self {
        cancel_pair().1
    }

    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolve once cancellation is requested. If the handle is dropped
    /// without cancelling, this pends forever.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        loop {
            if *receiver.borrow() {
                return;
            }
            if receiver.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// How a poll loop ended, short of an error.
#[derive(Debug, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The probe reported the awaited state.
    Confirmed(T),
    /// The token was cancelled while waiting.
    Cancelled,
}

/// A bounded retry loop against an asynchronous probe.
#[derive(Debug, Clone, Copy)]
pub struct StatusPoll {
    interval: Duration,
    max_attempts: u32,
}

impl StatusPoll {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Probe until it yields a value, the attempt budget runs out
    /// ([`Error::Timeout`]), the token is cancelled, or the probe fails
    /// with a non-transient error. Transient failures consume an attempt
    /// and are retried like any unconfirmed probe.
    pub async fn run<T, F, Fut>(&self, mut probe: F, cancel: &CancelToken) -> Result<PollOutcome<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>>>,
    {
        for attempt in 1..=self.max_attempts {
            let probed = tokio::select! {
                _ = cancel.cancelled() => return Ok(PollOutcome::Cancelled),
                probed = probe() => probed,
            };
            match probed {
                Ok(Some(value)) => return Ok(PollOutcome::Confirmed(value)),
                Ok(None) => {}
                Err(error) if error.is_transient() => {
                    warn!("confirmation attempt {attempt}/{} failed: {error}", self.max_attempts);
                }
                Err(error) => return Err(error),
            }
            if attempt < self.max_attempts {
                tokio::select! {
                    _ = cancel.cancelled() => return Ok(PollOutcome::Cancelled),
                    _ = sleep(self.interval) => {}
                }
            }
        }
        Err(Error::Timeout {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_poll(max_attempts: u32) -> StatusPoll {
        StatusPoll::new(Duration::from_millis(1), max_attempts)
    }

    #[tokio::test]
    async fn confirms_once_the_probe_succeeds() {
        let attempts = AtomicU32::new(0);
        let outcome = fast_poll(5)
            .run(
                || {
                    let n = attempts.fetch_add(1, Ordering::SeqCst);
                    async move { Ok((n >= 2).then_some(n)) }
                },
                &CancelToken::never(),
            )
            .await
            .unwrap();
        assert_eq!(outcome, PollOutcome::Confirmed(2));
    }

    #[tokio::test]
    async fn exhausting_the_budget_times_out() {
        let result = fast_poll(3)
            .run(|| async { Ok(None::<()>) }, &CancelToken::never())
            .await;
        assert!(matches!(result, Err(Error::Timeout { attempts: 3 })));
    }

    #[tokio::test]
    async fn cancellation_is_not_an_error() {
        let (handle, token) = cancel_pair();
        handle.cancel();
        let outcome = fast_poll(1000)
            .run(|| async { Ok(None::<()>) }, &token)
            .await
            .unwrap();
        assert_eq!(outcome, PollOutcome::Cancelled);
    }

    #[tokio::test]
    async fn fatal_probe_errors_stop_the_loop() {
        let result = fast_poll(10)
            .run(
                || async {
                    Err::<Option<()>, _>(Error::Unauthorized("not an operator".to_string()))
                },
                &CancelToken::never(),
            )
            .await;
        assert!(matches!(result, Err(Error::Unauthorized(_))));
    }
}
