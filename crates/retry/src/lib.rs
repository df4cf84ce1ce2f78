//! Generic retry-with-backoff for persistence calls.
//!
//! This crate knows nothing about records or forms. It runs an async operation under a
//! [`RetryPolicy`], retrying only failures that classify as [`FailureClass::Transient`]:
//! - transport faults (connection refused, reset, DNS failure),
//! - HTTP `5xx` responses,
//! - HTTP `429 Too Many Requests`.
//!
//! Every other failure is permanent and surfaces after the attempt that produced it.
//! The whole retried sequence is one async unit; callers that need a deadline wrap it in
//! `tokio::time::timeout` themselves.

mod policy;

pub use policy::{
    RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY, DEFAULT_MULTIPLIER,
};

use std::fmt;
use std::future::Future;

/// Errors raised when building a [`RetryPolicy`].
#[derive(Debug, thiserror::Error)]
pub enum RetryConfigError {
    #[error("invalid retry configuration: {0}")]
    InvalidInput(String),
}

/// Whether a failure is worth retrying.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureClass {
    Transient,
    Permanent,
}

/// Classifies an HTTP status code: `429` and `5xx` are transient.
pub fn classify_status(status: u16) -> FailureClass {
    match status {
        429 | 500..=599 => FailureClass::Transient,
        _ => FailureClass::Permanent,
    }
}

/// Failures that can say whether they are transient.
pub trait Classify {
    fn failure_class(&self) -> FailureClass;

    fn is_transient(&self) -> bool {
        self.failure_class() == FailureClass::Transient
    }
}

/// A successful result and the number of attempts it took.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryOutcome<T> {
    pub value: T,
    pub attempts: u32,
}

/// The final failure of a retried operation.
#[derive(Debug, thiserror::Error)]
#[error("{error} (gave up after {attempts} attempt(s))")]
pub struct RetryError<E> {
    /// The error from the last attempt.
    pub error: E,
    pub attempts: u32,
}

impl<E> RetryError<E> {
    pub fn into_inner(self) -> E {
        self.error
    }
}

/// Runs `operation` under `policy`.
///
/// The operation receives the 1-based attempt number. Transient failures are retried after
/// [`RetryPolicy::delay_for`] until `max_attempts` is reached; permanent failures are
/// returned immediately.
///
/// # Errors
///
/// Returns [`RetryError`] carrying the last failure and the number of attempts made.
pub async fn retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<RetryOutcome<T>, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + fmt::Display,
{
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                return Ok(RetryOutcome {
                    value,
                    attempts: attempt,
                })
            }
            Err(error) => {
                if !error.is_transient() {
                    tracing::debug!(attempt, %error, "permanent failure, not retrying");
                    return Err(RetryError {
                        error,
                        attempts: attempt,
                    });
                }

                if attempt >= policy.max_attempts() {
                    tracing::warn!(attempt, %error, "transient failure, retries exhausted");
                    return Err(RetryError {
                        error,
                        attempts: attempt,
                    });
                }

                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts(),
                    delay_ms = delay.as_millis() as u64,
                    %error,
                    "transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
