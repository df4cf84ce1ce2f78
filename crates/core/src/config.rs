//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the session and
//! store. Nothing in this crate reads process-wide environment variables during a call; the
//! `*_from_env_value` helpers take values the caller has already read, so tests never touch
//! the real environment.

use crate::constants::{
    DEFAULT_SAVE_TIMEOUT, DEFAULT_STORE_BASE_URL, RETRY_BASE_DELAY_MS_ENV, RETRY_MAX_ATTEMPTS_ENV,
    RETRY_MAX_DELAY_MS_ENV, RETRY_MULTIPLIER_ENV, SAVE_TIMEOUT_SECS_ENV, STORE_BASE_URL_ENV,
};
use crate::{CoreError, CoreResult};
use directory_retry::{
    RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY, DEFAULT_MULTIPLIER,
};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    store_base_url: Url,
    retry_policy: RetryPolicy,
    save_timeout: Duration,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidInput`] if the store URL is not `http`/`https` or the save
    /// timeout is zero.
    pub fn new(
        store_base_url: Url,
        retry_policy: RetryPolicy,
        save_timeout: Duration,
    ) -> CoreResult<Self> {
        if !matches!(store_base_url.scheme(), "http" | "https") {
            return Err(CoreError::InvalidInput(format!(
                "store base URL must use http or https, got '{}'",
                store_base_url.scheme()
            )));
        }

        if save_timeout.is_zero() {
            return Err(CoreError::InvalidInput(
                "save timeout must be greater than zero".into(),
            ));
        }

        Ok(Self {
            store_base_url,
            retry_policy,
            save_timeout,
        })
    }

    pub fn store_base_url(&self) -> &Url {
        &self.store_base_url
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Upper bound on one complete save, retries included.
    pub fn save_timeout(&self) -> Duration {
        self.save_timeout
    }

    /// Resolve the configuration from named settings, as read once at startup.
    ///
    /// `lookup` receives the `DIRECTORY_*` variable names from [`crate::constants`]; a
    /// process would pass `|name| std::env::var(name).ok()`. Missing values take their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] if any supplied value is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CoreResult<Self> {
        let store_base_url = store_base_url_from_env_value(lookup(STORE_BASE_URL_ENV))?;
        let retry_policy = retry_policy_from_env_values(
            lookup(RETRY_MAX_ATTEMPTS_ENV),
            lookup(RETRY_BASE_DELAY_MS_ENV),
            lookup(RETRY_MULTIPLIER_ENV),
            lookup(RETRY_MAX_DELAY_MS_ENV),
        )?;
        let save_timeout = save_timeout_from_env_value(lookup(SAVE_TIMEOUT_SECS_ENV))?;

        Self::new(store_base_url, retry_policy, save_timeout)
    }
}

/// Parse the store base URL from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_STORE_BASE_URL`].
pub fn store_base_url_from_env_value(value: Option<String>) -> CoreResult<Url> {
    let value = trimmed(value).unwrap_or_else(|| DEFAULT_STORE_BASE_URL.to_owned());
    Url::parse(&value)
        .map_err(|e| CoreError::InvalidInput(format!("invalid store base URL '{value}': {e}")))
}

/// Build a retry policy from optional string values.
///
/// Each missing or blank value falls back to its default. Delays are in milliseconds.
///
/// # Errors
///
/// Returns [`CoreError`] if a value does not parse or the resulting policy is invalid.
pub fn retry_policy_from_env_values(
    max_attempts: Option<String>,
    base_delay_ms: Option<String>,
    multiplier: Option<String>,
    max_delay_ms: Option<String>,
) -> CoreResult<RetryPolicy> {
    let max_attempts = parse_value::<u32>("max attempts", max_attempts)?
        .unwrap_or(DEFAULT_MAX_ATTEMPTS);
    let base_delay = parse_value::<u64>("base delay", base_delay_ms)?
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_BASE_DELAY);
    let multiplier = parse_value::<f64>("multiplier", multiplier)?.unwrap_or(DEFAULT_MULTIPLIER);
    let max_delay = parse_value::<u64>("max delay", max_delay_ms)?
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_MAX_DELAY);

    Ok(RetryPolicy::new(
        max_attempts,
        base_delay,
        multiplier,
        max_delay,
    )?)
}

/// Parse the save timeout, in whole seconds, from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_SAVE_TIMEOUT`].
pub fn save_timeout_from_env_value(value: Option<String>) -> CoreResult<Duration> {
    let timeout = parse_value::<u64>("save timeout", value)?
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_SAVE_TIMEOUT);

    if timeout.is_zero() {
        return Err(CoreError::InvalidInput(
            "save timeout must be greater than zero".into(),
        ));
    }

    Ok(timeout)
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_value<T>(what: &str, value: Option<String>) -> CoreResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    trimmed(value)
        .map(|v| {
            v.parse::<T>()
                .map_err(|e| CoreError::InvalidInput(format!("invalid {what} '{v}': {e}")))
        })
        .transpose()
}
