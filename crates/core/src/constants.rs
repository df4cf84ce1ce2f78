//! Constants used throughout the directory core crate.
//!
//! Defaults for configuration values and the fixed names used at the persistence boundary.

use std::time::Duration;

/// Default base URL of the record store when no explicit URL is configured.
pub const DEFAULT_STORE_BASE_URL: &str = "http://localhost:8080/fhir";

/// Default upper bound on one complete save, retries included.
pub const DEFAULT_SAVE_TIMEOUT: Duration = Duration::from_secs(60);

/// Media type of record bodies exchanged with the store.
pub const FHIR_JSON_MEDIA_TYPE: &str = "application/fhir+json";

/// Longest error-document excerpt kept in a store status error.
pub const MAX_ERROR_BODY_CHARS: usize = 200;

/// Environment variable naming the record store base URL.
pub const STORE_BASE_URL_ENV: &str = "DIRECTORY_STORE_BASE_URL";

/// Environment variable overriding the maximum number of save attempts.
pub const RETRY_MAX_ATTEMPTS_ENV: &str = "DIRECTORY_RETRY_MAX_ATTEMPTS";

/// Environment variable overriding the base retry delay, in milliseconds.
pub const RETRY_BASE_DELAY_MS_ENV: &str = "DIRECTORY_RETRY_BASE_DELAY_MS";

/// Environment variable overriding the retry delay multiplier.
pub const RETRY_MULTIPLIER_ENV: &str = "DIRECTORY_RETRY_MULTIPLIER";

/// Environment variable overriding the retry delay ceiling, in milliseconds.
pub const RETRY_MAX_DELAY_MS_ENV: &str = "DIRECTORY_RETRY_MAX_DELAY_MS";

/// Environment variable overriding the save timeout, in seconds.
pub const SAVE_TIMEOUT_SECS_ENV: &str = "DIRECTORY_SAVE_TIMEOUT_SECS";
