//! Environment lookup for [`Client::from_env`](crate::client::Client::from_env).
//!
//! Only the project id is configurable; parsing entries never touches the
//! environment.

/// Names the project whose logs are read, e.g. `my-project-1234`.
pub const LOGGING_PROJECT_ENV: &str = "GOOGLE_CLOUD_PROJECT";

/// Project id assumed when [`LOGGING_PROJECT_ENV`] is not set.
pub const DEFAULT_PROJECT: &str = "default";

/// Value of `key`, or `default` when it is unset or not valid unicode.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
