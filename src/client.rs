use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::env::{env_or, DEFAULT_PROJECT, LOGGING_PROJECT_ENV};
use crate::path::log_path;

/// Shared handle to a [`Logger`]. Two entries belong to the same logger
/// when their handles are [`Arc::ptr_eq`].
pub type LoggerRef = Arc<Logger>;

/// Cache of loggers keyed by fully-qualified log path.
///
/// Owned by the caller and passed into
/// [`LogEntry::from_api_repr`](crate::entry::LogEntry::from_api_repr) so that
/// entries sharing a `logName` resolve to one [`LoggerRef`]. Entries are only
/// ever read or inserted, never removed.
pub type LoggerRegistry = HashMap<String, LoggerRef>;

/// Project-scoped handle that hands out [`Logger`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    project: String,
}

impl Client {
    pub fn new(project: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            project: project.into(),
        })
    }

    /// Build a client for the project named by [`LOGGING_PROJECT_ENV`].
    pub fn from_env() -> Arc<Self> {
        Self::new(env_or(LOGGING_PROJECT_ENV, DEFAULT_PROJECT))
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Create a logger bound to this client.
    ///
    /// Every call allocates a fresh [`LoggerRef`]; use a [`LoggerRegistry`]
    /// to deduplicate.
    pub fn logger(self: &Arc<Self>, name: impl Into<String>) -> LoggerRef {
        Arc::new(Logger {
            name: name.into(),
            client: Arc::clone(self),
        })
    }
}

/// Named log channel under a project.
pub struct Logger {
    name: String,
    client: Arc<Client>,
}

impl Logger {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn client(&self) -> &Arc<Client> {
        &self.client
    }

    pub fn project(&self) -> &str {
        self.client.project()
    }

    /// Fully-qualified path, `projects/<project>/logs/<name>`.
    pub fn full_name(&self) -> String {
        log_path(self.project(), &self.name)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("project", &self.client.project)
            .finish()
    }
}
