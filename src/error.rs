/// Error type returned when parsing or converting log entries.
#[derive(thiserror::Error, Debug)]
pub enum EntryError {
    #[error("log path has no `/logs/<name>` segment: {0:?}")]
    InvalidLogPath(String),

    #[error("entry is missing the `logName` field")]
    MissingLogName,

    #[error("entry representation must be a JSON object")]
    NotAnObject,

    #[error("invalid RFC3339 timestamp {value:?}: {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("malformed entry field: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("payload under `{key}` must be {expected}")]
    InvalidPayload {
        key: &'static str,
        expected: &'static str,
    },

    #[error("payload type {actual:?} does not match target message {expected:?}")]
    TypeMismatch { expected: String, actual: String },

    #[error("failed to merge payload into message: {0}")]
    Merge(#[from] prost::DecodeError),

    #[error("entry has no payload to parse")]
    MissingPayload,
}

pub type Result<T> = std::result::Result<T, EntryError>;
