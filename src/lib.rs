pub mod error;
pub mod path;
pub mod timestamp;
pub mod resource;
pub mod client;
pub mod entry;

pub mod env;

pub use client::{Client, Logger, LoggerRef, LoggerRegistry};
pub use entry::{
    entries_from_api_repr, AnyEntry, EntryOptions, JsonPayload, LogEntry, Payload, ProtoPayload,
    ProtobufEntry, StructEntry, TextEntry,
};
pub use error::{EntryError, Result};
pub use resource::Resource;
