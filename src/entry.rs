use base64::Engine as _;
use chrono::{DateTime, Utc};
use prost::Name;
use prost_types::Any;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::hash_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::client::{Client, LoggerRef, LoggerRegistry};
use crate::error::{EntryError, Result};
use crate::path::logger_name_from_path;
use crate::resource::Resource;
use crate::timestamp::{format_rfc3339_nanos, parse_rfc3339_nanos};

/// Structured body of a `jsonPayload` entry.
pub type JsonPayload = Map<String, Value>;

/// Body of a log entry, tied to the key it travels under in the API
/// representation.
pub trait Payload: Sized {
    /// Key holding the payload, e.g. `textPayload`.
    const KEY: &'static str;

    fn from_api_repr(value: &Value) -> Result<Self>;

    fn to_api_repr(&self) -> Value;
}

impl Payload for String {
    const KEY: &'static str = "textPayload";

    fn from_api_repr(value: &Value) -> Result<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or(EntryError::InvalidPayload {
                key: Self::KEY,
                expected: "a string",
            })
    }

    fn to_api_repr(&self) -> Value {
        Value::String(self.clone())
    }
}

impl Payload for JsonPayload {
    const KEY: &'static str = "jsonPayload";

    fn from_api_repr(value: &Value) -> Result<Self> {
        value.as_object().cloned().ok_or(EntryError::InvalidPayload {
            key: Self::KEY,
            expected: "an object",
        })
    }

    fn to_api_repr(&self) -> Value {
        Value::Object(self.clone())
    }
}

/// Body of a `protoPayload` entry.
///
/// The API returns the JSON form of the packed message; entries built
/// locally may instead hold the binary [`Any`] envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtoPayload {
    Json(JsonPayload),
    Any(Any),
}

impl Payload for ProtoPayload {
    const KEY: &'static str = "protoPayload";

    fn from_api_repr(value: &Value) -> Result<Self> {
        value
            .as_object()
            .cloned()
            .map(ProtoPayload::Json)
            .ok_or(EntryError::InvalidPayload {
                key: Self::KEY,
                expected: "an object",
            })
    }

    fn to_api_repr(&self) -> Value {
        match self {
            ProtoPayload::Json(map) => Value::Object(map.clone()),
            ProtoPayload::Any(any) => serde_json::json!({
                "@type": any.type_url,
                "value": base64::engine::general_purpose::STANDARD.encode(&any.value),
            }),
        }
    }
}

/// Optional metadata of a [`LogEntry`].
///
/// Every field defaults to `None`; absence is never encoded as an empty
/// string or map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryOptions {
    /// Deduplication key assigned by the writer.
    pub insert_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub labels: Option<BTreeMap<String, String>>,
    pub severity: Option<String>,
    /// `httpRequest` mapping (`requestMethod`, `requestUrl`, `status`, ...),
    /// kept as received.
    pub http_request: Option<Map<String, Value>>,
    pub resource: Option<Resource>,
}

/// A single log record: a payload of kind `P` plus metadata, owned by a
/// [`Logger`](crate::client::Logger).
///
/// Entries are immutable once built.
#[derive(Debug, Clone)]
pub struct LogEntry<P> {
    payload: Option<P>,
    logger: LoggerRef,
    options: EntryOptions,
}

/// Entry with an unstructured text payload.
pub type TextEntry = LogEntry<String>;
/// Entry with a JSON object payload.
pub type StructEntry = LogEntry<JsonPayload>;
/// Entry with a protobuf payload.
pub type ProtobufEntry = LogEntry<ProtoPayload>;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEntry {
    log_name: Option<String>,
    insert_id: Option<String>,
    timestamp: Option<String>,
    labels: Option<BTreeMap<String, String>>,
    severity: Option<String>,
    http_request: Option<Map<String, Value>>,
    resource: Option<Value>,
}

impl<P> LogEntry<P> {
    /// Build an entry with no metadata.
    pub fn new(payload: P, logger: LoggerRef) -> Self {
        Self::with_options(payload, logger, EntryOptions::default())
    }

    pub fn with_options(payload: P, logger: LoggerRef, options: EntryOptions) -> Self {
        Self {
            payload: Some(payload),
            logger,
            options,
        }
    }

    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    pub fn logger(&self) -> &LoggerRef {
        &self.logger
    }

    pub fn options(&self) -> &EntryOptions {
        &self.options
    }

    pub fn insert_id(&self) -> Option<&str> {
        self.options.insert_id.as_deref()
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.options.timestamp
    }

    pub fn labels(&self) -> Option<&BTreeMap<String, String>> {
        self.options.labels.as_ref()
    }

    pub fn severity(&self) -> Option<&str> {
        self.options.severity.as_deref()
    }

    pub fn http_request(&self) -> Option<&Map<String, Value>> {
        self.options.http_request.as_ref()
    }

    pub fn resource(&self) -> Option<&Resource> {
        self.options.resource.as_ref()
    }
}

impl<P: Payload> LogEntry<P> {
    /// Reconstruct an entry from its API representation.
    ///
    /// **Parameters**
    /// - `repr`: JSON object as returned by the logging API.
    /// - `client`: creates the owning logger when none is cached.
    /// - `loggers`: optional [`LoggerRegistry`]. A logger already stored
    ///   under the entry's `logName` is reused; otherwise the new logger is
    ///   inserted so later calls with the same registry share it.
    ///
    /// **Returns**
    /// - The entry, with every field missing from `repr` left as `None`.
    /// - `Err(..)` on a missing or malformed `logName`, an unparseable
    ///   `timestamp`, or fields of the wrong JSON shape.
    pub fn from_api_repr(
        repr: &Value,
        client: &Arc<Client>,
        loggers: Option<&mut LoggerRegistry>,
    ) -> Result<Self> {
        let object = repr.as_object().ok_or(EntryError::NotAnObject)?;
        let payload = object
            .get(P::KEY)
            .filter(|value| !value.is_null())
            .map(P::from_api_repr)
            .transpose()?;

        let api = ApiEntry::deserialize(repr)?;
        let log_name = api.log_name.ok_or(EntryError::MissingLogName)?;
        let logger = resolve_logger(&log_name, client, loggers)?;
        trace!(log_name = %log_name, payload_key = P::KEY, "Parsed log entry.");

        let timestamp = api
            .timestamp
            .as_deref()
            .map(parse_rfc3339_nanos)
            .transpose()?;
        let resource = api
            .resource
            .as_ref()
            .map(Resource::from_api_repr)
            .transpose()?;

        Ok(Self {
            payload,
            logger,
            options: EntryOptions {
                insert_id: api.insert_id,
                timestamp,
                labels: api.labels,
                severity: api.severity,
                http_request: api.http_request,
                resource,
            },
        })
    }

    /// Render the entry in the API representation, omitting absent fields.
    pub fn to_api_repr(&self) -> Value {
        let mut repr = Map::new();
        repr.insert("logName".into(), Value::String(self.logger.full_name()));
        if let Some(payload) = &self.payload {
            repr.insert(P::KEY.into(), payload.to_api_repr());
        }

        let options = &self.options;
        if let Some(insert_id) = &options.insert_id {
            repr.insert("insertId".into(), Value::String(insert_id.clone()));
        }
        if let Some(timestamp) = &options.timestamp {
            repr.insert("timestamp".into(), Value::String(format_rfc3339_nanos(timestamp)));
        }
        if let Some(labels) = &options.labels {
            let labels = labels
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            repr.insert("labels".into(), Value::Object(labels));
        }
        if let Some(severity) = &options.severity {
            repr.insert("severity".into(), Value::String(severity.clone()));
        }
        if let Some(http_request) = &options.http_request {
            repr.insert("httpRequest".into(), Value::Object(http_request.clone()));
        }
        if let Some(resource) = &options.resource {
            repr.insert("resource".into(), resource.to_api_repr());
        }
        Value::Object(repr)
    }
}

impl LogEntry<ProtoPayload> {
    /// Build an entry holding the JSON form of a protobuf payload.
    pub fn from_json(payload: JsonPayload, logger: LoggerRef) -> Self {
        Self::new(ProtoPayload::Json(payload), logger)
    }

    /// Build an entry holding a packed [`Any`] envelope.
    pub fn from_any(payload: Any, logger: LoggerRef) -> Self {
        Self::new(ProtoPayload::Any(payload), logger)
    }

    pub fn payload_json(&self) -> Option<&JsonPayload> {
        match self.payload.as_ref()? {
            ProtoPayload::Json(map) => Some(map),
            ProtoPayload::Any(_) => None,
        }
    }

    pub fn payload_pb(&self) -> Option<&Any> {
        match self.payload.as_ref()? {
            ProtoPayload::Any(any) => Some(any),
            ProtoPayload::Json(_) => None,
        }
    }

    /// Merge the payload into `message`.
    ///
    /// A packed envelope is merged from its bytes; its type URL must name
    /// `M`. The JSON form is decoded through `M`'s serde implementation and
    /// then merged, after checking its `@type` (when present) the same way.
    /// The entry itself is left untouched.
    pub fn parse_message<M>(&self, message: &mut M) -> Result<()>
    where
        M: Name + DeserializeOwned,
    {
        match self.payload.as_ref().ok_or(EntryError::MissingPayload)? {
            ProtoPayload::Any(any) => {
                check_type_url::<M>(&any.type_url)?;
                message.merge(any.value.as_slice())?;
            }
            ProtoPayload::Json(fields) => {
                let mut fields = fields.clone();
                if let Some(type_url) = fields.remove(TYPE_KEY) {
                    match type_url.as_str() {
                        Some(type_url) => check_type_url::<M>(type_url)?,
                        None => {
                            return Err(EntryError::TypeMismatch {
                                expected: M::full_name(),
                                actual: type_url.to_string(),
                            })
                        }
                    }
                }
                let parsed: M = serde_json::from_value(Value::Object(fields))?;
                message.merge(parsed.encode_to_vec().as_slice())?;
            }
        }
        Ok(())
    }
}

/// Key naming the message type in the JSON form of an `Any`.
const TYPE_KEY: &str = "@type";

fn check_type_url<M: Name>(type_url: &str) -> Result<()> {
    let actual = type_url.rsplit_once('/').map_or(type_url, |(_, name)| name);
    let expected = M::full_name();
    if actual != expected {
        return Err(EntryError::TypeMismatch {
            expected,
            actual: type_url.to_string(),
        });
    }
    Ok(())
}

/// Entry of any payload kind, as found in a mixed listing.
#[derive(Debug, Clone)]
pub enum AnyEntry {
    Text(TextEntry),
    Struct(StructEntry),
    Protobuf(ProtobufEntry),
}

impl AnyEntry {
    /// Reconstruct an entry, choosing the variant by which non-null payload
    /// key `repr` carries. Entries with no payload key come back as
    /// [`AnyEntry::Text`] with no payload.
    pub fn from_api_repr(
        repr: &Value,
        client: &Arc<Client>,
        loggers: Option<&mut LoggerRegistry>,
    ) -> Result<Self> {
        let carries = |key: &str| repr.get(key).is_some_and(|value| !value.is_null());
        if carries(JsonPayload::KEY) {
            StructEntry::from_api_repr(repr, client, loggers).map(AnyEntry::Struct)
        } else if carries(ProtoPayload::KEY) {
            ProtobufEntry::from_api_repr(repr, client, loggers).map(AnyEntry::Protobuf)
        } else {
            TextEntry::from_api_repr(repr, client, loggers).map(AnyEntry::Text)
        }
    }

    pub fn logger(&self) -> &LoggerRef {
        match self {
            AnyEntry::Text(entry) => entry.logger(),
            AnyEntry::Struct(entry) => entry.logger(),
            AnyEntry::Protobuf(entry) => entry.logger(),
        }
    }

    pub fn options(&self) -> &EntryOptions {
        match self {
            AnyEntry::Text(entry) => entry.options(),
            AnyEntry::Struct(entry) => entry.options(),
            AnyEntry::Protobuf(entry) => entry.options(),
        }
    }

    pub fn to_api_repr(&self) -> Value {
        match self {
            AnyEntry::Text(entry) => entry.to_api_repr(),
            AnyEntry::Struct(entry) => entry.to_api_repr(),
            AnyEntry::Protobuf(entry) => entry.to_api_repr(),
        }
    }
}

/// Reconstruct a batch of entries sharing one logger registry.
///
/// When `loggers` is `None` a registry scoped to this call is used, so each
/// distinct `logName` in the batch still maps to a single logger.
pub fn entries_from_api_repr<'a, I>(
    reprs: I,
    client: &Arc<Client>,
    loggers: Option<&mut LoggerRegistry>,
) -> Result<Vec<AnyEntry>>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut local = LoggerRegistry::new();
    let loggers = match loggers {
        Some(loggers) => loggers,
        None => &mut local,
    };
    reprs
        .into_iter()
        .map(|repr| AnyEntry::from_api_repr(repr, client, Some(&mut *loggers)))
        .collect()
}

fn resolve_logger(
    log_name: &str,
    client: &Arc<Client>,
    loggers: Option<&mut LoggerRegistry>,
) -> Result<LoggerRef> {
    let Some(loggers) = loggers else {
        return Ok(client.logger(logger_name_from_path(log_name)?));
    };

    match loggers.entry(log_name.to_string()) {
        Entry::Occupied(cached) => {
            debug!(log_name = %log_name, "Reusing registered logger.");
            Ok(Arc::clone(cached.get()))
        }
        Entry::Vacant(slot) => {
            let logger = client.logger(logger_name_from_path(log_name)?);
            debug!(log_name = %log_name, "Registering new logger.");
            Ok(Arc::clone(slot.insert(logger)))
        }
    }
}
