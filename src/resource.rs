use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::Result;

/// Monitored resource an entry is attributed to, e.g. `gae_app` with its
/// `module_id` and `version` labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl Resource {
    pub fn new(type_: impl Into<String>, labels: BTreeMap<String, String>) -> Self {
        Self {
            type_: type_.into(),
            labels,
        }
    }

    /// Convert the API's `{"type": .., "labels": {..}}` mapping.
    pub fn from_api_repr(value: &Value) -> Result<Self> {
        Ok(Resource::deserialize(value)?)
    }

    /// Render the `{"type": .., "labels": {..}}` mapping; `labels` is left
    /// out when there are none.
    pub fn to_api_repr(&self) -> Value {
        let mut repr = serde_json::Map::new();
        repr.insert("type".into(), Value::String(self.type_.clone()));
        if !self.labels.is_empty() {
            repr.insert("labels".into(), serde_json::json!(self.labels));
        }
        Value::Object(repr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_api_repr_without_labels() {
        let resource = Resource::from_api_repr(&json!({"type": "global"})).unwrap();
        assert_eq!(resource, Resource::new("global", BTreeMap::new()));
    }

    #[test]
    fn api_repr_uses_type_key() {
        let labels = BTreeMap::from([("module_id".to_string(), "default".to_string())]);
        let resource = Resource::new("gae_app", labels);
        let repr = resource.to_api_repr();
        assert_eq!(repr, json!({"type": "gae_app", "labels": {"module_id": "default"}}));
        assert_eq!(Resource::from_api_repr(&repr).unwrap(), resource);
    }

    #[test]
    fn api_repr_without_labels_omits_key() {
        let repr = json!({"type": "global"});
        let resource = Resource::from_api_repr(&repr).unwrap();
        assert_eq!(resource.to_api_repr(), repr);
    }

    #[test]
    fn rejects_non_string_labels() {
        assert!(Resource::from_api_repr(&json!({"type": "global", "labels": {"n": 1}})).is_err());
    }
}
