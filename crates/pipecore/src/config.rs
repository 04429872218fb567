use crate::value::Value;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-node configuration, shaped by the node's type tag.
///
/// Unrecognized shapes land in `Unknown`, which retains the raw key/value
/// map so legacy configs round-trip instead of failing to load. Behaviors
/// handed a mismatched variant fall back to their defaults.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeConfig {
    Timer {
        cron: String,
    },
    DatabaseQuery {
        query: String,
        limit: Option<u64>,
    },
    HttpRequest {
        method: String,
        url: String,
    },
    Script {
        source: String,
    },
    Strategy {
        model: String,
        prompt: String,
    },
    Storage {
        destination: String,
    },
    Unknown(HashMap<String, Value>),
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig::Unknown(HashMap::new())
    }
}

/// Serde mirror of the typed variants; the `kind` tag discriminates.
#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TaggedConfig {
    Timer {
        cron: String,
    },
    DatabaseQuery {
        query: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<u64>,
    },
    HttpRequest {
        method: String,
        url: String,
    },
    Script {
        source: String,
    },
    Strategy {
        model: String,
        #[serde(default)]
        prompt: String,
    },
    Storage {
        destination: String,
    },
}

impl From<TaggedConfig> for NodeConfig {
    fn from(tagged: TaggedConfig) -> Self {
        match tagged {
            TaggedConfig::Timer { cron } => NodeConfig::Timer { cron },
            TaggedConfig::DatabaseQuery { query, limit } => {
                NodeConfig::DatabaseQuery { query, limit }
            }
            TaggedConfig::HttpRequest { method, url } => NodeConfig::HttpRequest { method, url },
            TaggedConfig::Script { source } => NodeConfig::Script { source },
            TaggedConfig::Strategy { model, prompt } => NodeConfig::Strategy { model, prompt },
            TaggedConfig::Storage { destination } => NodeConfig::Storage { destination },
        }
    }
}

impl Serialize for NodeConfig {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.clone() {
            NodeConfig::Timer { cron } => TaggedConfig::Timer { cron }.serialize(serializer),
            NodeConfig::DatabaseQuery { query, limit } => {
                TaggedConfig::DatabaseQuery { query, limit }.serialize(serializer)
            }
            NodeConfig::HttpRequest { method, url } => {
                TaggedConfig::HttpRequest { method, url }.serialize(serializer)
            }
            NodeConfig::Script { source } => TaggedConfig::Script { source }.serialize(serializer),
            NodeConfig::Strategy { model, prompt } => {
                TaggedConfig::Strategy { model, prompt }.serialize(serializer)
            }
            NodeConfig::Storage { destination } => {
                TaggedConfig::Storage { destination }.serialize(serializer)
            }
            NodeConfig::Unknown(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for NodeConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        match TaggedConfig::deserialize(raw.clone()) {
            Ok(tagged) => Ok(tagged.into()),
            // Missing or unrecognized kind tag: keep the raw map.
            Err(_) => match Value::from(raw) {
                Value::Object(map) => Ok(NodeConfig::Unknown(map)),
                other => Ok(NodeConfig::Unknown(HashMap::from([(
                    "value".to_string(),
                    other,
                )]))),
            },
        }
    }
}
