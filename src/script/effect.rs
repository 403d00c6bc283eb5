//! Effects produced by conversation scripts

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const SAY: &str = "say";
pub const LISTEN: &str = "listen";

/// Inert description of a side effect for the driver to carry out
///
/// Wire shape is `{ "type": <kind>, ...fields }`.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send a text message to the user
    Say { text: String },

    /// Wait for the next message from the user
    Listen,

    /// Any kind the driver has no built-in interpretation for
    Other {
        kind: String,
        fields: Map<String, Value>,
    },
}

impl Effect {
    pub fn say(text: impl Into<String>) -> Self {
        Effect::Say { text: text.into() }
    }

    pub fn listen() -> Self {
        Effect::Listen
    }

    /// Build an effect from a kind and its payload fields.
    ///
    /// Known kinds are normalized into their typed variants; anything that
    /// does not fit one is kept as [`Effect::Other`].
    pub fn custom(kind: impl Into<String>, fields: Map<String, Value>) -> Self {
        let kind = kind.into();
        match kind.as_str() {
            SAY => match fields.get("text") {
                Some(Value::String(text)) => Effect::say(text.clone()),
                _ => Effect::Other { kind, fields },
            },
            LISTEN => Effect::Listen,
            _ => Effect::Other { kind, fields },
        }
    }

    /// Discriminant as it appears in the `type` field
    pub fn kind(&self) -> &str {
        match self {
            Effect::Say { .. } => SAY,
            Effect::Listen => LISTEN,
            Effect::Other { kind, .. } => kind,
        }
    }
}

impl Serialize for Effect {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Effect::Say { text } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", SAY)?;
                map.serialize_entry("text", text)?;
                map.end()
            }
            Effect::Listen => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("type", LISTEN)?;
                map.end()
            }
            Effect::Other { kind, fields } => {
                let mut map = serializer.serialize_map(Some(fields.len() + 1))?;
                map.serialize_entry("type", kind)?;
                for (key, value) in fields.iter().filter(|(key, _)| *key != "type") {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Effect {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut fields = Map::deserialize(deserializer)?;
        let kind = match fields.remove("type") {
            Some(Value::String(kind)) => kind,
            Some(other) => {
                return Err(de::Error::invalid_type(
                    de::Unexpected::Other(&other.to_string()),
                    &"a string effect type",
                ))
            }
            None => return Err(de::Error::missing_field("type")),
        };

        if kind == SAY && !matches!(fields.get("text"), Some(Value::String(_))) {
            return Err(de::Error::missing_field("text"));
        }
        Ok(Effect::custom(kind, fields))
    }
}
