//! Serde helpers for human-readable durations ("500ms", "10s", "1m 30s").
//!
//! Plain integers are read as milliseconds and `{secs, nanos}` objects are
//! accepted so that configs serialized by older tooling keep loading.

use serde::{Deserialize, Deserializer, Serializer, de::Error};
use std::time::Duration;

pub fn serialize<S: Serializer>(
    value: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&humantime::format_duration(*value).to_string())
}

pub fn deserialize<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Duration, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Millis(u64),
        Parts { secs: u64, nanos: u32 },
    }

    match Raw::deserialize(deserializer)? {
        Raw::Text(text) => humantime::parse_duration(text.trim()).map_err(|err| {
            D::Error::custom(format!("invalid duration '{text}': {err}"))
        }),
        Raw::Millis(millis) => Ok(Duration::from_millis(millis)),
        Raw::Parts { secs, nanos } => Ok(Duration::new(secs, nanos)),
    }
}
