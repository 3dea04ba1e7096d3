//! Serde helpers for server-issued ids.
//!
//! The backend emits ids as JSON integers; other deployments use strings.
//! Both are normalised to their decimal text.

use serde::{Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Signed(i64),
    Unsigned(u64),
    Text(String),
}

pub(crate) fn serialize<S>(id: &str, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(id)
}

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Signed(n) => n.to_string(),
        RawId::Unsigned(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}
