//! Serde helpers for task timestamps.
//!
//! Timestamps are written as RFC 3339 in the local offset. Reading also
//! accepts the `dd/mm/yyyy, HH:MM` display form and bare `YYYY-MM-DD` dates,
//! which is what older stores and exports contain.

use chrono::SecondsFormat;
use serde::{Deserialize, Deserializer, Serializer};

use crate::dates::{self, Timestamp};

fn to_string(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Required timestamp field.
///
/// ```ignore
/// #[serde(with = "crate::serde_utils::timestamp")]
/// created_at: Timestamp,
/// ```
pub mod timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(ts: &Timestamp, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&to_string(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(de)?;
        dates::parse_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
    }
}

/// Optional timestamp field; pair with `default` and
/// `skip_serializing_if = "Option::is_none"`.
pub mod optional_timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(ts: &Option<Timestamp>, ser: S) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => ser.serialize_str(&to_string(ts)),
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Timestamp>, D::Error> {
        let raw = Option::<String>::deserialize(de)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => dates::parse_timestamp(value)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{value}'"))),
        }
    }
}

/// Optional due date; a bare date means the end of that local day.
pub mod optional_due_date {
    use super::*;

    pub use super::optional_timestamp::serialize;

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Timestamp>, D::Error> {
        let raw = Option::<String>::deserialize(de)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => dates::parse_due_date(value)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid due date '{value}'"))),
        }
    }
}
