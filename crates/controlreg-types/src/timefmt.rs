//! Timestamp encoding shared by every artifact.
//!
//! All timestamps are rendered as ISO-8601 UTC strings truncated to whole seconds
//! (`2024-05-01T12:00:00Z`). Inputs may carry any offset or sub-second precision; they are
//! converted on the way in so that a value read back and written again is byte-identical.

use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, UtcOffset};

const UTC_SECONDS: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]Z");

/// Convert to UTC and drop sub-second precision.
pub fn truncate(ts: OffsetDateTime) -> OffsetDateTime {
    let utc = ts.to_offset(UtcOffset::UTC);
    utc - Duration::nanoseconds(i64::from(utc.nanosecond()))
}

pub fn format(ts: OffsetDateTime) -> Result<String, time::error::Format> {
    truncate(ts).format(UTC_SECONDS)
}

pub fn parse(s: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(s, &Rfc3339).map(truncate)
}

/// Recognise text holding a full date-time: RFC 3339, or a YAML timestamp such as
/// `2024-05-01 10:30:45.5 +02:00` (a missing offset means UTC). Date-only text is not a match.
pub fn parse_text(s: &str) -> Option<OffsetDateTime> {
    if let Ok(ts) = parse(s) {
        return Some(ts);
    }
    let bytes = s.as_bytes();
    if bytes.len() < 19 || !matches!(bytes[10], b' ' | b't' | b'T') {
        return None;
    }
    let (date, rest) = (&s[..10], s[11..].trim_start());
    let (clock, offset) = match rest.find(['Z', 'z', '+', '-']) {
        Some(at) => (rest[..at].trim_end(), &rest[at..]),
        None => (rest, "Z"),
    };
    let offset = match offset {
        "Z" | "z" => "Z".to_string(),
        other => {
            let (sign, body) = other.split_at(1);
            if body.contains(':') {
                other.to_string()
            } else if !body.is_empty() && body.len() <= 2 {
                format!("{sign}{body:0>2}:00")
            } else {
                return None;
            }
        }
    };
    parse(&format!("{date}T{clock}{offset}")).ok()
}

/// `#[serde(with = "controlreg_types::timefmt::utc_seconds")]`
pub mod utc_seconds {
    use serde::{Deserialize, Deserializer, Serializer, de, ser};
    use time::OffsetDateTime;

    pub fn serialize<S: Serializer>(
        ts: &OffsetDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let text = super::format(*ts).map_err(ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<OffsetDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse(&text)
            .map_err(|e| de::Error::custom(format!("invalid timestamp '{text}': {e}")))
    }

    /// Nullable variant; `None` is written as `null`.
    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer, de, ser};
        use time::OffsetDateTime;

        pub fn serialize<S: Serializer>(
            ts: &Option<OffsetDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match ts {
                Some(ts) => {
                    let text = crate::timefmt::format(*ts).map_err(ser::Error::custom)?;
                    serializer.serialize_some(&text)
                }
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<OffsetDateTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(text) => crate::timefmt::parse(&text)
                    .map(Some)
                    .map_err(|e| de::Error::custom(format!("invalid timestamp '{text}': {e}"))),
                None => Ok(None),
            }
        }
    }
}
