use time::OffsetDateTime;

use crate::error::RecordParseError;
use crate::types::{Action, UserId};

/// One append-only edit of a relationship log.
#[derive(Clone, Debug, PartialEq)]
pub struct EventRecord {
    /// Whether the edge was added or removed.
    pub action: Action,
    /// The user on the other end of the edge.
    pub other: UserId,
    /// Seconds since the Unix epoch, with sub-second precision.
    pub timestamp: f64,
}

impl EventRecord {
    /// Record with an explicit timestamp.
    pub fn new(action: Action, other: impl Into<UserId>, timestamp: f64) -> Self {
        Self {
            action,
            other: other.into(),
            timestamp,
        }
    }

    /// Record stamped with the current wall-clock time.
    pub fn now(action: Action, other: impl Into<UserId>) -> Self {
        Self::new(action, other, unix_timestamp())
    }
}

/// Current time as fractional seconds since the Unix epoch.
pub fn unix_timestamp() -> f64 {
    OffsetDateTime::now_utc().unix_timestamp_nanos() as f64 / 1_000_000_000.0
}

/// Encodes `record` as a single newline-terminated line.
pub fn encode_record(record: &EventRecord, separator: &str) -> String {
    format!(
        "{tag}{sep}{other}{sep}{ts:.6}\n",
        tag = record.action.tag(),
        sep = separator,
        other = record.other,
        ts = record.timestamp,
    )
}

/// Decodes one log line. `line_no` is one-based and only used for reporting.
///
/// The first character is the tag and must be followed by the separator. The
/// timestamp starts after the last separator; everything in between is the
/// identifier, which may be empty or contain the separator itself.
pub fn parse_record(
    line_no: usize,
    line: &str,
    separator: &str,
) -> Result<EventRecord, RecordParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(first) = line.chars().next() else {
        return Err(RecordParseError::new(line_no, "empty record"));
    };
    let (tag, rest) = line.split_at(first.len_utf8());
    let rest = rest
        .strip_prefix(separator)
        .ok_or_else(|| RecordParseError::new(line_no, "missing separator"))?;
    let (other, ts) = rest
        .rsplit_once(separator)
        .ok_or_else(|| RecordParseError::new(line_no, "expected three fields"))?;
    let action = Action::from_tag(tag)
        .ok_or_else(|| RecordParseError::new(line_no, format!("unknown action tag '{tag}'")))?;
    let timestamp: f64 = ts
        .parse()
        .map_err(|_| RecordParseError::new(line_no, format!("invalid timestamp '{ts}'")))?;
    if !timestamp.is_finite() {
        return Err(RecordParseError::new(
            line_no,
            format!("non-finite timestamp '{ts}'"),
        ));
    }
    Ok(EventRecord::new(action, other, timestamp))
}
