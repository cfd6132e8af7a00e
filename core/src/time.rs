//! Time related utils.

use crate::{Error, Result};
use chrono::{NaiveDateTime, Utc};

/// The timestamp type carried through the signing pipeline.
///
/// One timestamp is taken per signing invocation and feeds the date header,
/// the credential scope, and the string to sign.
pub type DateTime = chrono::DateTime<Utc>;

/// Create a datetime of the current time, in UTC.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format a datetime into a date: `20220313`
pub fn format_date(t: DateTime) -> String {
    t.format("%Y%m%d").to_string()
}

/// Format a datetime into a compressed ISO 8601 timestamp: `20220313T072004Z`
pub fn format_iso8601(t: DateTime) -> String {
    t.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Parse a compressed ISO 8601 timestamp like `20220313T072004Z`.
pub fn parse_iso8601(s: &str) -> Result<DateTime> {
    let t = NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%SZ")
        .map_err(|e| Error::unexpected(format!("invalid timestamp {s}")).with_source(e))?;
    Ok(t.and_utc())
}
