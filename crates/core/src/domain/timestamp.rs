// Compact ISO-8601 timestamps used in update result files
//
// The writer of the result file is a privileged shell script, and older
// result files are already on disk, so the format is fixed byte-for-byte.

use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Utc};

use super::error::{DomainError, Result};

/// `20210210T085735Z`
pub const COMPACT_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// `2021-02-10T085735Z`, accepted on read only
const DASHED_DATE_FORMAT: &str = "%Y-%m-%dT%H%M%SZ";

/// Years representable with a four-digit `%Y`
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 0..=9999;

/// Render a UTC instant in the compact result-file format
///
/// Years outside `YEAR_RANGE` render with a sign and extra digits that no
/// reader accepts, so they are rejected here.
pub fn format(ts: &DateTime<Utc>) -> Result<String> {
    if !YEAR_RANGE.contains(&ts.year()) {
        return Err(DomainError::InvalidTimestamp(ts.to_rfc3339()));
    }
    Ok(ts.format(COMPACT_FORMAT).to_string())
}

/// Parse a result-file timestamp
///
/// Accepts the compact form and the dashed-date variant. Anything else is
/// rejected rather than defaulted, since a present-but-garbled timestamp
/// means the file is corrupt.
pub fn parse(s: &str) -> Result<DateTime<Utc>> {
    [COMPACT_FORMAT, DASHED_DATE_FORMAT]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| DomainError::InvalidTimestamp(s.to_string()))
}
