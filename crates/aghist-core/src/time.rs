use chrono::{DateTime, Local, Offset, SecondsFormat, TimeZone, Utc};

/// Milliseconds/seconds cutover. Raw epoch values above this are taken as
/// milliseconds (read as seconds, 1e10 is already in the year 2286).
const EPOCH_MS_THRESHOLD: f64 = 1e10;

/// Render a raw epoch number as ISO-8601 UTC with a `Z` suffix.
///
/// Vendors mix units freely: Cursor stores milliseconds, some legacy rows
/// hold seconds. Returns None for values outside chrono's representable
/// range.
pub fn epoch_to_iso_utc(raw: f64) -> Option<String> {
    let dt = epoch_to_datetime(raw)?;
    Some(format_iso_utc(dt))
}

/// Calendar date (`YYYY-MM-DD`, UTC) for a raw epoch number.
pub fn epoch_to_date(raw: f64) -> Option<String> {
    let dt = epoch_to_datetime(raw)?;
    Some(dt.format("%Y-%m-%d").to_string())
}

fn epoch_to_datetime(raw: f64) -> Option<DateTime<Utc>> {
    let millis = if raw > EPOCH_MS_THRESHOLD {
        raw as i64
    } else {
        (raw * 1000.0) as i64
    };
    Utc.timestamp_millis_opt(millis).single()
}

/// Current instant as ISO-8601 UTC with a `Z` suffix.
pub fn now_iso_utc() -> String {
    format_iso_utc(Utc::now())
}

/// ISO-8601 UTC with a `Z` suffix, sub-second digits only when present.
pub fn format_iso_utc(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse an ISO-8601 timestamp (offset or `Z` suffixed) into UTC.
pub fn parse_iso_utc(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Calendar date (`YYYY-MM-DD`) of an ISO-8601 timestamp.
pub fn iso_to_date(value: &str) -> Option<String> {
    parse_iso_utc(value).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// Today's local calendar date as `YYYY-MM-DD`.
pub fn today_date() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Local calendar date of a filesystem timestamp as `YYYY-MM-DD`.
pub fn mtime_date(time: std::time::SystemTime) -> String {
    let dt: DateTime<Local> = time.into();
    dt.format("%Y-%m-%d").to_string()
}

/// Machine timezone label like `UTC+2`, recorded in chat metadata.
///
/// Hour granularity; the minutes of half-hour zones are dropped.
pub fn timezone_label() -> String {
    let offset_seconds = Local::now().offset().fix().local_minus_utc();
    let sign = if offset_seconds >= 0 { '+' } else { '-' };
    format!("UTC{}{}", sign, offset_seconds.abs() / 3600)
}
