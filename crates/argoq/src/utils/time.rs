use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Result, bail};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, UtcOffset};

const NANOS_PER_MILLI: i128 = 1_000_000;

#[must_use]
pub fn unix_timestamp_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs())
}

#[must_use]
pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Parses the date part of a timestamp as it appears in intents, CLI flags
/// and database rows: `2024-05-01`, `2024-05-01 06:30:00`,
/// `2024-05-01T06:30:00Z`, or unix epoch seconds.
pub fn parse_date(raw: &str) -> Result<Date> {
    let candidate = raw.trim();
    if candidate.is_empty() {
        bail!("date input is empty");
    }

    if let Ok(parsed) = OffsetDateTime::parse(candidate, &Rfc3339) {
        return Ok(parsed.to_offset(UtcOffset::UTC).date());
    }

    if let Ok(epoch_seconds) = candidate.parse::<i64>() {
        return date_from_unix_seconds(epoch_seconds);
    }

    let date_part = match candidate.get(..10) {
        Some(prefix) if candidate.len() == 10 => prefix,
        Some(prefix) if matches!(candidate.as_bytes().get(10), Some(b' ' | b'T')) => prefix,
        _ => bail!("unsupported date format: {candidate}"),
    };

    Date::parse(date_part, format_description!("[year]-[month]-[day]"))
        .map_err(|error| anyhow::anyhow!("unsupported date format: {candidate} ({error})"))
}

pub fn date_from_unix_seconds(epoch_seconds: i64) -> Result<Date> {
    OffsetDateTime::from_unix_timestamp(epoch_seconds)
        .map(OffsetDateTime::date)
        .map_err(|error| anyhow::anyhow!("epoch seconds out of range: {epoch_seconds} ({error})"))
}

#[must_use]
pub fn format_sql_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

pub fn format_unix_ms(timestamp_unix_ms: u64) -> String {
    let nanos = i128::from(timestamp_unix_ms)
        .checked_mul(NANOS_PER_MILLI)
        .unwrap_or(i128::MAX);
    let dt = OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
        .to_offset(UtcOffset::UTC);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        dt.year(),
        u8::from(dt.month()),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second(),
        dt.millisecond()
    )
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::{format_sql_date, format_unix_ms, parse_date};

    #[test]
    fn parses_plain_sql_date() {
        let parsed = parse_date("2024-05-01").expect("date should parse");
        assert_eq!(parsed, date!(2024 - 05 - 01));
    }

    #[test]
    fn parses_sql_timestamp_text() {
        let parsed = parse_date("2024-05-01 23:59:59.123").expect("timestamp should parse");
        assert_eq!(parsed, date!(2024 - 05 - 01));

        let parsed = parse_date("2024-05-01T06:30:00").expect("naive iso timestamp should parse");
        assert_eq!(parsed, date!(2024 - 05 - 01));
    }

    #[test]
    fn parses_rfc3339_in_utc() {
        let parsed = parse_date("2024-05-01T01:00:00+03:00").expect("rfc3339 should parse");
        assert_eq!(parsed, date!(2024 - 04 - 30));
    }

    #[test]
    fn parses_epoch_seconds() {
        let parsed = parse_date("1714521600").expect("epoch seconds should parse");
        assert_eq!(parsed, date!(2024 - 05 - 01));
    }

    #[test]
    fn rejects_unsupported_text() {
        let err = parse_date("last tuesday").expect_err("free text should fail");
        assert!(err.to_string().contains("unsupported date format"));

        let err = parse_date("  ").expect_err("blank input should fail");
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn formats_sql_dates_with_padding() {
        assert_eq!(format_sql_date(date!(2023 - 01 - 09)), "2023-01-09");
    }

    #[test]
    fn formats_unix_ms_as_utc() {
        assert_eq!(format_unix_ms(1_770_274_803_042), "2026-02-05T07:00:03.042Z");
    }
}
