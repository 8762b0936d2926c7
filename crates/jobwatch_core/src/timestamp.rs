use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, Utc};

const NAIVE_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];
const ZONED_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];

const DISPLAY_FORMAT: &str = "%H:%M:%S";

/// Wall-clock zone used for displayed log times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayZone(FixedOffset);

impl DisplayZone {
    pub fn utc() -> Self {
        Self(Utc.fix())
    }

    /// Returns `None` when the offset is a day or more away from UTC.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self)
    }

    pub fn offset(self) -> FixedOffset {
        self.0
    }
}

impl Default for DisplayZone {
    /// UTC+09:00, the service's home zone.
    fn default() -> Self {
        Self::from_offset_minutes(9 * 60).unwrap_or_else(Self::utc)
    }
}

/// Formats a server timestamp as `HH:MM:SS` in `zone`.
///
/// Timestamps without a zone marker are read as UTC. Input that does not
/// parse is returned unchanged.
pub fn format_timestamp(raw: &str, zone: DisplayZone) -> String {
    if raw.is_empty() {
        return String::new();
    }
    match parse_timestamp(raw) {
        Some(instant) => instant
            .with_timezone(&zone.offset())
            .format(DISPLAY_FORMAT)
            .to_string(),
        None => raw.to_string(),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = raw.trim();
    if has_zone_marker(trimmed) {
        if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
            return Some(instant);
        }
        if let Some(utc) = trimmed.strip_suffix(['Z', 'z']) {
            return parse_naive_utc(utc);
        }
        return ZONED_INPUT_FORMATS
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(trimmed, fmt).ok());
    }
    parse_naive_utc(trimmed)
}

fn parse_naive_utc(raw: &str) -> Option<DateTime<FixedOffset>> {
    NAIVE_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}

/// `Z`, `z`, `+hh:mm`, `+hhmm`, `-hh:mm` or `-hhmm` at the end of the input.
fn has_zone_marker(raw: &str) -> bool {
    if raw.ends_with(['Z', 'z']) {
        return true;
    }
    let bytes = raw.as_bytes();
    let digits_then_sign = |tail: &[u8]| -> bool {
        let (sign, rest) = match tail.split_first() {
            Some(parts) => parts,
            None => return false,
        };
        matches!(sign, b'+' | b'-')
            && match rest {
                [h1, h2, b':', m1, m2] | [h1, h2, m1, m2] => [h1, h2, m1, m2]
                    .iter()
                    .all(|b| b.is_ascii_digit()),
                _ => false,
            }
    };
    (bytes.len() >= 6 && digits_then_sign(&bytes[bytes.len() - 6..]))
        || (bytes.len() >= 5 && digits_then_sign(&bytes[bytes.len() - 5..]))
}
