//! Cell parsing and typed cell values

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use super::schema::ColumnType;

/// Date-only layouts, tried in order. Month and day accept one or two digits.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Layouts that carry their own UTC offset
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%a %b %d %H:%M:%S %z %Y",
    "%d %b %y %H:%M %z",
];

/// Layouts without an offset; read as UTC
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%a %b %e %H:%M:%S %Y",
];

/// Canonical layout for date values
pub const DATE_OUTPUT_FORMAT: &str = "%Y-%m-%d";

/// Parse an integer with optional sign and base prefix (`0x`, `0o`, `0b`,
/// or a bare leading `0` for octal).
pub fn parse_int(s: &str) -> Option<i64> {
    let (negative, body) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, digits) = if let Some(rest) = strip_prefix_ci(body, "0x") {
        (16, rest)
    } else if let Some(rest) = strip_prefix_ci(body, "0o") {
        (8, rest)
    } else if let Some(rest) = strip_prefix_ci(body, "0b") {
        (2, rest)
    } else if body.len() > 1 && body.starts_with('0') {
        (8, &body[1..])
    } else {
        (10, body)
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }

    let magnitude = u64::from_str_radix(digits, radix).ok()?;
    if negative {
        0i64.checked_sub_unsigned(magnitude)
    } else {
        i64::try_from(magnitude).ok()
    }
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        .then(|| &s[prefix.len()..])
}

pub fn parse_float(s: &str) -> Option<f64> {
    s.parse::<f64>().ok()
}

/// Case-insensitive `t`, `true`, `f`, `false`
pub fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "t" | "true" => Some(true),
        "f" | "false" => Some(false),
        _ => None,
    }
}

/// Parse a date-only value
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse a datetime value.
///
/// A bare date is also a valid datetime (midnight UTC).
pub fn parse_datetime(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt);
    }
    if let Some(dt) = OFFSET_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt);
    }
    if let Some(ndt) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(ndt.and_utc().fixed_offset());
    }
    parse_date(s)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc().fixed_offset())
}

/// Canonical text form of a datetime: RFC 3339 in UTC, whole seconds
pub fn format_datetime(dt: &DateTime<FixedOffset>) -> String {
    dt.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// A cell read under its column's type
#[derive(Debug, Clone, Copy)]
pub enum CellValue<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Date(NaiveDate),
    Datetime(DateTime<FixedOffset>),
    String(&'a str),
}

impl<'a> CellValue<'a> {
    /// Read `raw` as a value of `column_type`.
    ///
    /// Empty cells are `Null` under every type. Returns `None` when a
    /// non-empty cell does not parse as the requested type.
    pub fn parse(raw: &'a str, column_type: ColumnType) -> Option<CellValue<'a>> {
        if raw.is_empty() {
            return Some(CellValue::Null);
        }
        match column_type {
            ColumnType::Null => None,
            ColumnType::Int => parse_int(raw).map(CellValue::Int),
            // Int joins into Float, so integer spellings must read as floats too
            ColumnType::Float => parse_float(raw)
                .or_else(|| parse_int(raw).map(|i| i as f64))
                .map(CellValue::Float),
            ColumnType::Boolean => parse_bool(raw).map(CellValue::Bool),
            ColumnType::Date => parse_date(raw).map(CellValue::Date),
            ColumnType::Datetime => parse_datetime(raw).map(CellValue::Datetime),
            ColumnType::String => Some(CellValue::String(raw)),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Canonical text form
    pub fn display(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Date(d) => d.format(DATE_OUTPUT_FORMAT).to_string(),
            CellValue::Datetime(dt) => format_datetime(dt),
            CellValue::String(s) => (*s).to_string(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            CellValue::Null => 0,
            CellValue::Bool(_) => 1,
            CellValue::Int(_) => 2,
            CellValue::Float(_) => 3,
            CellValue::Date(_) => 4,
            CellValue::Datetime(_) => 5,
            CellValue::String(_) => 6,
        }
    }
}

impl PartialEq for CellValue<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue<'_> {}

impl PartialOrd for CellValue<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Null sorts before everything else. Values of one column always share a
/// variant; mixed variants fall back to a fixed rank.
impl Ord for CellValue<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => Ordering::Equal,
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (CellValue::Int(a), CellValue::Int(b)) => a.cmp(b),
            (CellValue::Float(a), CellValue::Float(b)) => a.total_cmp(b),
            (CellValue::Date(a), CellValue::Date(b)) => a.cmp(b),
            (CellValue::Datetime(a), CellValue::Datetime(b)) => a.cmp(b),
            (CellValue::String(a), CellValue::String(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl std::fmt::Display for CellValue<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}
