use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Placeholder OMDb uses for every missing field.
pub const NOT_AVAILABLE: &str = "N/A";

const DATE_FORMATS: [&str; 7] = [
    "%d %b %Y",
    "%d %B %Y",
    "%Y-%m-%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%m/%d/%Y",
    "%Y/%m/%d",
];

fn present(raw: Option<&str>) -> Option<&str> {
    let value = raw?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case(NOT_AVAILABLE) {
        None
    } else {
        Some(value)
    }
}

/// Clean an optional free-text field: trims, and maps blanks and `N/A` to `None`.
#[must_use]
pub fn clean_text(raw: Option<&str>) -> Option<String> {
    present(raw).map(str::to_string)
}

/// `"$223,808,164"` → `223808164`. Cents, if any, are truncated. Signed
/// amounts and anything beyond a single currency prefix give `None`.
#[must_use]
pub fn parse_box_office(raw: Option<&str>) -> Option<i64> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^(?:[$€£¥]|[A-Z]{3})?\s*(\d[\d,_ \x{a0}]*)(?:\.\d*)?$").expect("Invalid regex")
    });

    let value = present(raw)?;
    let caps = re.captures(value)?;
    let digits: String = caps
        .get(1)?
        .as_str()
        .chars()
        .filter(char::is_ascii_digit)
        .collect();

    digits.parse().ok()
}

/// `"142 min"` → `142`.
#[must_use]
pub fn parse_runtime(raw: Option<&str>) -> Option<i32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?i)^(\d+)\s*min").expect("Invalid regex"));

    let value = present(raw)?;
    let caps = re.captures(value)?;
    caps.get(1)?.as_str().parse().ok()
}

/// Human-readable release date to `YYYY-MM-DD`.
#[must_use]
pub fn parse_released_date(raw: Option<&str>) -> Option<String> {
    let value = present(raw)?;

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
}
