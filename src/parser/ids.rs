/// Prefix used by IMDb-style identifiers.
pub const EXTERNAL_ID_PREFIX: &str = "tt";

/// Minimum digit width of the numeric part, zero padded.
pub const EXTERNAL_ID_WIDTH: usize = 7;

/// `114709` → `"tt0114709"`.
#[must_use]
pub fn to_canonical_external_id(numeric: u64) -> String {
    format!(
        "{EXTERNAL_ID_PREFIX}{numeric:0width$}",
        width = EXTERNAL_ID_WIDTH
    )
}

/// Numeric id as it appears in the link file, e.g. `"0114709"`.
///
/// Some exports write integral floats (`"114709.0"`); those are accepted.
#[must_use]
pub fn parse_numeric_external_id(raw: &str) -> Option<u64> {
    let value = raw.trim();
    let value = value.strip_suffix(".0").unwrap_or(value);
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Integer identifier field (movie id, user id).
#[must_use]
pub fn parse_id(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}
