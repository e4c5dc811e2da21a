use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

pub const MIN_YEAR: i32 = 1870;
pub const MAX_YEAR: i32 = 2100;

/// Genre token MovieLens uses for movies without any genre.
pub const NO_GENRES_SENTINEL: &str = "(no genres listed)";

/// Year from a trailing `(YYYY)` suffix, e.g. `"Toy Story (1995)"`.
///
/// The title itself is left untouched; callers store it as given.
#[must_use]
pub fn extract_year(title: &str) -> Option<i32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\((\d{4})\)$").expect("Invalid regex"));

    let caps = re.captures(title.trim())?;
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;

    (MIN_YEAR..=MAX_YEAR).contains(&year).then_some(year)
}

/// Split a pipe-delimited genre field into a deduplicated, ordered set.
#[must_use]
pub fn split_genres(raw: &str) -> BTreeSet<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter(|token| !token.eq_ignore_ascii_case(NO_GENRES_SENTINEL))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year("Toy Story (1995)"), Some(1995));
        assert_eq!(extract_year("Heat (1995)  "), Some(1995));
        assert_eq!(extract_year("City of Lost Children, The (Cité des enfants perdus, La) (1995)"), Some(1995));
        assert_eq!(extract_year("The Great Train Robbery (1870)"), Some(1870));
        assert_eq!(extract_year("Far Future (2100)"), Some(2100));
    }

    #[test]
    fn test_extract_year_rejects_missing_or_invalid() {
        assert_eq!(extract_year("Babylon 5"), None);
        assert_eq!(extract_year("Too Early (1869)"), None);
        assert_eq!(extract_year("Too Late (2101)"), None);
        assert_eq!(extract_year("Mid (1995) Title"), None);
        assert_eq!(extract_year("Range (2006-2007)"), None);
        assert_eq!(extract_year("Short (995)"), None);
        assert_eq!(extract_year("Long (19950)"), None);
        assert_eq!(extract_year(""), None);
    }

    #[test]
    fn test_split_genres() {
        let genres = split_genres("Adventure|Animation|(no genres listed)");
        assert_eq!(
            genres.into_iter().collect::<Vec<_>>(),
            vec!["Adventure".to_string(), "Animation".to_string()]
        );
    }

    #[test]
    fn test_split_genres_trims_and_dedups() {
        let genres = split_genres(" Comedy | |Drama|Comedy||(NO GENRES LISTED)");
        assert_eq!(
            genres.into_iter().collect::<Vec<_>>(),
            vec!["Comedy".to_string(), "Drama".to_string()]
        );
    }

    #[test]
    fn test_split_genres_sentinel_only() {
        assert!(split_genres("(no genres listed)").is_empty());
        assert!(split_genres("").is_empty());
    }
}
