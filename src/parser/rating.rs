use thiserror::Error;

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 5.0;

/// Reasons a single input row is excluded. Never fatal to a run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("malformed {field}: {value:?}")]
    MalformedId { field: &'static str, value: String },

    #[error("malformed timestamp: {0:?}")]
    MalformedTimestamp(String),

    #[error("malformed rating: {0:?}")]
    MalformedRating(String),

    #[error("rating {0} outside [0, 5]")]
    RatingOutOfRange(f64),
}

impl RowError {
    /// Short label used for drop counters.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::MalformedId { .. } => "malformed_id",
            Self::MalformedTimestamp(_) => "malformed_timestamp",
            Self::MalformedRating(_) => "malformed_rating",
            Self::RatingOutOfRange(_) => "rating_out_of_range",
        }
    }
}

/// Epoch seconds pass through unchanged; anything non-integral is a row error.
pub fn normalize_timestamp(raw: &str) -> Result<i64, RowError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| RowError::MalformedTimestamp(raw.to_string()))
}

pub fn parse_rating(raw: &str) -> Result<f64, RowError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| RowError::MalformedRating(raw.to_string()))?;

    if (MIN_RATING..=MAX_RATING).contains(&value) {
        Ok(value)
    } else {
        Err(RowError::RatingOutOfRange(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_timestamp() {
        assert_eq!(normalize_timestamp("964982703"), Ok(964_982_703));
        assert_eq!(normalize_timestamp(" 0 "), Ok(0));
        assert!(matches!(
            normalize_timestamp("2000-07-30"),
            Err(RowError::MalformedTimestamp(_))
        ));
        assert!(normalize_timestamp("").is_err());
        assert!(normalize_timestamp("9649.5").is_err());
    }

    #[test]
    fn test_parse_rating_bounds() {
        assert_eq!(parse_rating("4.0"), Ok(4.0));
        assert_eq!(parse_rating("0"), Ok(0.0));
        assert_eq!(parse_rating("5"), Ok(5.0));
        assert_eq!(parse_rating("5.5"), Err(RowError::RatingOutOfRange(5.5)));
        assert_eq!(parse_rating("-0.5"), Err(RowError::RatingOutOfRange(-0.5)));
    }

    #[test]
    fn test_parse_rating_malformed() {
        assert!(matches!(
            parse_rating("four"),
            Err(RowError::MalformedRating(_))
        ));
        // NaN parses but never lands inside the range.
        assert!(matches!(
            parse_rating("NaN"),
            Err(RowError::RatingOutOfRange(_))
        ));
    }

    #[test]
    fn test_reason_labels() {
        assert_eq!(RowError::RatingOutOfRange(9.0).reason(), "rating_out_of_range");
        assert_eq!(
            RowError::MalformedTimestamp(String::new()).reason(),
            "malformed_timestamp"
        );
    }
}
