//! Fixed column schema of the churn dataset.

/// Text identifier column, held out of the numeric frame.
pub const ID_COLUMN: &str = "user_primaryid";
/// Row tag column: routes each row to training or scoring.
pub const TAG_COLUMN: &str = "user_type";
/// Binary label column, present on every row.
pub const LABEL_COLUMN: &str = "churn_status";
/// Engagement column carried raw into the prediction output.
pub const ENGAGEMENT_COLUMN: &str = "plays_L60D";
/// Hour-of-day column, cyclically encoded in place.
pub const HOUR_COLUMN: &str = "avg_hour_L60D";
/// Month column, cyclically encoded in place.
pub const MONTH_COLUMN: &str = "month_access_date";
/// The one binary feature; bypasses normalization.
pub const BINARY_COLUMN: &str = "first_brand_ranking_indicator";

/// Model feature columns, in canonical order.
pub const FEATURE_COLUMNS: [&str; 31] = [
    "days_last_access",
    "month_access_date",
    "days_first_access",
    "first_brand_ranking_indicator",
    "plays",
    "t20_plays",
    "actions",
    "plays_L60D",
    "t20_plays_L60D",
    "recs_L60D",
    "actions_L60D",
    "brands_played_L60D",
    "subcats_played_L60D",
    "platforms_L60D",
    "weeks_accessed_L60D",
    "unq_recs_L60D",
    "avg_hour_L60D",
    "plays_L7D",
    "t20_plays_L7D",
    "recs_L7D",
    "day_bounce_rate_L7D",
    "brands_played_L7D",
    "actions_L7D",
    "days_accessed_L7D",
    "plays_delta",
    "t20_plays_delta",
    "recs_delta",
    "actions_delta",
    "day_bounce_rate_delta",
    "brands_played_delta",
    "subcats_played_delta",
];

/// Continuous feature columns: everything except the binary indicator.
/// These are the columns submitted to the normality test.
pub fn continuous_columns() -> Vec<&'static str> {
    FEATURE_COLUMNS
        .iter()
        .copied()
        .filter(|&c| c != BINARY_COLUMN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continuous_excludes_only_the_binary_column() {
        let continuous = continuous_columns();
        assert_eq!(continuous.len(), FEATURE_COLUMNS.len() - 1);
        assert!(!continuous.contains(&BINARY_COLUMN));
    }

    #[test]
    fn test_feature_columns_are_distinct() {
        let mut names: Vec<&str> = FEATURE_COLUMNS.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FEATURE_COLUMNS.len());
    }
}
