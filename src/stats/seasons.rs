// src/stats/seasons.rs

use chrono::{Datelike, NaiveDate};

/// 2025 -> `2024-25`.
pub fn season_label_from_end_year(end_year: i32) -> String {
    format!("{}-{:02}", end_year - 1, end_year.rem_euclid(100))
}

/// Labels of the last `n` completed seasons, newest first. From July on, the
/// season that ended this calendar year counts as completed.
pub fn last_n_seasons_labels(n: usize, today: NaiveDate) -> Vec<String> {
    let latest_end = if today.month() >= 7 {
        today.year()
    } else {
        today.year() - 1
    };
    (0..n as i32)
        .map(|i| season_label_from_end_year(latest_end - i))
        .collect()
}
