//! Normalisers for textual fields found on novel pages

use crate::extract::ExtractError;
use crate::model::NovelStatus;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

/// Days without an update after which a novel counts as completed
pub const COMPLETED_AFTER_DAYS: i64 = 30;

/// Date format of the "updated" field
pub const UPDATE_DATE_FORMAT: &str = "%Y-%m-%d";

/// "第 3 / 120 页" style page indicator; captures the total
static PAGE_INDICATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"第\s*\d+\s*/\s*(\d+)\s*页").expect("valid page indicator regex"));

/// Parses a word counter such as "12K", "3W", "1.5万" or "500"
///
/// `K` multiplies by one thousand; `W` and `万` by ten thousand.
pub fn parse_word_count(raw: &str) -> Result<u64, ExtractError> {
    let trimmed = raw.trim();
    let invalid = || ExtractError::InvalidField {
        field: "word_count",
        value: raw.to_string(),
    };

    let (number, multiplier): (&str, u64) =
        if let Some(n) = trimmed.strip_suffix(['K', 'k']) {
            (n, 1_000)
        } else if let Some(n) = trimmed.strip_suffix(['W', 'w', '万']) {
            (n, 10_000)
        } else {
            (trimmed, 1)
        };

    let number = number.trim();
    if number.is_empty() {
        return Err(invalid());
    }

    if number.bytes().all(|b| b.is_ascii_digit()) {
        let whole: u64 = number.parse().map_err(|_| invalid())?;
        return whole.checked_mul(multiplier).ok_or_else(invalid);
    }

    let value: f64 = number.parse().map_err(|_| invalid())?;
    let scaled = (value * multiplier as f64).round();
    if !scaled.is_finite() || scaled < 0.0 || scaled >= u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(scaled as u64)
}

/// Parses the "updated" date, tolerating a leading label
pub fn parse_update_date(raw: &str) -> Result<NaiveDate, ExtractError> {
    let trimmed = raw
        .trim()
        .trim_start_matches("更新时间：")
        .trim_start_matches("更新时间:")
        .trim();
    NaiveDate::parse_from_str(trimmed, UPDATE_DATE_FORMAT).map_err(|_| {
        ExtractError::InvalidField {
            field: "update_time",
            value: raw.to_string(),
        }
    })
}

/// Classifies a novel from the age of its latest update
///
/// More than [`COMPLETED_AFTER_DAYS`] days old is completed; anything
/// newer (including exactly 30 days) is ongoing.
pub fn derive_status(updated: NaiveDate, today: NaiveDate) -> NovelStatus {
    if (today - updated).num_days() > COMPLETED_AFTER_DAYS {
        NovelStatus::Completed
    } else {
        NovelStatus::Ongoing
    }
}

/// Reads the total page count from a page indicator fragment
///
/// Missing or unparsable indicators yield zero.
pub fn parse_total_pages(text: &str) -> u32 {
    PAGE_INDICATOR
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|total| total.as_str().parse().ok())
        .unwrap_or(0)
}
