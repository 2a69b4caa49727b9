//! Partial date resolution for metadata date fields.
//!
//! Registry payloads and curation forms supply dates at whatever precision
//! the depositor had: a bare year, a year and month, or a full calendar
//! date. This module expands the partial forms into concrete boundary dates
//! so they can serve as the start or end of a coverage range.
//!
//! # Examples
//!
//! ```
//! use curator::dates::{resolve, DateBoundary};
//!
//! assert_eq!(resolve("2020", DateBoundary::Start), Some("2020-01-01".into()));
//! assert_eq!(resolve("2020-02", DateBoundary::End), Some("2020-02-29".into()));
//! assert_eq!(resolve("2020-13", DateBoundary::Start), None);
//! ```

use chrono::Days;

use super::*;

/// Which end of a date range a partial date should expand towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBoundary {
  /// Expand to the earliest date the partial form covers.
  Start,
  /// Expand to the latest date the partial form covers.
  End,
}

/// Resolves a partial date string into a concrete calendar date.
///
/// Accepted forms, after trimming surrounding whitespace:
///
/// - `YYYY`: January 1 for [`DateBoundary::Start`], December 31 for
///   [`DateBoundary::End`]
/// - `YYYY-MM`: first day of the month, or its last day (month length and
///   leap years accounted for)
/// - `YYYY-MM-DD`: returned unchanged for either boundary
///
/// Empty input and out-of-range months (`00` or above `12`) resolve to
/// `None`. A day that does not exist in its month (Feb 30, Apr 31) is not
/// rejected: the surplus days roll forward into the following month, so
/// `2021-02-30` resolves to March 2. Callers that want to refuse such input
/// must check the day themselves before calling.
pub fn parse_date(raw: &str, boundary: DateBoundary) -> Option<NaiveDate> {
  lazy_static! {
    static ref YEAR: Regex = Regex::new(r"^(\d{4})$").unwrap();
    static ref YEAR_MONTH: Regex = Regex::new(r"^(\d{4})-(\d{2})$").unwrap();
    static ref FULL: Regex = Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap();
  }

  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }

  if let Some(caps) = YEAR.captures(raw) {
    let year: i32 = caps[1].parse().ok()?;
    return match boundary {
      DateBoundary::Start => NaiveDate::from_ymd_opt(year, 1, 1),
      DateBoundary::End => NaiveDate::from_ymd_opt(year, 12, 31),
    };
  }

  if let Some(caps) = YEAR_MONTH.captures(raw) {
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    if !(1..=12).contains(&month) {
      return None;
    }
    return match boundary {
      DateBoundary::Start => NaiveDate::from_ymd_opt(year, month, 1),
      DateBoundary::End => last_day_of_month(year, month),
    };
  }

  if let Some(caps) = FULL.captures(raw) {
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    if !(1..=12).contains(&month) || day == 0 {
      return None;
    }
    // Surplus days overflow into the following month rather than erroring.
    return NaiveDate::from_ymd_opt(year, month, 1)
      .and_then(|first| first.checked_add_days(Days::new(u64::from(day) - 1)));
  }

  None
}

/// String-facing variant of [`parse_date`], yielding `YYYY-MM-DD`.
pub fn resolve(raw: &str, boundary: DateBoundary) -> Option<String> {
  parse_date(raw, boundary).map(|date| date.format("%Y-%m-%d").to_string())
}

/// Returns the last day of the given month, leap years included.
fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
  let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
  NaiveDate::from_ymd_opt(next_year, next_month, 1).and_then(|first| first.pred_opt())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn year_expands_to_year_boundaries() {
    assert_eq!(resolve("2020", DateBoundary::Start), Some("2020-01-01".into()));
    assert_eq!(resolve("2020", DateBoundary::End), Some("2020-12-31".into()));
  }

  #[test]
  fn year_month_expands_to_month_boundaries() {
    assert_eq!(resolve("2023-04", DateBoundary::Start), Some("2023-04-01".into()));
    assert_eq!(resolve("2023-04", DateBoundary::End), Some("2023-04-30".into()));
    assert_eq!(resolve("2023-12", DateBoundary::End), Some("2023-12-31".into()));
  }

  #[test]
  fn february_end_respects_leap_years() {
    assert_eq!(resolve("2020-02", DateBoundary::End), Some("2020-02-29".into()));
    assert_eq!(resolve("2021-02", DateBoundary::End), Some("2021-02-28".into()));
    assert_eq!(resolve("2000-02", DateBoundary::End), Some("2000-02-29".into()));
  }

  #[test]
  fn full_date_passes_through_for_either_boundary() {
    assert_eq!(resolve("2022-07-15", DateBoundary::Start), Some("2022-07-15".into()));
    assert_eq!(resolve("2022-07-15", DateBoundary::End), Some("2022-07-15".into()));
  }

  #[test]
  fn invalid_days_overflow_into_the_next_month() {
    assert_eq!(resolve("2021-02-30", DateBoundary::Start), Some("2021-03-02".into()));
    assert_eq!(resolve("2020-02-30", DateBoundary::Start), Some("2020-03-01".into()));
    assert_eq!(resolve("2023-04-31", DateBoundary::End), Some("2023-05-01".into()));
  }

  #[test]
  fn out_of_range_months_are_rejected() {
    assert_eq!(parse_date("2020-00", DateBoundary::Start), None);
    assert_eq!(parse_date("2020-13", DateBoundary::Start), None);
    assert_eq!(parse_date("2020-13-01", DateBoundary::Start), None);
  }

  #[test]
  fn day_zero_is_rejected() {
    assert_eq!(parse_date("2020-05-00", DateBoundary::Start), None);
  }

  #[test]
  fn empty_and_malformed_input_resolve_to_none() {
    assert_eq!(parse_date("", DateBoundary::Start), None);
    assert_eq!(parse_date("   ", DateBoundary::Start), None);
    assert_eq!(parse_date("yesterday", DateBoundary::Start), None);
    assert_eq!(parse_date("20-01-01", DateBoundary::Start), None);
  }

  #[test]
  fn surrounding_whitespace_is_trimmed() {
    assert_eq!(resolve("  2019-06  ", DateBoundary::End), Some("2019-06-30".into()));
  }
}
