//! Calendar-aware time remaining until a deadline.
//!
//! The breakdown follows relative-delta semantics: whole months are counted
//! first (with end-of-month clamping) and whatever is left becomes days and
//! H:M:S. Years are kept as-is, while leftover months and days are folded into
//! a single day count resolved against `now`, so months of different lengths
//! never drift.

use chrono::{DateTime, Datelike, Duration, Months, Utc};

use crate::error::DataShapeError;
use crate::model::CARBON_DEADLINE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub years: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

/// Raw relative delta such that `start + delta == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RelativeDelta {
    years: i64,
    months: i64,
    days: i64,
    hours: i64,
    minutes: i64,
    seconds: i64,
}

impl Countdown {
    /// Time left from `now` until `deadline`.
    ///
    /// A deadline in the past gives non-positive components, never a silently
    /// positive countdown.
    pub fn until(now: DateTime<Utc>, deadline: DateTime<Utc>) -> Result<Self, DataShapeError> {
        let out_of_range = DataShapeError::OutOfRange { module: CARBON_DEADLINE };

        let delta = relative_delta(deadline, now).ok_or(out_of_range.clone())?;

        let folded = add_months(now, delta.months)
            .and_then(|dt| dt.checked_add_signed(Duration::days(delta.days)))
            .ok_or(out_of_range)?;

        Ok(Self {
            years: delta.years,
            days: (folded - now).num_days(),
            hours: delta.hours,
            minutes: delta.minutes,
            seconds: delta.seconds,
        })
    }

    /// Seconds covered by this countdown when laid back onto `now`.
    pub fn total_seconds_from(&self, now: DateTime<Utc>) -> Option<i64> {
        let end = add_months(now, self.years.checked_mul(12)?)?
            .checked_add_signed(Duration::days(self.days))?
            .checked_add_signed(Duration::hours(self.hours))?
            .checked_add_signed(Duration::minutes(self.minutes))?
            .checked_add_signed(Duration::seconds(self.seconds))?;

        Some((end - now).num_seconds())
    }

    /// `HH:MM:SS` part of the countdown.
    pub fn clock(&self) -> String {
        format!("{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

fn relative_delta(end: DateTime<Utc>, start: DateTime<Utc>) -> Option<RelativeDelta> {
    let mut months = (i64::from(end.year()) - i64::from(start.year())) * 12
        + (i64::from(end.month()) - i64::from(start.month()));

    let mut anchor = add_months(start, months)?;
    if end < start {
        while end > anchor {
            months += 1;
            anchor = add_months(start, months)?;
        }
    } else {
        while end < anchor {
            months -= 1;
            anchor = add_months(start, months)?;
        }
    }

    let total = (end - anchor).num_seconds();
    let sign = total.signum();
    let rest = total.abs();

    Some(RelativeDelta {
        years: months / 12,
        months: months % 12,
        days: sign * (rest / 86_400),
        hours: sign * (rest % 86_400 / 3_600),
        minutes: sign * (rest % 3_600 / 60),
        seconds: sign * (rest % 60),
    })
}

fn add_months(dt: DateTime<Utc>, months: i64) -> Option<DateTime<Utc>> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 { dt.checked_add_months(magnitude) } else { dt.checked_sub_months(magnitude) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn four_hundred_days_reconstructs_exactly() {
        for now in [utc(2026, 10, 19, 8, 30, 15), utc(2026, 3, 1, 12, 0, 0), utc(2025, 6, 15, 23, 59, 59)]
        {
            let deadline = now + Duration::days(400);
            let countdown = Countdown::until(now, deadline).unwrap();

            let total = countdown.total_seconds_from(now).unwrap();
            assert!((total - 400 * 86_400).abs() <= 1, "now = {now}, countdown = {countdown:?}");
        }
    }

    #[test]
    fn breakdown_keeps_years_and_folds_months_into_days() {
        let now = utc(2026, 10, 19, 8, 0, 0);
        let deadline = utc(2029, 7, 22, 16, 0, 0);

        let countdown = Countdown::until(now, deadline).unwrap();

        // 2 years 9 months 3 days, with Oct 19 + 9 months 3 days = Jul 22 2027 (276 days)
        assert_eq!(
            countdown,
            Countdown { years: 2, days: 276, hours: 8, minutes: 0, seconds: 0 }
        );
        assert_eq!(countdown.clock(), "08:00:00");
    }

    #[test]
    fn months_are_clamped_to_month_end() {
        let now = utc(2027, 1, 31, 0, 0, 0);
        let deadline = utc(2027, 3, 6, 0, 0, 0);

        // Jan 31 + 1 month clamps to Feb 28, then 6 more days to Mar 6.
        let delta = relative_delta(deadline, now).unwrap();
        assert_eq!(delta.months, 1);
        assert_eq!(delta.days, 6);

        let countdown = Countdown::until(now, deadline).unwrap();
        assert_eq!(countdown.days, 34);
    }

    #[test]
    fn sub_day_remainder() {
        let now = utc(2026, 10, 19, 23, 59, 50);
        let deadline = utc(2026, 10, 20, 1, 2, 3);

        let countdown = Countdown::until(now, deadline).unwrap();
        assert_eq!(
            countdown,
            Countdown { years: 0, days: 0, hours: 1, minutes: 2, seconds: 13 }
        );
    }

    #[test]
    fn past_deadline_has_non_positive_components() {
        let now = utc(2030, 9, 1, 12, 0, 0);
        let deadline = utc(2029, 7, 22, 16, 0, 0);

        let countdown = Countdown::until(now, deadline).unwrap();

        assert_eq!(countdown.years, -1);
        assert!(countdown.days <= 0);
        assert!(countdown.hours <= 0);
        assert!(countdown.minutes <= 0);
        assert!(countdown.seconds <= 0);
        assert!(countdown.years + countdown.days + countdown.hours < 0);
    }

    #[test]
    fn deadline_equal_to_now_is_all_zero() {
        let now = utc(2026, 10, 19, 0, 0, 0);
        let countdown = Countdown::until(now, now).unwrap();

        assert_eq!(countdown, Countdown { years: 0, days: 0, hours: 0, minutes: 0, seconds: 0 });
        assert_eq!(countdown.clock(), "00:00:00");
    }
}
