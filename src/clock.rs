//! A `Clock` is a time-of-day pattern with optionally wildcarded fields.

use crate::{
	error::{invalid_hour_error, invalid_minute_error, invalid_second_error},
	schedule::{to_local, truncate},
	Result, Schedule,
};
use chrono::{DateTime, Duration, Local, NaiveTime, Timelike};
use std::fmt;

/// A wall-clock time of day.  Each field is either fixed or `None`,
/// meaning "matches any value at this position".
///
/// ```rust
/// # use chime::Clock;
/// # fn main() -> chime::Result<()> {
/// let half_past = Clock::new(None, Some(30), Some(0))?;
/// assert_eq!(half_past.to_string(), "*:30:00");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
	hour: Option<u32>,
	minute: Option<u32>,
	second: Option<u32>,
}

impl Clock {
	/// Construct a clock pattern, validating each fixed field's range.
	pub fn new(hour: Option<u32>, minute: Option<u32>, second: Option<u32>) -> Result<Self> {
		if let Some(h) = hour {
			if h > 23 {
				return Err(invalid_hour_error(h));
			}
		}
		if let Some(m) = minute {
			if m > 59 {
				return Err(invalid_minute_error(m));
			}
		}
		if let Some(s) = second {
			if s > 59 {
				return Err(invalid_second_error(s));
			}
		}
		Ok(Self {
			hour,
			minute,
			second,
		})
	}

	/// A fully specified clock, one precise second of the day.
	pub fn at(hour: u32, minute: u32, second: u32) -> Result<Self> {
		Self::new(Some(hour), Some(minute), Some(second))
	}

	/// The top of the given hour: `hour:00:00`.
	pub fn at_hour(hour: u32) -> Result<Self> {
		Self::new(Some(hour), Some(0), Some(0))
	}

	/// The top of the given minute, every hour: `*:minute:00`.
	pub fn at_minute(minute: u32) -> Result<Self> {
		Self::new(None, Some(minute), Some(0))
	}

	/// The given second, every minute: `*:*:second`.
	pub fn at_second(second: u32) -> Result<Self> {
		Self::new(None, None, Some(second))
	}

	/// A clock matching every second of the day.
	#[must_use]
	pub fn any() -> Self {
		Self {
			hour: None,
			minute: None,
			second: None,
		}
	}

	/// A fully specified clock taken from a concrete time of day.
	pub(crate) fn from_time(t: NaiveTime) -> Self {
		Self {
			hour: Some(t.hour()),
			minute: Some(t.minute()),
			second: Some(t.second()),
		}
	}

	/// The single time of day a fully specified clock denotes, or `None`
	/// if any field is wildcarded.
	pub(crate) fn as_time(&self) -> Option<NaiveTime> {
		NaiveTime::from_hms_opt(self.hour?, self.minute?, self.second?)
	}

	/// Check one field of the pattern against a concrete value.
	fn field_matches(field: Option<u32>, value: u32) -> bool {
		field.map_or(true, |f| f == value)
	}

	/// Whether the pattern accepts this time of day.
	pub(crate) fn matches_time(&self, t: NaiveTime) -> bool {
		Self::field_matches(self.hour, t.hour())
			&& Self::field_matches(self.minute, t.minute())
			&& Self::field_matches(self.second, t.second())
	}

	/// The earliest matching time of day at or after `after`, if one remains
	/// before midnight.  Fields roll forward with carry: a later hour frees
	/// wildcarded minute/second fields to restart from zero.
	pub(crate) fn next_time_of_day(&self, after: NaiveTime) -> Option<NaiveTime> {
		for hour in after.hour()..24 {
			if !Self::field_matches(self.hour, hour) {
				continue;
			}
			let minute_floor = if hour == after.hour() { after.minute() } else { 0 };
			for minute in minute_floor..60 {
				if !Self::field_matches(self.minute, minute) {
					continue;
				}
				let second_floor = if hour == after.hour() && minute == after.minute() {
					after.second()
				} else {
					0
				};
				for second in second_floor..60 {
					if Self::field_matches(self.second, second) {
						return NaiveTime::from_hms_opt(hour, minute, second);
					}
				}
			}
		}
		None
	}

	/// The earliest matching time of day overall, used when anchoring at
	/// midnight of a fresh date.
	pub(crate) fn first_time_of_day(&self) -> NaiveTime {
		// the all-zero floor always yields a candidate for a valid pattern
		self.next_time_of_day(NaiveTime::MIN)
			.unwrap_or(NaiveTime::MIN)
	}
}

impl Schedule for Clock {
	fn is_matched(&self, t: DateTime<Local>) -> bool {
		self.matches_time(t.time())
	}

	/// A clock always matches again within 24 hours, so this never returns
	/// `None`.  When `t` itself matches, `next(t) == t` (zero wait).
	fn next(&self, t: DateTime<Local>) -> Option<DateTime<Local>> {
		let t = truncate(t);
		match self.next_time_of_day(t.time()) {
			Some(tod) => Some(to_local(t.date_naive().and_time(tod))),
			None => {
				// time-of-day exhausted for today, wrap to the next day
				let tomorrow = t.date_naive().succ_opt()?;
				Some(to_local(tomorrow.and_time(self.first_time_of_day())))
			}
		}
	}

	fn ticker_duration(&self) -> Duration {
		match (self.hour, self.minute, self.second) {
			// one precise second per day
			(Some(_), Some(_), Some(_)) => Duration::hours(24),
			// once an hour at a fixed minute and second
			(None, Some(_), Some(_)) => Duration::hours(1),
			// once a minute at a fixed second
			(_, None, Some(_)) => Duration::minutes(1),
			// a wildcard second needs second-level polling
			(_, _, None) => Duration::seconds(1),
		}
	}
}

impl fmt::Display for Clock {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		fn field(f: Option<u32>) -> String {
			f.map_or_else(|| "*".to_string(), |v| format!("{v:02}"))
		}
		write!(
			f,
			"{}:{}:{}",
			field(self.hour),
			field(self.minute),
			field(self.second)
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Error;
	use chrono::TimeZone;
	use pretty_assertions::assert_eq;

	fn dt(h: u32, m: u32, s: u32) -> DateTime<Local> {
		Local
			.with_ymd_and_hms(2021, 1, 6, h, m, s)
			.single()
			.expect("valid time")
	}

	#[test]
	fn test_rejects_out_of_range_fields() {
		assert_eq!(Clock::at(24, 0, 0).unwrap_err(), Error::InvalidHour(24));
		assert_eq!(Clock::at(0, 60, 0).unwrap_err(), Error::InvalidMinute(60));
		assert_eq!(Clock::at(0, 0, 60).unwrap_err(), Error::InvalidSecond(60));
		assert!(Clock::at(23, 59, 59).is_ok());
	}

	#[test]
	fn test_wildcards_broaden_the_match() {
		let c = Clock::new(Some(3), None, Some(5)).unwrap();
		assert!(c.is_matched(dt(3, 0, 5)));
		assert!(c.is_matched(dt(3, 42, 5)));
		assert!(!c.is_matched(dt(3, 42, 6)));
		assert!(!c.is_matched(dt(4, 42, 5)));
		assert!(Clock::any().is_matched(dt(17, 30, 9)));
	}

	#[test]
	fn test_next_is_zero_wait_at_exact_match() {
		let c = Clock::at(10, 30, 50).unwrap();
		let t = dt(10, 30, 50);
		assert_eq!(c.next(t), Some(t));

		let wild = Clock::new(None, Some(15), None).unwrap();
		let t = dt(4, 15, 33);
		assert_eq!(wild.next(t), Some(t));
	}

	#[test]
	fn test_next_rolls_forward_within_the_day() {
		let c = Clock::at(7, 0, 0).unwrap();
		assert_eq!(c.next(dt(6, 0, 0)), Some(dt(7, 0, 0)));

		// wildcard minute rolls to the next hour, minute resets to zero
		let c = Clock::new(None, None, Some(30)).unwrap();
		assert_eq!(c.next(dt(6, 59, 31)), Some(dt(7, 0, 30)));
	}

	#[test]
	fn test_next_wraps_to_the_following_day() {
		let c = Clock::new(Some(0), Some(0), None).unwrap();
		let next = c.next(dt(23, 59, 59)).unwrap();
		let expected = Local
			.with_ymd_and_hms(2021, 1, 7, 0, 0, 0)
			.single()
			.unwrap();
		assert_eq!(next, expected);
		assert_eq!(next - dt(23, 59, 59), Duration::seconds(1));
	}

	#[test]
	fn test_ticker_duration_table() {
		assert_eq!(
			Clock::at(0, 0, 0).unwrap().ticker_duration(),
			Duration::hours(24)
		);
		assert_eq!(
			Clock::at_minute(15).unwrap().ticker_duration(),
			Duration::hours(1)
		);
		assert_eq!(
			Clock::at_second(5).unwrap().ticker_duration(),
			Duration::minutes(1)
		);
		assert_eq!(
			Clock::new(Some(0), Some(0), None).unwrap().ticker_duration(),
			Duration::seconds(1)
		);
		assert_eq!(Clock::any().ticker_duration(), Duration::seconds(1));
	}

	#[test]
	fn test_display() {
		assert_eq!(Clock::at(7, 0, 0).unwrap().to_string(), "07:00:00");
		assert_eq!(Clock::at_minute(4).unwrap().to_string(), "*:04:00");
		assert_eq!(Clock::any().to_string(), "*:*:*");
	}
}
