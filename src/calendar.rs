//! Calendar-level schedule variants: fixed dates, ISO weeks, and weekdays.
//!
//! Each pairs a set of optional calendar discriminators with an optional
//! embedded [`Clock`] for sub-day matching.  An absent clock matches any
//! time of day on a matching date.

use crate::{
	schedule::{scan_days, to_local, truncate},
	Clock, Error, Result, Schedule,
};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, Weekday};
use std::fmt;

/// Any recurring pattern comes back within this window of its scan start:
/// even Feb 29 and ISO week 53 return inside nine years.  Fixed-year
/// patterns first jump the scan start to that year (see `scan_start`), so
/// the window always covers the whole year in question.
const SCAN_HORIZON_DAYS: u32 = 366 * 9;

fn fmt_field<T: fmt::Display>(field: Option<T>, width: usize) -> String {
	field.map_or_else(|| "*".to_string(), |v| format!("{v:0width$}"))
}

/// Shared `next` logic for the calendar variants: finish today with the
/// clock if the date already matches, otherwise anchor the clock at the
/// earliest matching future date.
fn resolve_next(
	t: DateTime<Local>,
	clock: Option<&Clock>,
	matches_date: impl Fn(NaiveDate) -> bool,
	next_date: impl Fn(NaiveDate) -> Option<NaiveDate>,
) -> Option<DateTime<Local>> {
	let t = truncate(t);
	let today = t.date_naive();
	if matches_date(today) {
		match clock {
			None => return Some(t),
			Some(c) => {
				let n = c.next(t)?;
				if matches_date(n.date_naive()) {
					return Some(n);
				}
				// the clock wrapped past midnight, fall through
			}
		}
	}
	let date = next_date(today.succ_opt()?)?;
	let tod = clock.map_or(NaiveTime::MIN, Clock::first_time_of_day);
	Some(to_local(date.and_time(tod)))
}

fn clock_matches(clock: Option<&Clock>, t: DateTime<Local>) -> bool {
	clock.map_or(true, |c| c.matches_time(t.time()))
}

fn clock_ticker(clock: Option<&Clock>) -> Duration {
	clock.map_or_else(|| Duration::hours(24), Clock::ticker_duration)
}

/// Matches a calendar date: year, month and day each optionally wildcarded.
///
/// A fully specified date denotes a single day (or, with a fully specified
/// clock, a single instant) and never recurs: once it has passed, `next`
/// returns `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSchedule {
	year: Option<i32>,
	month: Option<u32>,
	day: Option<u32>,
	clock: Option<Clock>,
}

impl DateSchedule {
	pub fn new(
		year: Option<i32>,
		month: Option<u32>,
		day: Option<u32>,
		clock: Option<Clock>,
	) -> Result<Self> {
		if let Some(m) = month {
			if !(1..=12).contains(&m) {
				return Err(Error::InvalidMonth(m));
			}
		}
		if let Some(d) = day {
			if !(1..=31).contains(&d) {
				return Err(Error::InvalidDay(d));
			}
		}
		Ok(Self {
			year,
			month,
			day,
			clock,
		})
	}

	/// A schedule matching exactly one instant, the given one truncated to
	/// the second.
	#[must_use]
	pub fn from_datetime(t: DateTime<Local>) -> Self {
		let t = truncate(t);
		Self {
			year: Some(t.year()),
			month: Some(t.month()),
			day: Some(t.day()),
			clock: Some(Clock::from_time(t.time())),
		}
	}

	fn matches_date(&self, d: NaiveDate) -> bool {
		self.year.map_or(true, |y| y == d.year())
			&& self.month.map_or(true, |m| m == d.month())
			&& self.day.map_or(true, |dd| dd == d.day())
	}

	/// The earliest date at or after `after` satisfying the pattern.
	/// Enumerates candidate (year, month, day) triples in ascending order;
	/// impossible combinations (Feb 30) simply never materialize.
	fn next_date(&self, after: NaiveDate) -> Option<NaiveDate> {
		let last_year = self.year.unwrap_or(after.year() + 8);
		for year in self.year.unwrap_or(after.year())..=last_year {
			for month in self.month.map_or(1..=12, |m| m..=m) {
				for day in self.day.map_or(1..=31, |d| d..=d) {
					if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
						if date >= after {
							return Some(date);
						}
					}
				}
			}
		}
		None
	}
}

impl Schedule for DateSchedule {
	fn is_matched(&self, t: DateTime<Local>) -> bool {
		self.matches_date(t.date_naive()) && clock_matches(self.clock.as_ref(), t)
	}

	fn next(&self, t: DateTime<Local>) -> Option<DateTime<Local>> {
		resolve_next(
			t,
			self.clock.as_ref(),
			|d| self.matches_date(d),
			|from| self.next_date(from),
		)
	}

	fn ticker_duration(&self) -> Duration {
		clock_ticker(self.clock.as_ref())
	}
}

impl fmt::Display for DateSchedule {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(
			f,
			"{}-{}-{}",
			fmt_field(self.year, 4),
			fmt_field(self.month, 2),
			fmt_field(self.day, 2)
		)?;
		if let Some(c) = &self.clock {
			write!(f, " {c}")?;
		}
		Ok(())
	}
}

/// Matches by ISO 8601 week date: ISO year, week number and weekday, each
/// optionally wildcarded.  ISO years do not align with calendar years at
/// the boundaries, so matching goes through [`Datelike::iso_week`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsoWeekSchedule {
	year: Option<i32>,
	week: Option<u32>,
	weekday: Option<Weekday>,
	clock: Option<Clock>,
}

impl IsoWeekSchedule {
	pub fn new(
		year: Option<i32>,
		week: Option<u32>,
		weekday: Option<Weekday>,
		clock: Option<Clock>,
	) -> Result<Self> {
		if let Some(w) = week {
			if !(1..=53).contains(&w) {
				return Err(Error::InvalidWeek(w));
			}
		}
		Ok(Self {
			year,
			week,
			weekday,
			clock,
		})
	}

	fn matches_date(&self, d: NaiveDate) -> bool {
		let iso = d.iso_week();
		self.year.map_or(true, |y| y == iso.year())
			&& self.week.map_or(true, |w| w == iso.week())
			&& self.weekday.map_or(true, |wd| wd == d.weekday())
	}

	/// Where the day scan begins.  A fixed ISO year ahead of `from` starts
	/// at the year's earliest possible day (Dec 29 of the calendar year
	/// before); one already behind can never match again.
	fn scan_start(&self, from: NaiveDate) -> Option<NaiveDate> {
		match self.year {
			Some(y) if y < from.iso_week().year() => None,
			Some(y) if y > from.iso_week().year() => {
				NaiveDate::from_ymd_opt(y - 1, 12, 29).map(|d| d.max(from))
			}
			_ => Some(from),
		}
	}
}

impl Schedule for IsoWeekSchedule {
	fn is_matched(&self, t: DateTime<Local>) -> bool {
		self.matches_date(t.date_naive()) && clock_matches(self.clock.as_ref(), t)
	}

	fn next(&self, t: DateTime<Local>) -> Option<DateTime<Local>> {
		resolve_next(
			t,
			self.clock.as_ref(),
			|d| self.matches_date(d),
			|from| {
				let start = self.scan_start(from)?;
				scan_days(start, SCAN_HORIZON_DAYS, |d| self.matches_date(d))
			},
		)
	}

	fn ticker_duration(&self) -> Duration {
		clock_ticker(self.clock.as_ref())
	}
}

impl fmt::Display for IsoWeekSchedule {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(
			f,
			"{}-W{}-{}",
			fmt_field(self.year, 4),
			fmt_field(self.week, 2),
			fmt_field(self.weekday, 0)
		)?;
		if let Some(c) = &self.clock {
			write!(f, " {c}")?;
		}
		Ok(())
	}
}

/// Matches a weekday, optionally pinned to a year and/or month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdaySchedule {
	year: Option<i32>,
	month: Option<u32>,
	weekday: Option<Weekday>,
	clock: Option<Clock>,
}

impl WeekdaySchedule {
	pub fn new(
		year: Option<i32>,
		month: Option<u32>,
		weekday: Option<Weekday>,
		clock: Option<Clock>,
	) -> Result<Self> {
		if let Some(m) = month {
			if !(1..=12).contains(&m) {
				return Err(Error::InvalidMonth(m));
			}
		}
		Ok(Self {
			year,
			month,
			weekday,
			clock,
		})
	}

	/// Every occurrence of the given weekday, any month, at the given clock.
	pub fn weekly(weekday: Weekday, clock: Clock) -> Self {
		Self {
			year: None,
			month: None,
			weekday: Some(weekday),
			clock: Some(clock),
		}
	}

	fn matches_date(&self, d: NaiveDate) -> bool {
		self.year.map_or(true, |y| y == d.year())
			&& self.month.map_or(true, |m| m == d.month())
			&& self.weekday.map_or(true, |wd| wd == d.weekday())
	}

	/// Where the day scan begins: jump straight to a fixed future year,
	/// give up on a fixed past one.
	fn scan_start(&self, from: NaiveDate) -> Option<NaiveDate> {
		match self.year {
			Some(y) if y < from.year() => None,
			Some(y) if y > from.year() => NaiveDate::from_ymd_opt(y, 1, 1),
			_ => Some(from),
		}
	}
}

impl Schedule for WeekdaySchedule {
	fn is_matched(&self, t: DateTime<Local>) -> bool {
		self.matches_date(t.date_naive()) && clock_matches(self.clock.as_ref(), t)
	}

	fn next(&self, t: DateTime<Local>) -> Option<DateTime<Local>> {
		resolve_next(
			t,
			self.clock.as_ref(),
			|d| self.matches_date(d),
			|from| {
				let start = self.scan_start(from)?;
				scan_days(start, SCAN_HORIZON_DAYS, |d| self.matches_date(d))
			},
		)
	}

	fn ticker_duration(&self) -> Duration {
		clock_ticker(self.clock.as_ref())
	}
}

impl fmt::Display for WeekdaySchedule {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(
			f,
			"{}-{} {}",
			fmt_field(self.year, 4),
			fmt_field(self.month, 2),
			fmt_field(self.weekday, 0)
		)?;
		if let Some(c) = &self.clock {
			write!(f, " {c}")?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use pretty_assertions::assert_eq;

	fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
		Local
			.with_ymd_and_hms(y, mo, d, h, mi, s)
			.single()
			.expect("valid time")
	}

	#[test]
	fn test_rejects_bad_calendar_fields() {
		assert_eq!(
			DateSchedule::new(None, Some(13), None, None).unwrap_err(),
			Error::InvalidMonth(13)
		);
		assert_eq!(
			DateSchedule::new(None, None, Some(32), None).unwrap_err(),
			Error::InvalidDay(32)
		);
		assert_eq!(
			IsoWeekSchedule::new(None, Some(54), None, None).unwrap_err(),
			Error::InvalidWeek(54)
		);
	}

	#[test]
	fn test_past_date_never_matches_again() {
		let s = DateSchedule::new(Some(2020), Some(1), Some(1), None).unwrap();
		assert_eq!(s.next(dt(2021, 1, 6, 10, 0, 0)), None);
	}

	#[test]
	fn test_wildcard_year_recurs() {
		let xmas = DateSchedule::new(None, Some(12), Some(25), None).unwrap();
		assert_eq!(
			xmas.next(dt(2024, 12, 26, 0, 0, 0)),
			Some(dt(2025, 12, 25, 0, 0, 0))
		);

		let leap = DateSchedule::new(None, Some(2), Some(29), None).unwrap();
		assert_eq!(
			leap.next(dt(2025, 3, 1, 0, 0, 0)),
			Some(dt(2028, 2, 29, 0, 0, 0))
		);
	}

	#[test]
	fn test_same_day_clock_anchoring() {
		let clock = Clock::at(15, 0, 0).unwrap();
		let s = DateSchedule::new(Some(2021), Some(1), Some(6), Some(clock)).unwrap();
		assert_eq!(
			s.next(dt(2021, 1, 6, 10, 0, 0)),
			Some(dt(2021, 1, 6, 15, 0, 0))
		);
		// clock already passed on the one matching day
		assert_eq!(s.next(dt(2021, 1, 6, 16, 0, 0)), None);
	}

	#[test]
	fn test_from_datetime_single_instant() {
		let t = dt(2021, 1, 6, 22, 38, 10);
		let s = DateSchedule::from_datetime(t);
		assert!(s.is_matched(t));
		assert_eq!(s.next(t), Some(t));
		assert_eq!(s.next(t + Duration::seconds(1)), None);
	}

	#[test]
	fn test_iso_week_boundary() {
		// 2020 is a long ISO year: 2020-12-31 is Thursday of week 53
		let s = IsoWeekSchedule::new(Some(2020), Some(53), Some(Weekday::Thu), None).unwrap();
		assert!(s.is_matched(dt(2020, 12, 31, 12, 0, 0)));
		assert!(!s.is_matched(dt(2020, 12, 30, 12, 0, 0)));
		assert_eq!(
			s.next(dt(2020, 6, 1, 0, 0, 0)),
			Some(dt(2020, 12, 31, 0, 0, 0))
		);
		// 2021-01-01 still belongs to ISO 2020, week 53
		let tail = IsoWeekSchedule::new(Some(2020), Some(53), None, None).unwrap();
		assert!(tail.is_matched(dt(2021, 1, 1, 8, 0, 0)));
	}

	#[test]
	fn test_weekday_search() {
		let s = WeekdaySchedule::weekly(Weekday::Fri, Clock::at(9, 30, 0).unwrap());
		// 2021-01-06 is a Wednesday
		assert_eq!(
			s.next(dt(2021, 1, 6, 10, 0, 0)),
			Some(dt(2021, 1, 8, 9, 30, 0))
		);
		// zero wait at the exact instant
		let hit = dt(2021, 1, 8, 9, 30, 0);
		assert_eq!(s.next(hit), Some(hit));
		// once 09:30 Friday has passed, the following Friday
		assert_eq!(
			s.next(dt(2021, 1, 8, 10, 0, 0)),
			Some(dt(2021, 1, 15, 9, 30, 0))
		);
	}

	#[test]
	fn test_fixed_year_far_ahead_is_reachable() {
		// 2050-01-01 is a Saturday, so ISO 2050-W01 runs Mon Jan 3 .. Sun Jan 9
		let iso = IsoWeekSchedule::new(Some(2050), Some(1), Some(Weekday::Thu), None).unwrap();
		assert_eq!(
			iso.next(dt(2026, 8, 29, 0, 0, 0)),
			Some(dt(2050, 1, 6, 0, 0, 0))
		);

		let wd = WeekdaySchedule::new(Some(2050), Some(1), Some(Weekday::Mon), None).unwrap();
		assert_eq!(
			wd.next(dt(2026, 8, 29, 0, 0, 0)),
			Some(dt(2050, 1, 3, 0, 0, 0))
		);

		// a fixed past year stays "never"
		let gone = IsoWeekSchedule::new(Some(2020), Some(1), None, None).unwrap();
		assert_eq!(gone.next(dt(2026, 8, 29, 0, 0, 0)), None);
		let past = WeekdaySchedule::new(Some(2020), None, Some(Weekday::Mon), None).unwrap();
		assert_eq!(past.next(dt(2026, 8, 29, 0, 0, 0)), None);
	}

	#[test]
	fn test_weekday_pinned_to_month() {
		let s = WeekdaySchedule::new(None, Some(2), Some(Weekday::Mon), None).unwrap();
		assert_eq!(
			s.next(dt(2021, 3, 1, 0, 0, 0)),
			Some(dt(2022, 2, 7, 0, 0, 0))
		);
	}

	#[test]
	fn test_ticker_delegates_to_clock() {
		let fixed = DateSchedule::new(None, None, None, Some(Clock::at(1, 2, 3).unwrap())).unwrap();
		assert_eq!(fixed.ticker_duration(), Duration::hours(24));
		let bare = DateSchedule::new(None, None, None, None).unwrap();
		assert_eq!(bare.ticker_duration(), Duration::hours(24));
	}

	#[test]
	fn test_display() {
		let s = DateSchedule::new(Some(2006), Some(1), Some(2), Some(Clock::at(15, 4, 5).unwrap()))
			.unwrap();
		assert_eq!(s.to_string(), "2006-01-02 15:04:05");
		let w = WeekdaySchedule::weekly(Weekday::Fri, Clock::at(9, 30, 0).unwrap());
		assert_eq!(w.to_string(), "*-* Fri 09:30:00");
	}
}
