//! Step-driven schedule variants: fixed-period ticks and stepped
//! time-of-day windows.

use crate::{
	schedule::{to_local, truncate, whole_seconds},
	Clock, Error, Result, Schedule,
};
use chrono::{DateTime, Duration, Local, NaiveTime, Timelike};
use std::fmt;

/// Matches every `step` after a start reference instant.
///
/// The start reference is set by [`Schedule::init`], which the runtime
/// invokes at start time so nested periodic schedules share a consistent
/// zero point.  Before initialization the schedule matches nothing.
#[derive(Debug, Clone, Copy)]
pub struct EverySchedule {
	step_secs: i64,
	start: Option<DateTime<Local>>,
}

impl EverySchedule {
	/// Construct from a step duration, which must be a whole number of
	/// seconds and at least one second long.
	pub fn new(step: Duration) -> Result<Self> {
		let step_secs = whole_seconds(step)?;
		Ok(Self {
			step_secs,
			start: None,
		})
	}

	/// Convenience constructor for whole-second periods.
	pub fn seconds(step: i64) -> Result<Self> {
		Self::new(Duration::seconds(step))
	}
}

impl Schedule for EverySchedule {
	fn is_matched(&self, t: DateTime<Local>) -> bool {
		let Some(start) = self.start else {
			return false;
		};
		let elapsed = (truncate(t) - start).num_seconds();
		elapsed >= 0 && elapsed % self.step_secs == 0
	}

	fn next(&self, t: DateTime<Local>) -> Option<DateTime<Local>> {
		let start = self.start?;
		let t = truncate(t);
		if t < start {
			return Some(start);
		}
		let remainder = (t - start).num_seconds() % self.step_secs;
		if remainder == 0 {
			Some(t)
		} else {
			Some(t + Duration::seconds(self.step_secs - remainder))
		}
	}

	fn ticker_duration(&self) -> Duration {
		Duration::seconds(self.step_secs)
	}

	/// Anchor one second past the (truncated) reference, so the instant of
	/// initialization itself does not count as a spurious first match.
	fn init(&mut self, start: DateTime<Local>) {
		self.start = Some(truncate(start) + Duration::seconds(1));
	}
}

impl fmt::Display for EverySchedule {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "every {}s", self.step_secs)
	}
}

/// Matches times of day within a `[start, end]` window (inclusive) whose
/// offset from the window start is a whole multiple of the step.  The
/// window never wraps across midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockRangeSchedule {
	start: NaiveTime,
	end: NaiveTime,
	step_secs: i64,
}

impl ClockRangeSchedule {
	/// Both bounds must be fully specified clocks with start ≤ end, and the
	/// step must be a whole number of seconds, at least one.
	pub fn new(start: Clock, end: Clock, step: Duration) -> Result<Self> {
		let step_secs = whole_seconds(step)?;
		let start = start.as_time().ok_or(Error::WildcardRangeBound)?;
		let end = end.as_time().ok_or(Error::WildcardRangeBound)?;
		if start > end {
			return Err(Error::InvertedRange);
		}
		Ok(Self {
			start,
			end,
			step_secs,
		})
	}

	fn bounds_secs(&self) -> (i64, i64) {
		(
			i64::from(self.start.num_seconds_from_midnight()),
			i64::from(self.end.num_seconds_from_midnight()),
		)
	}
}

impl Schedule for ClockRangeSchedule {
	fn is_matched(&self, t: DateTime<Local>) -> bool {
		let (s, e) = self.bounds_secs();
		let ct = i64::from(t.time().num_seconds_from_midnight());
		(s..=e).contains(&ct) && (ct - s) % self.step_secs == 0
	}

	/// Closed form: round up to the next step boundary inside today's
	/// window, otherwise the window opens again tomorrow.
	fn next(&self, t: DateTime<Local>) -> Option<DateTime<Local>> {
		let t = truncate(t);
		let (s, e) = self.bounds_secs();
		let ct = i64::from(t.time().num_seconds_from_midnight());
		let today = t.date_naive();
		if ct <= s {
			return Some(to_local(today.and_time(self.start)));
		}
		if ct <= e {
			let remainder = (ct - s) % self.step_secs;
			let candidate = if remainder == 0 {
				ct
			} else {
				ct + self.step_secs - remainder
			};
			if candidate <= e {
				let tod = NaiveTime::from_num_seconds_from_midnight_opt(
					u32::try_from(candidate).ok()?,
					0,
				)?;
				return Some(to_local(today.and_time(tod)));
			}
		}
		Some(to_local(today.succ_opt()?.and_time(self.start)))
	}

	fn ticker_duration(&self) -> Duration {
		Duration::seconds(self.step_secs)
	}
}

impl fmt::Display for ClockRangeSchedule {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(
			f,
			"{}..{} every {}s",
			self.start.format("%H:%M:%S"),
			self.end.format("%H:%M:%S"),
			self.step_secs
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use pretty_assertions::assert_eq;

	fn dt(h: u32, m: u32, s: u32) -> DateTime<Local> {
		Local
			.with_ymd_and_hms(2021, 1, 6, h, m, s)
			.single()
			.expect("valid time")
	}

	#[test]
	fn test_rejects_fractional_or_zero_steps() {
		assert_eq!(
			EverySchedule::new(Duration::milliseconds(500)).unwrap_err(),
			Error::InvalidStep
		);
		assert_eq!(
			EverySchedule::new(Duration::milliseconds(1500)).unwrap_err(),
			Error::InvalidStep
		);
		assert_eq!(EverySchedule::seconds(0).unwrap_err(), Error::InvalidStep);
		assert!(EverySchedule::seconds(1).is_ok());
	}

	#[test]
	fn test_uninitialized_matches_nothing() {
		let s = EverySchedule::seconds(5).unwrap();
		assert!(!s.is_matched(dt(12, 0, 0)));
		assert_eq!(s.next(dt(12, 0, 0)), None);
	}

	#[test]
	fn test_init_anchors_one_second_past() {
		let mut s = EverySchedule::seconds(5).unwrap();
		s.init(dt(12, 0, 0));
		assert!(!s.is_matched(dt(12, 0, 0)));
		assert!(s.is_matched(dt(12, 0, 1)));
		assert!(s.is_matched(dt(12, 0, 6)));
		assert!(!s.is_matched(dt(12, 0, 4)));
	}

	#[test]
	fn test_next_rounds_to_the_step() {
		let mut s = EverySchedule::seconds(10).unwrap();
		s.init(dt(12, 0, 0));
		// before the anchor, the anchor itself
		assert_eq!(s.next(dt(11, 0, 0)), Some(dt(12, 0, 1)));
		// on a multiple, zero wait
		assert_eq!(s.next(dt(12, 0, 11)), Some(dt(12, 0, 11)));
		// between multiples, round forward
		assert_eq!(s.next(dt(12, 0, 13)), Some(dt(12, 0, 21)));
	}

	#[test]
	fn test_range_constructor_validation() {
		let concrete = Clock::at(9, 30, 0).unwrap();
		let wild = Clock::at_minute(30).unwrap();
		assert_eq!(
			ClockRangeSchedule::new(wild, concrete, Duration::minutes(2)).unwrap_err(),
			Error::WildcardRangeBound
		);
		assert_eq!(
			ClockRangeSchedule::new(
				Clock::at(15, 0, 0).unwrap(),
				concrete,
				Duration::minutes(2)
			)
			.unwrap_err(),
			Error::InvertedRange
		);
		assert_eq!(
			ClockRangeSchedule::new(concrete, concrete, Duration::milliseconds(10)).unwrap_err(),
			Error::InvalidStep
		);
	}

	#[test]
	fn test_range_match_table() {
		let s = ClockRangeSchedule::new(
			Clock::at(9, 30, 0).unwrap(),
			Clock::at(15, 0, 0).unwrap(),
			Duration::minutes(2),
		)
		.unwrap();
		assert!(s.is_matched(dt(9, 30, 0)));
		assert!(s.is_matched(dt(13, 0, 0)));
		assert!(s.is_matched(dt(15, 0, 0)));
		// off the step boundary
		assert!(!s.is_matched(dt(9, 31, 0)));
		// outside the window
		assert!(!s.is_matched(dt(9, 0, 0)));
		assert!(!s.is_matched(dt(15, 2, 0)));
	}

	#[test]
	fn test_range_next() {
		let s = ClockRangeSchedule::new(
			Clock::at(9, 30, 0).unwrap(),
			Clock::at(15, 0, 0).unwrap(),
			Duration::minutes(2),
		)
		.unwrap();
		assert_eq!(s.next(dt(9, 31, 0)), Some(dt(9, 32, 0)));
		assert_eq!(s.next(dt(9, 32, 0)), Some(dt(9, 32, 0)));
		assert_eq!(s.next(dt(8, 0, 0)), Some(dt(9, 30, 0)));
		// past the window, tomorrow's opening
		let next = s.next(dt(16, 0, 0)).unwrap();
		let expected = Local
			.with_ymd_and_hms(2021, 1, 7, 9, 30, 0)
			.single()
			.unwrap();
		assert_eq!(next, expected);
	}

	#[test]
	fn test_single_instant_window() {
		let noon = Clock::at(12, 0, 0).unwrap();
		let s = ClockRangeSchedule::new(noon, noon, Duration::seconds(1)).unwrap();
		assert!(s.is_matched(dt(12, 0, 0)));
		assert!(!s.is_matched(dt(12, 0, 1)));
	}

	#[test]
	fn test_display() {
		let s = ClockRangeSchedule::new(
			Clock::at(9, 30, 0).unwrap(),
			Clock::at(15, 0, 0).unwrap(),
			Duration::minutes(2),
		)
		.unwrap();
		assert_eq!(s.to_string(), "09:30:00..15:00:00 every 120s");
		let mut e = EverySchedule::seconds(5).unwrap();
		e.init(dt(0, 0, 0));
		assert_eq!(e.to_string(), "every 5s");
	}
}
