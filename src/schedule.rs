//! The `Schedule` trait is the capability set every matcher implements.

use crate::{Error, Result};
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike};
use std::fmt;

/// Any matcher over instants.  Implementors interoperate with the
/// combinators and the [`Scheduler`](crate::Scheduler).
pub trait Schedule: fmt::Display + Send {
	/// True if `t` satisfies this schedule's predicate.
	fn is_matched(&self, t: DateTime<Local>) -> bool;

	/// The earliest instant at or after `t` satisfying this schedule, or
	/// `None` if it can never match again.
	fn next(&self, t: DateTime<Local>) -> Option<DateTime<Local>>;

	/// The coarsest polling interval that cannot skip a match.
	fn ticker_duration(&self) -> Duration;

	/// One-time initialization pass, invoked by the runtime before the
	/// first tick.  Anchors periodic schedules to a shared start reference;
	/// combinators recurse into their children.  Default is a no-op.
	fn init(&mut self, _start: DateTime<Local>) {}
}

impl fmt::Debug for dyn Schedule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Display::fmt(self, f)
	}
}

impl Schedule for Box<dyn Schedule> {
	fn is_matched(&self, t: DateTime<Local>) -> bool {
		(**self).is_matched(t)
	}

	fn next(&self, t: DateTime<Local>) -> Option<DateTime<Local>> {
		(**self).next(t)
	}

	fn ticker_duration(&self) -> Duration {
		(**self).ticker_duration()
	}

	fn init(&mut self, start: DateTime<Local>) {
		(**self).init(start);
	}
}

/// Drop sub-second precision; the whole crate works at one-second granularity.
pub(crate) fn truncate(t: DateTime<Local>) -> DateTime<Local> {
	// with_nanosecond(0) is always representable
	t.with_nanosecond(0).unwrap_or(t)
}

/// Resolve a naive local datetime to a zoned one.  Ambiguous instants (the
/// fall-back transition) take the earlier offset; instants inside a
/// spring-forward gap slide past the missing hour.
pub(crate) fn to_local(naive: NaiveDateTime) -> DateTime<Local> {
	match Local.from_local_datetime(&naive).earliest() {
		Some(t) => t,
		None => to_local(naive + Duration::hours(1)),
	}
}

/// Validate that a step duration is a whole number of seconds, at least one.
pub(crate) fn whole_seconds(step: Duration) -> Result<i64> {
	if step < Duration::seconds(1) || step.subsec_nanos() != 0 {
		return Err(Error::InvalidStep);
	}
	Ok(step.num_seconds())
}

/// Walk forward day by day from `from` (inclusive), returning the first date
/// accepted by `pred` within `horizon` days.  The calendar variants use this
/// for patterns with no closed-form next date.
pub(crate) fn scan_days(
	from: NaiveDate,
	horizon: u32,
	pred: impl Fn(NaiveDate) -> bool,
) -> Option<NaiveDate> {
	let mut date = from;
	for _ in 0..horizon {
		if pred(date) {
			return Some(date);
		}
		date = date.succ_opt()?;
	}
	None
}
