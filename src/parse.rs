//! String-based schedule parsing for clock and date-time literals.

use crate::{Clock, DateSchedule, Error, Result, Schedule};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

// Literal grammars are only compiled once
static CLOCK_RE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$").unwrap());
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(\d{4})-(\d{2})-(\d{2})(?:[ T](\d{1,2}):(\d{2})(?::(\d{2}))?)?$").unwrap()
});

/// Parse a schedule from either a clock literal (`"15:04"`, `"15:04:05"`)
/// or a date-time literal (`"2006-01-02"`, `"2006-01-02 15:04:05"`).
///
/// A clock literal yields a daily [`Clock`]; a date-time literal yields a
/// fully specified single-shot [`DateSchedule`] (missing time parts default
/// to midnight).  Field ranges are validated through the normal
/// constructors, so out-of-range input surfaces the same typed errors.
///
/// ```rust
/// # use chime::parse_schedule;
/// # fn main() -> chime::Result<()> {
/// let daily = parse_schedule("7:00")?;
/// assert_eq!(daily.to_string(), "07:00:00");
/// # Ok(())
/// # }
/// ```
pub fn parse_schedule(input: &str) -> Result<Box<dyn Schedule>> {
	let input = input.trim();

	if let Some(caps) = CLOCK_RE.captures(input) {
		// unwraps are safe, the regex only captures digits
		let hour = caps[1].parse().unwrap();
		let minute = caps[2].parse().unwrap();
		let second = caps.get(3).map_or(0, |m| m.as_str().parse().unwrap());
		return Ok(Box::new(Clock::at(hour, minute, second)?));
	}

	if let Some(caps) = DATE_RE.captures(input) {
		let year: i32 = caps[1].parse().unwrap();
		let month: u32 = caps[2].parse().unwrap();
		let day: u32 = caps[3].parse().unwrap();
		let hour = caps.get(4).map_or(0, |m| m.as_str().parse().unwrap());
		let minute = caps.get(5).map_or(0, |m| m.as_str().parse().unwrap());
		let second = caps.get(6).map_or(0, |m| m.as_str().parse().unwrap());
		let clock = Clock::at(hour, minute, second)?;
		let schedule = DateSchedule::new(Some(year), Some(month), Some(day), Some(clock))?;
		// ranges are fine but the date may still not exist (Feb 30)
		if NaiveDate::from_ymd_opt(year, month, day).is_none() {
			return Err(Error::Unparseable(input.to_string()));
		}
		return Ok(Box::new(schedule));
	}

	Err(Error::Unparseable(input.to_string()))
}
