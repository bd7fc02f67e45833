//! This module defines the error type and Result alias.

use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum Error {
	#[error("Invalid hour ({0} is not between 0 and 23)")]
	InvalidHour(u32),
	#[error("Invalid minute ({0} is not between 0 and 59)")]
	InvalidMinute(u32),
	#[error("Invalid second ({0} is not between 0 and 59)")]
	InvalidSecond(u32),
	#[error("Invalid month ({0} is not between 1 and 12)")]
	InvalidMonth(u32),
	#[error("Invalid day of month ({0} is not between 1 and 31)")]
	InvalidDay(u32),
	#[error("Invalid ISO week ({0} is not between 1 and 53)")]
	InvalidWeek(u32),
	#[error("Step must be a whole number of seconds, at least one second long")]
	InvalidStep,
	#[error("Range bounds must be fully specified clocks, no wildcards")]
	WildcardRangeBound,
	#[error("Range start is later than range end")]
	InvertedRange,
	#[error("No work function configured")]
	NoCallback,
	#[error("No schedule registered")]
	NoSchedule,
	#[error("Scheduler is already running")]
	AlreadyRunning,
	#[error("Unrecognized schedule format: {0:?}")]
	Unparseable(String),
}

/// Construct a new hour-range error
pub(crate) fn invalid_hour_error(hour: u32) -> Error {
	Error::InvalidHour(hour)
}

/// Construct a new minute-range error
pub(crate) fn invalid_minute_error(minute: u32) -> Error {
	Error::InvalidMinute(minute)
}

/// Construct a new second-range error
pub(crate) fn invalid_second_error(second: u32) -> Error {
	Error::InvalidSecond(second)
}

pub type Result<T> = std::result::Result<T, Error>;
