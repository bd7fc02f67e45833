//! For mocking purposes, access to the current time is directed through
//! this trait.

use chrono::{DateTime, Local};
use std::fmt;

pub(crate) trait Timekeeper: fmt::Debug + Send + Sync {
	/// Return the current time
	fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Default)]
pub(crate) struct Real;

impl Timekeeper for Real {
	fn now(&self) -> DateTime<Local> {
		Local::now()
	}
}
