//! Schedule combinators: logical OR ([`MultiSchedule`]) and logical AND
//! ([`ConditionSchedule`]) over child schedules, themselves schedules.

use crate::Schedule;
use chrono::{DateTime, Duration, Local};
use std::fmt;

/// Refinement cap for the AND combinator's fixpoint search.
const MAX_REFINE_STEPS: usize = 10_000;

fn gcd(a: i64, b: i64) -> i64 {
	if b == 0 {
		a
	} else {
		gcd(b, a % b)
	}
}

/// GCD across the children's ticker durations, in seconds.  Zero children
/// degrade to one second.
fn ticker_gcd(children: &[Box<dyn Schedule>]) -> i64 {
	let secs = children
		.iter()
		.fold(0, |acc, c| gcd(acc, c.ticker_duration().num_seconds()));
	if secs == 0 {
		1
	} else {
		secs
	}
}

/// OR-combined schedules still need to catch each child's offset triggers,
/// so a unanimous coarse granularity is sampled one level finer.
fn downgrade(secs: i64) -> i64 {
	match secs {
		86_400 => 3_600,
		3_600 => 60,
		60 => 1,
		other => other,
	}
}

fn fmt_children(f: &mut fmt::Formatter, children: &[Box<dyn Schedule>]) -> fmt::Result {
	for (i, child) in children.iter().enumerate() {
		if i > 0 {
			write!(f, "; ")?;
		}
		write!(f, "{child}")?;
	}
	Ok(())
}

/// Logical OR: matches when any child matches.
///
/// An empty combinator matches nothing; children can be appended after
/// construction with [`push`](MultiSchedule::push).
#[derive(Default)]
pub struct MultiSchedule {
	schedules: Vec<Box<dyn Schedule>>,
}

impl MultiSchedule {
	#[must_use]
	pub fn new(schedules: Vec<Box<dyn Schedule>>) -> Self {
		Self { schedules }
	}

	pub fn push(&mut self, schedule: impl Schedule + 'static) -> &mut Self {
		self.schedules.push(Box::new(schedule));
		self
	}
}

impl Schedule for MultiSchedule {
	fn is_matched(&self, t: DateTime<Local>) -> bool {
		self.schedules.iter().any(|s| s.is_matched(t))
	}

	/// Earliest over the children; a child's "never" sentinel sorts after
	/// every real time, so exhausted children simply drop out.
	fn next(&self, t: DateTime<Local>) -> Option<DateTime<Local>> {
		self.schedules.iter().filter_map(|s| s.next(t)).min()
	}

	fn ticker_duration(&self) -> Duration {
		Duration::seconds(downgrade(ticker_gcd(&self.schedules)))
	}

	fn init(&mut self, start: DateTime<Local>) {
		for s in &mut self.schedules {
			s.init(start);
		}
	}
}

impl fmt::Display for MultiSchedule {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		// a single child prints bare
		if self.schedules.len() == 1 {
			return write!(f, "{}", self.schedules[0]);
		}
		write!(f, "MultiSchedule: ")?;
		fmt_children(f, &self.schedules)
	}
}

/// Logical AND: matches when every child matches.  Empty matches nothing.
#[derive(Default)]
pub struct ConditionSchedule {
	schedules: Vec<Box<dyn Schedule>>,
}

impl ConditionSchedule {
	#[must_use]
	pub fn new(schedules: Vec<Box<dyn Schedule>>) -> Self {
		Self { schedules }
	}

	pub fn push(&mut self, schedule: impl Schedule + 'static) -> &mut Self {
		self.schedules.push(Box::new(schedule));
		self
	}
}

impl Schedule for ConditionSchedule {
	fn is_matched(&self, t: DateTime<Local>) -> bool {
		!self.schedules.is_empty() && self.schedules.iter().all(|s| s.is_matched(t))
	}

	/// There is no closed form for an intersection, so refine towards a
	/// fixpoint: take the latest of the children's next occurrences and
	/// re-query from there until every child agrees, verifying the result
	/// with `is_matched` rather than trusting a single truncation step.
	fn next(&self, t: DateTime<Local>) -> Option<DateTime<Local>> {
		match self.schedules.len() {
			0 => None,
			1 => self.schedules[0].next(t),
			_ => {
				let mut candidate = t;
				for _ in 0..MAX_REFINE_STEPS {
					let mut latest = None;
					for s in &self.schedules {
						let n = s.next(candidate)?;
						if latest.map_or(true, |l| n > l) {
							latest = Some(n);
						}
					}
					let latest = latest?;
					if self.is_matched(latest) {
						return Some(latest);
					}
					candidate = latest;
				}
				None
			}
		}
	}

	fn ticker_duration(&self) -> Duration {
		Duration::seconds(ticker_gcd(&self.schedules))
	}

	fn init(&mut self, start: DateTime<Local>) {
		for s in &mut self.schedules {
			s.init(start);
		}
	}
}

impl fmt::Display for ConditionSchedule {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "ConditionSchedule: ")?;
		fmt_children(f, &self.schedules)
	}
}
