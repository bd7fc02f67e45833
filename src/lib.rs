//! # chime
//!
//! `chime` provides composable wall-clock schedules and a single-process
//! scheduler that evaluates them at one-second resolution.
//!
//! A schedule is anything that can answer "does this instant match" and
//! "when is the next match": a time-of-day [`Clock`] with wildcardable
//! fields, calendar variants ([`DateSchedule`], [`IsoWeekSchedule`],
//! [`WeekdaySchedule`]), a fixed-period [`EverySchedule`], a stepped
//! [`ClockRangeSchedule`] window, and the [`MultiSchedule`] (OR) and
//! [`ConditionSchedule`] (AND) combinators over all of them.
//!
//! Build a schedule and hand it to a [`Scheduler`]:
//! ```rust
//! # use chime::{parse_schedule, ConditionSchedule, Scheduler, WeekdaySchedule, Clock};
//! # use chrono::Weekday;
//! # fn main() -> chime::Result<()> {
//! // every Friday at 09:30
//! let mut friday = ConditionSchedule::default();
//! friday
//! 	.push(WeekdaySchedule::weekly(Weekday::Fri, Clock::at(9, 30, 0)?))
//! 	.push(parse_schedule("9:30")?);
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.at(friday).run(|t| println!("it's {t}"));
//! scheduler.start()?;
//! // ... the tick loop runs until stopped
//! scheduler.stop();
//! # Ok(())
//! # }
//! ```
//!
//! Schedules also stand alone for planning:
//! ```rust
//! # use chime::{Clock, Schedule};
//! # use chrono::Local;
//! # fn main() -> chime::Result<()> {
//! let seven = Clock::at(7, 0, 0)?;
//! let wait = seven.next(Local::now());
//! assert!(wait.is_some()); // a clock always matches again within 24h
//! # Ok(())
//! # }
//! ```
//!
//! Everything works in local wall-clock time at whole-second granularity.

#![warn(clippy::pedantic)]

mod calendar;
mod clock;
mod combine;
mod error;
mod notify;
mod parse;
mod periodic;
mod schedule;
mod scheduler;
mod time;

pub use calendar::{DateSchedule, IsoWeekSchedule, WeekdaySchedule};
pub use clock::Clock;
pub use combine::{ConditionSchedule, MultiSchedule};
pub use error::{Error, Result};
pub use notify::Broadcast;
pub use parse::parse_schedule;
pub use periodic::{ClockRangeSchedule, EverySchedule};
pub use schedule::Schedule;
pub use scheduler::Scheduler;
