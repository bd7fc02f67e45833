//! The scheduler runtime: a one-second tick loop over registered schedules.

use crate::{
	notify::Broadcast,
	time::{Real, Timekeeper},
	Error, Result, Schedule,
};
use chrono::{DateTime, Local};
use crossbeam_channel::{bounded, select, tick, Receiver, Sender};
use std::{
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc, Mutex,
	},
	thread,
	time::Duration as StdDuration,
};
use tracing::debug;

type Callback = Arc<dyn Fn(DateTime<Local>) + Send + Sync>;

/// Shared mutable state: the live schedule list and the work function.
/// The tick loop holds the lock while scanning; dispatched callbacks run
/// on their own threads, outside the lock.
struct Registry {
	schedules: Vec<Box<dyn Schedule>>,
	callback: Option<Callback>,
}

/// Evaluates registered schedules once a second and dispatches a callback
/// on the first match of each tick.
///
/// ```rust
/// # use chime::{Clock, Scheduler};
/// # fn main() -> chime::Result<()> {
/// let mut scheduler = Scheduler::new();
/// scheduler
/// 	.at(Clock::at(10, 30, 0)?)
/// 	.run(|t| println!("chimed at {t}"));
/// scheduler.start()?;
/// scheduler.stop();
/// # Ok(())
/// # }
/// ```
pub struct Scheduler {
	registry: Arc<Mutex<Registry>>,
	/// Liveness flag of the current run; replaced on every launch
	running: Arc<AtomicBool>,
	stop_tx: Option<Sender<()>>,
	ticks: Broadcast,
	/// Interface to current time
	clock: Arc<dyn Timekeeper>,
}

impl Scheduler {
	/// Instantiate a Scheduler
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Instantiate with mocked time
	#[cfg(test)]
	fn with_mock_time(clock: Arc<crate::time::mock::Mock>) -> Self {
		let mut ret = Self::new();
		ret.clock = clock;
		ret
	}

	/// Register a schedule.  Permitted while running; the tick loop sees
	/// the updated list on its next pass.
	pub fn at(&mut self, schedule: impl Schedule + 'static) -> &mut Self {
		self.registry
			.lock()
			.unwrap()
			.schedules
			.push(Box::new(schedule));
		self
	}

	/// Set the work function dispatched on schedule matches.
	pub fn run<F>(&mut self, callback: F) -> &mut Self
	where
		F: Fn(DateTime<Local>) + Send + Sync + 'static,
	{
		self.registry.lock().unwrap().callback = Some(Arc::new(callback));
		self
	}

	/// Empty the registered-schedule list.
	pub fn clear(&mut self) {
		debug!("Deleting ALL schedules");
		self.registry.lock().unwrap().schedules.clear();
	}

	/// Number of registered schedules.
	#[must_use]
	pub fn schedule_count(&self) -> usize {
		self.registry.lock().unwrap().schedules.len()
	}

	/// Whether a tick loop is currently live.
	#[must_use]
	pub fn is_running(&self) -> bool {
		self.running.load(Ordering::SeqCst)
	}

	/// Listen to every tick instant the loop evaluates, independent of
	/// schedule matches.  An external wake-up side-channel.
	#[must_use]
	pub fn subscribe(&self) -> Receiver<DateTime<Local>> {
		self.ticks.subscribe()
	}

	/// Begin ticking.  The scheduler can be started again after [`stop`].
	///
	/// # Errors
	///
	/// Returns an error if no work function is configured, no schedule is
	/// registered, or a tick loop is already live.
	///
	/// [`stop`]: Scheduler::stop
	pub fn start(&mut self) -> Result<()> {
		self.launch(None)
	}

	/// Set the work function and begin ticking in one step.
	///
	/// # Errors
	///
	/// Returns an error if no schedule is registered or a tick loop is
	/// already live.
	pub fn start_with<F>(&mut self, callback: F) -> Result<()>
	where
		F: Fn(DateTime<Local>) + Send + Sync + 'static,
	{
		self.run(callback);
		self.start()
	}

	/// Begin ticking until the first match, which fires the callback once
	/// and ends the loop.  The returned channel yields the matching
	/// instant; it disconnects without a message if the scheduler is
	/// stopped first.
	///
	/// # Errors
	///
	/// Same preconditions as [`start`](Scheduler::start).
	pub fn once(&mut self) -> Result<Receiver<DateTime<Local>>> {
		let (done_tx, done_rx) = bounded(1);
		self.launch(Some(done_tx))?;
		Ok(done_rx)
	}

	/// Invoke the work function with the current time, synchronously,
	/// bypassing the schedule check entirely.
	///
	/// # Errors
	///
	/// Returns an error if no work function is configured.
	pub fn immediately(&self) -> Result<()> {
		let now = self.clock.now();
		let registry = self.registry.lock().unwrap();
		let callback = registry.callback.as_ref().ok_or(Error::NoCallback)?;
		callback(now);
		Ok(())
	}

	/// Stop the tick loop.  In-flight callbacks are not awaited; they run
	/// to completion on their own threads.
	///
	/// # Panics
	///
	/// Calling `stop` on a scheduler that was never started is a
	/// programmer error and panics.
	pub fn stop(&mut self) {
		let stop_tx = self
			.stop_tx
			.take()
			.expect("stop called on a scheduler that was never started");
		self.running.store(false, Ordering::SeqCst);
		let _ = stop_tx.send(());
		debug!("Scheduler stopped");
	}

	/// Validate preconditions, run the init pass, and spawn the tick loop.
	/// With a `once` channel the loop ends after its first dispatch.
	fn launch(&mut self, once: Option<Sender<DateTime<Local>>>) -> Result<()> {
		{
			let registry = self.registry.lock().unwrap();
			if registry.callback.is_none() {
				return Err(Error::NoCallback);
			}
			if registry.schedules.is_empty() {
				return Err(Error::NoSchedule);
			}
		}
		if self.running.load(Ordering::SeqCst) {
			return Err(Error::AlreadyRunning);
		}
		// Each run owns a fresh liveness flag, so a previous loop still
		// winding down can only clear the flag of its own run.
		let running = Arc::new(AtomicBool::new(true));
		self.running = Arc::clone(&running);

		// Re-anchor periodic start references to now
		let now = self.clock.now();
		for schedule in &mut self.registry.lock().unwrap().schedules {
			schedule.init(now);
		}

		let (stop_tx, stop_rx) = bounded(1);
		self.stop_tx = Some(stop_tx);
		let registry = Arc::clone(&self.registry);
		let clock = Arc::clone(&self.clock);
		let ticks = self.ticks.clone();
		thread::spawn(move || {
			let ticker = tick(StdDuration::from_secs(1));
			'ticking: loop {
				select! {
					recv(ticker) -> _ => {
						let now = clock.now();
						ticks.publish(now);
						let registry = registry.lock().unwrap();
						for schedule in &registry.schedules {
							if schedule.is_matched(now) {
								debug!("Dispatching on match: {schedule}");
								if let Some(callback) = &registry.callback {
									let callback = Arc::clone(callback);
									// fire-and-forget, never awaited
									thread::spawn(move || callback(now));
								}
								if let Some(done) = &once {
									let _ = done.send(now);
									break 'ticking;
								}
								// first match wins, one dispatch per tick
								break;
							}
						}
					}
					recv(stop_rx) -> _ => break 'ticking,
				}
			}
			running.store(false, Ordering::SeqCst);
			debug!("Tick loop exited");
		});

		Ok(())
	}
}

impl Default for Scheduler {
	fn default() -> Self {
		Self {
			registry: Arc::new(Mutex::new(Registry {
				schedules: Vec::new(),
				callback: None,
			})),
			running: Arc::new(AtomicBool::new(false)),
			stop_tx: None,
			ticks: Broadcast::default(),
			clock: Arc::new(Real),
		}
	}
}
