//! A tick fan-out for external listeners, owned by the runtime rather than
//! hidden in process-global state.

use chrono::{DateTime, Local};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::{Arc, Mutex};

/// Broadcasts every tick instant to any number of subscribers.  Cloning
/// shares the subscriber list.
#[derive(Debug, Clone, Default)]
pub struct Broadcast {
	subscribers: Arc<Mutex<Vec<Sender<DateTime<Local>>>>>,
}

impl Broadcast {
	/// Register a new listener.  Dropping the receiver unsubscribes it.
	pub fn subscribe(&self) -> Receiver<DateTime<Local>> {
		let (tx, rx) = unbounded();
		self.subscribers.lock().unwrap().push(tx);
		rx
	}

	/// Deliver an instant to every live subscriber, pruning dead ones.
	pub fn publish(&self, t: DateTime<Local>) {
		self.subscribers
			.lock()
			.unwrap()
			.retain(|tx| tx.send(t).is_ok());
	}
}
