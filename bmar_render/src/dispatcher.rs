use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use mutex_ext::{CondvarExt, ReactiveCondvar};
use resource_daemon::ResourceDaemon;

use crate::kind::RenderKind;

#[derive(Debug, Clone, Copy)]
pub enum RenderQuitReason {
	Cancelled,
	TimedOut,
}

struct Active {
	shutdown: ReactiveCondvar<bool>,
	daemon: ResourceDaemon<(), RenderQuitReason>,
}

/// Enforces §4.7's at-most-one-instance-per-kind invariant: launching a job
/// of a kind that's already running cancels the prior one first. There's no
/// OS-level force-kill for a renderer that ignores its shutdown signal —
/// the "hard-kill after 2s grace" in the spec is realized by every
/// renderer polling its shutdown flag at least every 100ms, same as the
/// scheduler and event workers.
#[derive(Default)]
pub struct Dispatcher {
	active: Mutex<HashMap<RenderKind, Active>>,
}

impl Dispatcher {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Launches `work` under `kind`. `work` receives a shutdown signal and
	/// must check it regularly; `timeout`, if given, flips that signal
	/// automatically once it elapses.
	pub fn launch<F>(&self, kind: RenderKind, timeout: Option<Duration>, work: F)
	where
		F: FnOnce(ReactiveCondvar<bool>) + Send + 'static,
	{
		self.cancel(kind);

		let shutdown = ReactiveCondvar::new(false);
		let daemon = ResourceDaemon::new({
			let shutdown = shutdown.clone();
			move |_quit_signal| {
				work(shutdown);
				Ok(())
			}
		});

		if let Some(timeout) = timeout {
			let watchdog = shutdown.clone();
			std::thread::spawn(move || {
				let timed_out = watchdog
					.wait_timeout_while_and_then_mut(|quitting| !*quitting, timeout, |_| ())
					.is_none();
				if timed_out {
					watchdog.with_lock_mut(|v| *v = true);
					watchdog.notify_all();
				}
			});
		}

		self.active.lock().unwrap().insert(kind, Active { shutdown, daemon });
	}

	/// Cancels the active job of `kind`, if any, and waits for it to exit.
	pub fn cancel(&self, kind: RenderKind) {
		if let Some(mut active) = self.active.lock().unwrap().remove(&kind) {
			active.shutdown.with_lock_mut(|v| *v = true);
			active.shutdown.notify_all();
			active.daemon.quit(RenderQuitReason::Cancelled);
		}
	}

	#[must_use]
	pub fn is_active(&self, kind: RenderKind) -> bool {
		self.active.lock().unwrap().contains_key(&kind)
	}

	pub fn cancel_all(&self) {
		let kinds: Vec<RenderKind> = self.active.lock().unwrap().keys().copied().collect();
		for kind in kinds {
			self.cancel(kind);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicBool, Ordering};
	use std::sync::Arc;

	#[test]
	fn launching_same_kind_cancels_prior() {
		let dispatcher = Dispatcher::new();
		let first_cancelled = Arc::new(AtomicBool::new(false));

		dispatcher.launch(RenderKind::Vu, None, {
			let first_cancelled = first_cancelled.clone();
			move |shutdown| {
				shutdown.wait_while_and_then_mut(|q| !*q, |_| ());
				first_cancelled.store(true, Ordering::SeqCst);
			}
		});
		dispatcher.launch(RenderKind::Vu, None, |shutdown| {
			shutdown.wait_while_and_then_mut(|q| !*q, |_| ());
		});

		assert!(first_cancelled.load(Ordering::SeqCst));
		assert!(dispatcher.is_active(RenderKind::Vu));
		dispatcher.cancel_all();
		assert!(!dispatcher.is_active(RenderKind::Vu));
	}
}
