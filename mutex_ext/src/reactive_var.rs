use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

use crate::CondvarExt;

/// A value shared across threads that can be waited on: readers block until
/// a predicate over the value becomes false, writers wake every waiter.
///
/// Used as the cancellation/shutdown signal threaded through workers: the
/// supervisor flips the value and every worker's interruptible sleep wakes
/// immediately instead of waiting out its full interval.
#[derive(Debug)]
pub struct ReactiveCondvar<T>(Arc<(Mutex<T>, Condvar)>);

impl<T> Clone for ReactiveCondvar<T> {
	fn clone(&self) -> Self {
		Self(self.0.clone())
	}
}

impl<T> ReactiveCondvar<T> {
	pub fn new(initial_value: T) -> Self {
		Self(Arc::new((Mutex::new(initial_value), Condvar::default())))
	}

	pub fn notify_all(&self) {
		self.0 .1.notify_all();
	}

	pub fn notify_one(&self) {
		self.0 .1.notify_one();
	}

	#[must_use]
	pub fn mutex(&self) -> &Mutex<T> {
		&self.0 .0
	}

	#[must_use]
	pub fn condvar(&self) -> &Condvar {
		&self.0 .1
	}
}

impl<'a, T> CondvarExt<'a, T, MutexGuard<'a, T>> for ReactiveCondvar<T> {
	fn try_with_lock<O, Op: FnOnce(&T) -> O>(&'a self, op: Op) -> Option<O> {
		self.0.try_with_lock(op)
	}

	fn try_with_lock_mut<O, Op: FnOnce(&mut T) -> O>(&'a self, op: Op) -> Option<O> {
		self.0.try_with_lock_mut(op)
	}

	fn with_lock<O, Op: FnOnce(&T) -> O>(&'a self, op: Op) -> O {
		self.0.with_lock(op)
	}

	fn with_lock_mut<O, Op: FnOnce(&mut T) -> O>(&'a self, op: Op) -> O {
		self.0.with_lock_mut(op)
	}

	fn wait_while_and_then<O, C: FnMut(&mut T) -> bool, Op: FnOnce(&T) -> O>(
		&'a self,
		condition: C,
		op: Op,
	) -> O {
		self.0.wait_while_and_then(condition, op)
	}

	fn wait_while_and_then_mut<O, C: FnMut(&mut T) -> bool, Op: FnOnce(&mut T) -> O>(
		&'a self,
		condition: C,
		op: Op,
	) -> O {
		self.0.wait_while_and_then_mut(condition, op)
	}

	fn wait_timeout_while_and_then<O, C: FnMut(&mut T) -> bool, Op: FnOnce(&T) -> O>(
		&'a self,
		condition: C,
		timeout: Duration,
		op: Op,
	) -> Option<O> {
		self.0.wait_timeout_while_and_then(condition, timeout, op)
	}

	fn wait_timeout_while_and_then_mut<O, C: FnMut(&mut T) -> bool, Op: FnOnce(&mut T) -> O>(
		&'a self,
		condition: C,
		timeout: Duration,
		op: Op,
	) -> Option<O> {
		self.0
			.wait_timeout_while_and_then_mut(condition, timeout, op)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::thread;

	#[test]
	fn test_wait_timeout_elapses_without_notify() {
		let flag = ReactiveCondvar::new(false);
		let woke =
			flag.wait_timeout_while_and_then_mut(|v| !*v, Duration::from_millis(20), |_| "woke");
		assert_eq!(woke, None);
	}

	#[test]
	fn test_notify_wakes_waiter() {
		let flag = ReactiveCondvar::new(false);
		let waiter = flag.clone();
		let handle = thread::spawn(move || {
			waiter.wait_timeout_while_and_then_mut(|v| !*v, Duration::from_secs(5), |v| *v)
		});
		thread::sleep(Duration::from_millis(20));
		flag.with_lock_mut(|v| *v = true);
		assert_eq!(handle.join().unwrap(), Some(true));
	}
}
