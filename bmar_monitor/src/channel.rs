use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// The monitored input channel, changeable without a stream restart: the
/// input callback reads it fresh on every block (§4.8).
#[derive(Debug, Clone)]
pub struct LiveChannel(Arc<AtomicUsize>);

impl LiveChannel {
	#[must_use]
	pub fn new(initial: usize) -> Self {
		Self(Arc::new(AtomicUsize::new(initial)))
	}

	pub fn set(&self, channel: usize) {
		self.0.store(channel, Ordering::Relaxed);
	}

	#[must_use]
	pub fn get(&self) -> usize {
		self.0.load(Ordering::Relaxed)
	}
}

/// Clamps `selected` to channel 0 if it's out of range for a device that
/// actually has `n_of_channels` channels, rather than panicking or
/// silently reading garbage.
#[must_use]
pub fn clamp_channel(selected: usize, n_of_channels: usize) -> usize {
	if n_of_channels == 0 || selected < n_of_channels {
		selected
	} else {
		0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn in_range_channel_is_unchanged() {
		assert_eq!(clamp_channel(1, 4), 1);
	}

	#[test]
	fn overrunning_channel_clamps_to_zero() {
		assert_eq!(clamp_channel(5, 4), 0);
	}
}
