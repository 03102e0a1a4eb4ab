//! Fixed-capacity, single-producer/many-consumer circular sample buffer.
//!
//! The producer (the capture callback) is the only writer and never blocks,
//! allocates, or takes a lock: it copies a block of interleaved frames into
//! the backing storage and publishes a new write index with a release store.
//! Readers take an acquire load of that index and copy out the frame range
//! they need, tolerating that the producer may keep overwriting frames older
//! than `write_index - capacity_frames` while they do so — by the time a
//! reader asks for history, that history is already "the past" and nobody
//! but the reader is looking at the copy it makes.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU64, Ordering};

mod sample;
pub use sample::*;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingBufferError {
	#[error(
		"requested {requested} frames but the ring only retains {capacity} frames of history"
	)]
	InsufficientHistory { requested: u64, capacity: u64 },
	#[error(
		"snapshot starting at frame {start_frame} has already been overwritten; oldest retained frame is {oldest_retained}"
	)]
	LostHistory { start_frame: u64, oldest_retained: u64 },
}

/// Two contiguous frame ranges whose concatenation is the requested window.
/// `b` is empty when the window didn't wrap around the end of the backing
/// storage.
#[derive(Debug, Clone, PartialEq)]
pub struct RingSnapshot {
	pub a: Vec<Sample>,
	pub b: Vec<Sample>,
	pub channels: usize,
}

impl RingSnapshot {
	/// The number of frames represented by this snapshot.
	#[must_use]
	pub fn n_of_frames(&self) -> u64 {
		((self.a.len() + self.b.len()) / self.channels) as u64
	}

	/// Concatenate both slices into one interleaved, channel-major buffer.
	#[must_use]
	pub fn into_contiguous(self) -> Vec<Sample> {
		let mut out = self.a;
		out.extend(self.b);
		out
	}
}

pub struct RingBuffer {
	capacity_frames: u64,
	channels: usize,
	buffer: UnsafeCell<Box<[Sample]>>,
	write_idx: AtomicU64,
	overflow_count: AtomicU64,
}

// SAFETY: the only mutable access to `buffer` is through `write`, which is
// documented as producer-only (a single caller at a time). Readers only ever
// read through shared references and copy data out before returning it.
unsafe impl Sync for RingBuffer {}
unsafe impl Send for RingBuffer {}

impl RingBuffer {
	/// Allocates a ring able to retain `capacity_frames` frames of
	/// `channels`-wide interleaved audio. The backing storage is allocated
	/// once and never resized.
	#[must_use]
	pub fn new(capacity_frames: u64, channels: usize) -> Self {
		assert!(channels > 0, "a ring buffer needs at least one channel");
		assert!(capacity_frames > 0, "a ring buffer needs nonzero capacity");
		let n_of_samples = capacity_frames as usize * channels;
		Self {
			capacity_frames,
			channels,
			buffer: UnsafeCell::new(vec![0; n_of_samples].into_boxed_slice()),
			write_idx: AtomicU64::new(0),
			overflow_count: AtomicU64::new(0),
		}
	}

	#[must_use]
	pub fn capacity_frames(&self) -> u64 {
		self.capacity_frames
	}

	#[must_use]
	pub fn channels(&self) -> usize {
		self.channels
	}

	/// The monotonic count of frames written so far. Never wraps back to
	/// zero: wrapping only happens when indexing into the backing storage.
	#[must_use]
	pub fn write_index(&self) -> u64 {
		self.write_idx.load(Ordering::Acquire)
	}

	/// Producer-only. Reported input overflows from the audio subsystem are
	/// tallied here so callers never need their own atomic for the same
	/// purpose; it is not touched by `write` itself.
	pub fn record_overflow(&self) {
		self.overflow_count.fetch_add(1, Ordering::Relaxed);
	}

	#[must_use]
	pub fn overflow_count(&self) -> u64 {
		self.overflow_count.load(Ordering::Relaxed)
	}

	/// Copies `frames` (interleaved, channel-major) into the ring and
	/// publishes the new write index. `frames.len()` must be a multiple of
	/// `channels`; a partial trailing frame is never accepted, matching the
	/// capture callback's block-aligned delivery. Never fails and never
	/// blocks: a write that would overrun un-consumed history simply
	/// overwrites it, because the ring makes no promise to wait for readers.
	pub fn write(&self, frames: &[Sample]) {
		debug_assert_eq!(
			frames.len() % self.channels,
			0,
			"frames.len() must be a multiple of channels"
		);
		let n_of_frames = (frames.len() / self.channels) as u64;
		if n_of_frames == 0 {
			return;
		}

		let cur = self.write_idx.load(Ordering::Relaxed);
		let start_sample = (cur % self.capacity_frames) as usize * self.channels;

		// SAFETY: `write` is documented producer-only (single writer); readers
		// only ever read through `&self` and copy out before returning, so a
		// concurrent reader racing this write sees either old or new sample
		// values for a given slot, never a torn allocation.
		let buffer = unsafe { &mut *self.buffer.get() };
		let total_len = buffer.len();
		let first_len = frames.len().min(total_len - start_sample);
		buffer[start_sample..start_sample + first_len].copy_from_slice(&frames[..first_len]);
		if first_len < frames.len() {
			let remainder = &frames[first_len..];
			buffer[..remainder.len()].copy_from_slice(remainder);
		}

		self.write_idx.store(cur + n_of_frames, Ordering::Release);
	}

	/// Returns the most recent `n_frames` frames ending at the instantaneous
	/// write index, as two contiguous slices (the second is empty unless the
	/// window wraps the end of the backing storage).
	///
	/// # Errors
	/// [`RingBufferError::InsufficientHistory`] if `n_frames` exceeds the
	/// ring's capacity, or if fewer than `n_frames` have been written yet.
	pub fn snapshot_last(&self, n_frames: u64) -> Result<RingSnapshot, RingBufferError> {
		if n_frames > self.capacity_frames {
			return Err(RingBufferError::InsufficientHistory {
				requested: n_frames,
				capacity: self.capacity_frames,
			});
		}
		let write_idx = self.write_index();
		if n_frames > write_idx {
			return Err(RingBufferError::InsufficientHistory {
				requested: n_frames,
				capacity: self.capacity_frames,
			});
		}
		let start_frame = write_idx - n_frames;
		Ok(self.copy_range(start_frame, n_frames))
	}

	/// Returns the frames in `[start_frame, end_frame)`.
	///
	/// # Errors
	/// [`RingBufferError::LostHistory`] if `start_frame` has already been
	/// overwritten (i.e. `write_index() - start_frame > capacity_frames` at
	/// the moment copying begins).
	pub fn snapshot_range(
		&self,
		start_frame: u64,
		end_frame: u64,
	) -> Result<RingSnapshot, RingBufferError> {
		debug_assert!(end_frame >= start_frame);
		let n_frames = end_frame - start_frame;
		let write_idx = self.write_index();
		let oldest_retained = write_idx.saturating_sub(self.capacity_frames);
		if start_frame < oldest_retained {
			return Err(RingBufferError::LostHistory {
				start_frame,
				oldest_retained,
			});
		}
		if n_frames > self.capacity_frames {
			return Err(RingBufferError::InsufficientHistory {
				requested: n_frames,
				capacity: self.capacity_frames,
			});
		}
		Ok(self.copy_range(start_frame, n_frames))
	}

	fn copy_range(&self, start_frame: u64, n_frames: u64) -> RingSnapshot {
		let start_sample = (start_frame % self.capacity_frames) as usize * self.channels;
		let n_samples = n_frames as usize * self.channels;

		// SAFETY: see `write`; this is a read-only pass that copies data out
		// immediately, so the returned snapshot never aliases `buffer`.
		let buffer = unsafe { &*self.buffer.get() };
		let total_len = buffer.len();
		let first_len = n_samples.min(total_len - start_sample);
		let a = buffer[start_sample..start_sample + first_len].to_vec();
		let b = if first_len < n_samples {
			buffer[..n_samples - first_len].to_vec()
		} else {
			Vec::new()
		};
		RingSnapshot {
			a,
			b,
			channels: self.channels,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn frame(v: Sample, channels: usize) -> Vec<Sample> {
		vec![v; channels]
	}

	#[test]
	fn write_index_is_monotonic() {
		let ring = RingBuffer::new(8, 1);
		ring.write(&[1, 2, 3]);
		let after_first = ring.write_index();
		ring.write(&[4, 5]);
		let after_second = ring.write_index();
		assert!(after_second > after_first);
		assert_eq!(after_first, 3);
		assert_eq!(after_second, 5);
	}

	#[test]
	fn snapshot_last_matches_recent_writes_interleaved() {
		let ring = RingBuffer::new(4, 2);
		for f in 0..4 {
			ring.write(&frame(f, 2));
		}
		let snap = ring.snapshot_last(4).unwrap();
		assert_eq!(snap.into_contiguous(), vec![0, 0, 1, 1, 2, 2, 3, 3]);
	}

	#[test]
	fn snapshot_last_wraps_correctly() {
		let ring = RingBuffer::new(4, 1);
		for f in 0..6 {
			ring.write(&[f]);
		}
		// capacity is 4 frames; the last 4 writes were 2,3,4,5
		let snap = ring.snapshot_last(4).unwrap();
		assert_eq!(snap.into_contiguous(), vec![2, 3, 4, 5]);
	}

	#[test]
	fn capacity_minus_one_succeeds_capacity_plus_one_fails() {
		let ring = RingBuffer::new(10, 1);
		for f in 0..20 {
			ring.write(&[f]);
		}
		assert!(ring.snapshot_last(9).is_ok());
		assert!(matches!(
			ring.snapshot_last(11),
			Err(RingBufferError::InsufficientHistory { .. })
		));
	}

	#[test]
	fn snapshot_range_fails_once_overwritten() {
		let ring = RingBuffer::new(4, 1);
		for f in 0..10 {
			ring.write(&[f]);
		}
		// write_index is 10; frames [0, 6) have been overwritten (capacity 4).
		assert!(matches!(
			ring.snapshot_range(0, 1),
			Err(RingBufferError::LostHistory { .. })
		));
		assert!(ring.snapshot_range(6, 10).is_ok());
	}

	#[test]
	fn snapshot_range_returns_exact_window() {
		let ring = RingBuffer::new(16, 1);
		for f in 0..16 {
			ring.write(&[f]);
		}
		let snap = ring.snapshot_range(4, 10).unwrap();
		assert_eq!(snap.into_contiguous(), vec![4, 5, 6, 7, 8, 9]);
	}

	#[test]
	fn partial_frame_writes_are_rejected_in_debug() {
		let ring = RingBuffer::new(4, 2);
		let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
			ring.write(&[1, 2, 3]);
		}));
		assert!(result.is_err());
	}

	#[test]
	fn random_fuzz_matches_reference_model() {
		use rand::Rng;
		let mut rng = rand::thread_rng();
		let channels = 2;
		let capacity = 64u64;
		let ring = RingBuffer::new(capacity, channels);
		let mut model: Vec<Sample> = Vec::new();

		for _ in 0..500 {
			let block_frames = rng.gen_range(1..=16usize);
			let block: Vec<Sample> = (0..block_frames * channels)
				.map(|_| rng.gen_range(-1000..1000))
				.collect();
			ring.write(&block);
			model.extend(&block);

			let history_frames = (model.len() / channels) as u64;
			let want_frames = history_frames.min(capacity).min(20);
			if want_frames == 0 {
				continue;
			}
			let snap = ring.snapshot_last(want_frames).unwrap();
			let expected_start = model.len() - want_frames as usize * channels;
			assert_eq!(snap.into_contiguous(), &model[expected_start..]);
		}
	}
}
