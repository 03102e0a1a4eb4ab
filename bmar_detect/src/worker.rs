use std::sync::Arc;
use std::time::Duration;

use bmar_ring::RingBuffer;
use crossbeam_channel::Sender;
use mutex_ext::{CondvarExt, ReactiveCondvar};
use resource_daemon::ResourceDaemon;

use crate::detector::{project_frame, ChannelSelector, EventDetector, RecordRequest};

/// How often the worker re-checks the ring for new frames. Cancellation is
/// observed at every tick, well under the 100 ms bound in §5.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy)]
pub enum EventWorkerQuitReason {
	Cancelled,
}

/// Drives an [`EventDetector`] by polling `ring` on an interval, rather than
/// being woken per-sample: the capture callback must never call into this
/// worker directly.
pub struct EventWorker {
	shutdown: ReactiveCondvar<bool>,
	daemon: ResourceDaemon<(), EventWorkerQuitReason>,
}

impl EventWorker {
	#[must_use]
	pub fn start(
		ring: Arc<RingBuffer>,
		channel_selector: ChannelSelector,
		threshold: i32,
		pre_frames: u64,
		post_frames: u64,
		requests: Sender<RecordRequest>,
	) -> Self {
		let shutdown = ReactiveCondvar::new(false);

		let daemon = ResourceDaemon::new({
			let shutdown = shutdown.clone();
			move |_quit_signal| {
				let mut detector = EventDetector::new(threshold, pre_frames, post_frames);
				let mut last_checked_frame = ring.write_index();

				loop {
					let woken_by_shutdown = shutdown
						.wait_timeout_while_and_then_mut(|quitting| !*quitting, POLL_INTERVAL, |_| ())
						.is_some();
					if woken_by_shutdown {
						break;
					}

					let write_idx = ring.write_index();
					if write_idx <= last_checked_frame {
						continue;
					}

					let wanted = (write_idx - last_checked_frame).min(ring.capacity_frames());
					if let Ok(snapshot) = ring.snapshot_last(wanted) {
						let channels = snapshot.channels;
						let contiguous = snapshot.into_contiguous();
						let frames_in_snapshot = contiguous.len() as u64 / channels as u64;
						let snapshot_start_frame = write_idx - frames_in_snapshot;

						for (i, frame) in contiguous.chunks(channels).enumerate() {
							let frame_index = snapshot_start_frame + i as u64;
							if frame_index < last_checked_frame {
								continue;
							}
							let peak = project_frame(frame, channel_selector);
							if let Some(request) = detector.ingest(frame_index, peak, write_idx) {
								let _ = requests.send(request);
							}
						}
					}
					// a failed snapshot means history was lost between polls;
					// resynchronize at the current write index without backfilling.
					last_checked_frame = write_idx;
				}
				Ok(())
			}
		});

		Self { shutdown, daemon }
	}

	#[must_use]
	pub fn is_running(&self) -> bool {
		self.daemon.is_holding()
	}

	/// Signals the polling loop to exit and joins its thread.
	pub fn stop(&mut self) {
		self.shutdown.with_lock_mut(|v| *v = true);
		self.shutdown.notify_all();
		self.daemon.quit(EventWorkerQuitReason::Cancelled);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::thread;

	#[test]
	fn trigger_produces_exactly_one_request() {
		let ring = Arc::new(RingBuffer::new(96_000 * 6, 1));
		let (tx, rx) = crossbeam_channel::unbounded();
		let mut worker = EventWorker::start(ring.clone(), ChannelSelector::Single(0), 10_000, 96_000, 96_000, tx);

		for _ in 0..48_000 {
			ring.write(&[0]);
		}
		ring.write(&[20_000]);
		for _ in 0..96_100 {
			ring.write(&[0]);
		}

		let request = rx.recv_timeout(Duration::from_secs(2)).expect("expected a record request");
		assert!(request.trigger_frame >= 48_000);

		worker.stop();
		thread::sleep(Duration::from_millis(10));
		assert!(rx.try_recv().is_err());
	}
}
