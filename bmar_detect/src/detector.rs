/// The event state machine's current phase, per §4.6. `Armed` is
/// momentary in practice — a crossing resolves to `Capturing` in the same
/// call that observed it — but is kept as a distinct state because it
/// carries `pre_frames_available`, useful for diagnosing a trigger whose
/// pre-roll was truncated by a ring that's younger than `PRE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventState {
	Idle,
	Armed { start_frame: u64, pre_frames_available: u64 },
	Capturing { start_frame: u64, deadline_frame: u64 },
}

/// Emitted once a capture's `POST` deadline is reached. The event worker
/// resolves `PRE`/`POST` at request time from its own configuration, so the
/// request itself carries nothing but the trigger point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordRequest {
	pub trigger_frame: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSelector {
	Single(usize),
	All,
}

/// Level-threshold trigger with pre-roll/post-roll windowing. Consumes a
/// scalar peak-absolute measurement per frame rather than raw samples — the
/// caller projects whichever channel(s) are configured down to one number
/// per frame before calling [`EventDetector::ingest`].
pub struct EventDetector {
	threshold: i32,
	pre_frames: u64,
	post_frames: u64,
	state: EventState,
}

impl EventDetector {
	#[must_use]
	pub fn new(threshold: i32, pre_frames: u64, post_frames: u64) -> Self {
		Self {
			threshold,
			pre_frames,
			post_frames,
			state: EventState::Idle,
		}
	}

	#[must_use]
	pub fn state(&self) -> EventState {
		self.state
	}

	/// Feeds the peak absolute sample value observed at ring frame
	/// `frame_index`, given that `write_idx` frames have been produced so
	/// far (used only to report how much pre-roll is actually available).
	/// Returns a [`RecordRequest`] exactly once per Idle→Capturing→Idle
	/// cycle, when the post-roll deadline is reached. While `Capturing`,
	/// further threshold crossings are debounced and ignored.
	pub fn ingest(&mut self, frame_index: u64, peak_abs: i32, write_idx: u64) -> Option<RecordRequest> {
		match self.state {
			EventState::Idle => {
				if peak_abs >= self.threshold {
					let pre_frames_available = self.pre_frames.min(write_idx);
					self.state = EventState::Armed {
						start_frame: frame_index,
						pre_frames_available,
					};
					self.state = EventState::Capturing {
						start_frame: frame_index,
						deadline_frame: frame_index + self.post_frames,
					};
				}
				None
			}
			EventState::Armed { start_frame, .. } => {
				self.state = EventState::Capturing {
					start_frame,
					deadline_frame: start_frame + self.post_frames,
				};
				None
			}
			EventState::Capturing { start_frame, deadline_frame } => {
				if frame_index >= deadline_frame {
					self.state = EventState::Idle;
					Some(RecordRequest { trigger_frame: start_frame })
				} else {
					None
				}
			}
		}
	}
}

/// Projects an interleaved frame down to the scalar the detector threshold
/// is compared against: the absolute value on the configured channel, or
/// the max absolute value across all channels.
#[must_use]
pub fn project_frame(frame: &[i32], selector: ChannelSelector) -> i32 {
	match selector {
		ChannelSelector::Single(ch) => frame.get(ch).copied().unwrap_or(0).abs(),
		ChannelSelector::All => frame.iter().map(|s| s.abs()).max().unwrap_or(0),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn idle_until_threshold_crossed() {
		let mut detector = EventDetector::new(10_000, 2 * 48_000, 2 * 48_000);
		for f in 0..100 {
			assert!(detector.ingest(f, 500, 1000).is_none());
		}
		assert_eq!(detector.state(), EventState::Idle);
	}

	#[test]
	fn crossing_enters_capturing_and_emits_after_post_roll() {
		let mut detector = EventDetector::new(10_000, 96_000, 96_000);
		assert!(detector.ingest(1_000_000, 20_000, 1_000_001).is_none());
		assert!(matches!(detector.state(), EventState::Capturing { start_frame: 1_000_000, .. }));

		for f in 1_000_001..1_000_000 + 96_000 {
			assert!(detector.ingest(f, 0, f + 1).is_none());
		}
		let result = detector.ingest(1_000_000 + 96_000, 0, 2_000_000);
		assert_eq!(result, Some(RecordRequest { trigger_frame: 1_000_000 }));
		assert_eq!(detector.state(), EventState::Idle);
	}

	#[test]
	fn retriggers_are_debounced_while_capturing() {
		let mut detector = EventDetector::new(10_000, 1_000, 1_000);
		assert!(detector.ingest(0, 20_000, 1).is_none());
		let before = detector.state();
		assert!(detector.ingest(500, 50_000, 501).is_none());
		assert_eq!(detector.state(), before);
	}

	#[test]
	fn project_frame_selects_single_channel_or_max() {
		let frame = [-3, 7, -9];
		assert_eq!(project_frame(&frame, ChannelSelector::Single(0)), 3);
		assert_eq!(project_frame(&frame, ChannelSelector::All), 9);
	}
}
