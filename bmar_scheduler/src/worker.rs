use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use bmar_detect::RecordRequest;
use bmar_dsp::{apply_gain_db, Decimator};
use bmar_encode::{write_segment, FilenameFields, Mp3Quality, Segment, SegmentFormat, SegmentSubtype};
use bmar_ring::{BitDepth, RingBuffer};
use chrono::Local;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use mutex_ext::{CondvarExt, ReactiveCondvar};
use resource_daemon::ResourceDaemon;

use crate::paths::PathResolver;
use crate::tod::TodWindow;

const TOD_RECHECK_INTERVAL: Duration = Duration::from_secs(60);
const SLEEP_TICK: Duration = Duration::from_millis(200);
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy)]
pub enum SchedulerQuitReason {
	Cancelled,
}

/// What causes a worker to begin a new segment, per §4.5's three mode
/// archetypes. `Monitor` and `Period` share the `Periodic` shape; `Event`
/// is driven by the detector's trigger queue instead of a timer.
pub enum Trigger {
	Periodic {
		duration: Duration,
		interval: Duration,
		tod_window: Option<TodWindow>,
	},
	Event {
		requests: Receiver<RecordRequest>,
		pre_frames: u64,
		post_frames: u64,
		tod_window: Option<TodWindow>,
	},
}

pub struct WorkerConfig {
	pub thread_tag: String,
	pub location_id: String,
	pub hive_id: String,
	pub channels: u16,
	pub bit_depth: BitDepth,
	pub source_sample_rate: u32,
	pub target_sample_rate: u32,
	pub format: SegmentFormat,
	pub subtype: SegmentSubtype,
	pub headroom_db: f32,
	pub mp3_quality: Mp3Quality,
	/// Monitor mode writes under `monitor_dir`; Period and Event write under
	/// `primary_raw_dir`.
	pub use_monitor_dir: bool,
}

/// One long-lived background task per active mode (§4.5). Segment writes
/// within a worker are serialized but run on a detached thread so the next
/// interval's timer isn't coupled to file I/O; pending writes are joined on
/// [`SegmentWorker::stop`].
pub struct SegmentWorker {
	shutdown: ReactiveCondvar<bool>,
	pending_writes: Arc<Mutex<Vec<JoinHandle<()>>>>,
	daemon: ResourceDaemon<(), SchedulerQuitReason>,
}

impl SegmentWorker {
	#[must_use]
	pub fn start(
		ring: Arc<RingBuffer>,
		mut trigger: Trigger,
		config: WorkerConfig,
		path_resolver: PathResolver,
	) -> Self {
		let shutdown = ReactiveCondvar::new(false);
		let pending_writes: Arc<Mutex<Vec<JoinHandle<()>>>> = Arc::new(Mutex::new(Vec::new()));

		let daemon = ResourceDaemon::new({
			let shutdown = shutdown.clone();
			let pending_writes = pending_writes.clone();
			move |_quit_signal| {
				loop {
					let Some((start_frame, end_frame)) = acquire_segment(&ring, &mut trigger, &shutdown) else {
						break;
					};

					process_segment(&ring, start_frame, end_frame, &config, &path_resolver, &pending_writes);

					if matches!(trigger, Trigger::Periodic { .. })
						&& post_segment_delay(&trigger, &shutdown)
					{
						break;
					}
				}
				Ok(())
			}
		});

		Self {
			shutdown,
			pending_writes,
			daemon,
		}
	}

	#[must_use]
	pub fn is_running(&self) -> bool {
		self.daemon.is_holding()
	}

	/// Signals the worker to stop, joins its thread, then awaits every
	/// segment write still in flight.
	pub fn stop(&mut self) {
		self.shutdown.with_lock_mut(|v| *v = true);
		self.shutdown.notify_all();
		self.daemon.quit(SchedulerQuitReason::Cancelled);

		let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.pending_writes.lock().unwrap());
		for handle in handles {
			let _ = handle.join();
		}
	}
}

/// Sleeps `total`, ticking at `SLEEP_TICK` so the shutdown signal is
/// observed well within the 100 ms bound in §5. Returns `true` if shutdown
/// was requested before `total` elapsed.
fn interruptible_sleep(shutdown: &ReactiveCondvar<bool>, total: Duration) -> bool {
	let mut remaining = total;
	loop {
		let tick = remaining.min(SLEEP_TICK);
		let woken = shutdown
			.wait_timeout_while_and_then_mut(|quitting| !*quitting, tick, |_| ())
			.is_some();
		if woken {
			return true;
		}
		remaining = remaining.saturating_sub(tick);
		if remaining.is_zero() {
			return false;
		}
	}
}

/// Steps 1-4 (Monitor/Period) or the event-queue wait, yielding the
/// `[start_frame, end_frame)` range to snapshot. `None` means shutdown was
/// requested and the worker should exit.
fn acquire_segment(ring: &RingBuffer, trigger: &mut Trigger, shutdown: &ReactiveCondvar<bool>) -> Option<(u64, u64)> {
	match trigger {
		Trigger::Periodic { duration, tod_window, .. } => {
			if let Some(window) = tod_window {
				while !window.contains(Local::now().time()) {
					if interruptible_sleep(shutdown, TOD_RECHECK_INTERVAL) {
						return None;
					}
				}
			}
			let segment_begin = ring.write_index();
			if interruptible_sleep(shutdown, *duration) {
				return None;
			}
			let segment_end = ring.write_index();
			Some((segment_begin, segment_end))
		}
		Trigger::Event {
			requests,
			pre_frames,
			post_frames,
			tod_window,
		} => loop {
			if shutdown.with_lock(|v| *v) {
				return None;
			}
			// Outside the window, requests are drained and dropped rather than
			// queued: a trigger from before the window opened shouldn't fire a
			// capture once it does.
			if let Some(window) = tod_window {
				if !window.contains(Local::now().time()) {
					let _ = requests.recv_timeout(EVENT_POLL_INTERVAL);
					continue;
				}
			}
			match requests.recv_timeout(EVENT_POLL_INTERVAL) {
				Ok(request) => {
					let start = request.trigger_frame.saturating_sub(*pre_frames);
					let end = request.trigger_frame + *post_frames;
					return Some((start, end));
				}
				Err(RecvTimeoutError::Timeout) => continue,
				Err(RecvTimeoutError::Disconnected) => return None,
			}
		},
	}
}

/// Step 10: the inter-segment gap, only meaningful for `Periodic`.
fn post_segment_delay(trigger: &Trigger, shutdown: &ReactiveCondvar<bool>) -> bool {
	match trigger {
		Trigger::Periodic { interval, .. } => interruptible_sleep(shutdown, *interval),
		Trigger::Event { .. } => false,
	}
}

/// Steps 5-9: snapshot, decimate, apply headroom, resolve paths, and hand
/// the finished buffer to a detached writer thread.
fn process_segment(
	ring: &RingBuffer,
	start_frame: u64,
	end_frame: u64,
	config: &WorkerConfig,
	path_resolver: &PathResolver,
	pending_writes: &Arc<Mutex<Vec<JoinHandle<()>>>>,
) {
	let snapshot = match ring.snapshot_range(start_frame, end_frame) {
		Ok(snapshot) => snapshot,
		Err(err) => {
			tracing::warn!(%err, "segment lost to ring overwrite, skipping");
			return;
		}
	};
	let channels = snapshot.channels;
	let mut samples = snapshot.into_contiguous();

	if config.target_sample_rate < config.source_sample_rate {
		samples = decimate_interleaved(
			&samples,
			channels,
			config.bit_depth,
			config.source_sample_rate,
			config.target_sample_rate,
		);
	}

	if config.headroom_db != 0.0 {
		apply_gain_db(&mut samples, config.bit_depth, config.headroom_db);
	}

	let today = Local::now().date_naive();
	let dated_paths = match path_resolver(today).or_else(|_| path_resolver(today)) {
		Ok(paths) => paths,
		Err(err) => {
			tracing::warn!(%err, "directory creation failed twice, skipping segment");
			return;
		}
	};
	let dir = if config.use_monitor_dir {
		dated_paths.monitor_dir
	} else {
		dated_paths.primary_raw_dir
	};

	let filename = FilenameFields {
		timestamp: Local::now().naive_local(),
		rate_hz: config.target_sample_rate,
		bit_depth: config.subtype.bits() as u8,
		thread_tag: config.thread_tag.clone(),
		location_id: config.location_id.clone(),
		hive_id: config.hive_id.clone(),
		ext: config.format.extension().to_string(),
	}
	.render();
	let path: PathBuf = dir.join(filename);

	let segment = match Segment::new(
		start_frame,
		end_frame,
		config.channels,
		config.source_sample_rate,
		config.target_sample_rate,
		config.format,
		config.subtype,
		path,
	) {
		Ok(segment) => segment,
		Err(err) => {
			tracing::warn!(%err, "segment rejected, skipping");
			return;
		}
	};

	let mp3_quality = config.mp3_quality;
	let handle = std::thread::spawn(move || {
		if let Err(err) = write_segment(&segment, &samples, mp3_quality) {
			tracing::warn!(%err, path = %segment.path.display(), "segment write failed");
		}
	});
	pending_writes.lock().unwrap().push(handle);
}

/// Deinterleaves, decimates each channel offline (zero-phase; latency
/// doesn't matter for an already-closed segment), then re-interleaves.
fn decimate_interleaved(
	samples: &[i32],
	channels: usize,
	bit_depth: BitDepth,
	source_rate_hz: u32,
	target_rate_hz: u32,
) -> Vec<i32> {
	let scale = bit_depth.max_value() as f32;
	let mut per_channel: Vec<Vec<f32>> = vec![Vec::new(); channels];
	for frame in samples.chunks(channels) {
		for (ch, &s) in frame.iter().enumerate() {
			per_channel[ch].push(s as f32 / scale);
		}
	}

	let decimated: Vec<Vec<f32>> = per_channel
		.into_iter()
		.map(|ch_samples| Decimator::new(source_rate_hz, target_rate_hz).process_offline(&ch_samples))
		.collect();

	let n_frames = decimated.first().map_or(0, Vec::len);
	let mut out = Vec::with_capacity(n_frames * channels);
	for i in 0..n_frames {
		for ch_samples in &decimated {
			out.push((ch_samples[i] * scale).clamp(-scale, scale) as i32);
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicUsize, Ordering};

	fn noop_resolver(calls: Arc<AtomicUsize>, root: PathBuf) -> PathResolver {
		Arc::new(move |_date| {
			calls.fetch_add(1, Ordering::SeqCst);
			std::fs::create_dir_all(&root)?;
			Ok(crate::paths::DatedPaths {
				primary_raw_dir: root.clone(),
				monitor_dir: root.clone(),
				plots_dir: root.clone(),
			})
		})
	}

	#[test]
	fn periodic_worker_writes_one_segment_per_interval() {
		let dir = tempfile::tempdir().unwrap();
		let ring = Arc::new(RingBuffer::new(48_000 * 4, 1));
		for _ in 0..48_000 {
			ring.write(&[1000]);
		}

		let calls = Arc::new(AtomicUsize::new(0));
		let config = WorkerConfig {
			thread_tag: "period".to_string(),
			location_id: "site".to_string(),
			hive_id: "hive".to_string(),
			channels: 1,
			bit_depth: BitDepth::Sixteen,
			source_sample_rate: 48_000,
			target_sample_rate: 48_000,
			format: SegmentFormat::Wav,
			subtype: SegmentSubtype::Pcm16,
			headroom_db: 0.0,
			mp3_quality: Mp3Quality::Vbr(4),
			use_monitor_dir: false,
		};
		let trigger = Trigger::Periodic {
			duration: Duration::from_millis(50),
			interval: Duration::from_millis(1),
			tod_window: None,
		};
		let mut worker = SegmentWorker::start(
			ring,
			trigger,
			config,
			noop_resolver(calls.clone(), dir.path().to_path_buf()),
		);

		std::thread::sleep(Duration::from_millis(200));
		worker.stop();

		let written: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
		assert!(!written.is_empty());
		assert!(calls.load(Ordering::SeqCst) > 0);
	}

	#[test]
	fn event_trigger_drops_requests_outside_tod_window() {
		let ring = Arc::new(RingBuffer::new(48_000, 1));
		let (tx, rx) = crossbeam_channel::unbounded();
		let shutdown = ReactiveCondvar::new(false);

		// A single-instant window essentially never contains "now", so the
		// pending request is drained and dropped on every poll instead of
		// being acquired; the loop only ever returns once shutdown fires.
		let closed_window = crate::tod::TodWindow {
			start: chrono::NaiveTime::from_hms_opt(3, 17, 42).unwrap(),
			end: chrono::NaiveTime::from_hms_opt(3, 17, 42).unwrap(),
		};
		tx.send(RecordRequest { trigger_frame: 100 }).unwrap();

		let ring_for_thread = ring.clone();
		let shutdown_for_thread = shutdown.clone();
		let handle = std::thread::spawn(move || {
			let mut trigger = Trigger::Event {
				requests: rx,
				pre_frames: 10,
				post_frames: 10,
				tod_window: Some(closed_window),
			};
			acquire_segment(&ring_for_thread, &mut trigger, &shutdown_for_thread)
		});

		std::thread::sleep(Duration::from_millis(250));
		shutdown.with_lock_mut(|v| *v = true);
		shutdown.notify_all();
		assert!(handle.join().unwrap().is_none());
	}

	#[test]
	fn decimate_interleaved_halves_frame_count() {
		let samples: Vec<i32> = (0..4000).map(|i| (i % 100) - 50).collect();
		let out = decimate_interleaved(&samples, 2, BitDepth::Sixteen, 96_000, 48_000);
		assert_eq!(out.len(), samples.len() / 2);
	}
}
