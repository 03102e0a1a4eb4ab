use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bmar_capture::{CaptureConfig, CaptureEngine};
use bmar_detect::{ChannelSelector, EventWorker};
use bmar_monitor::{Intercom, IntercomConfig};
use bmar_render::{Axis, Dispatcher, RenderKind};
use bmar_ring::{BitDepth, RingBuffer};
use bmar_scheduler::{SegmentWorker, Trigger, WorkerConfig};
use chrono::Local;
use crossbeam_channel::unbounded;
use mutex_ext::CondvarExt;

use crate::config::Config;
use crate::paths::dated_path_resolver;

#[derive(thiserror::Error, Debug)]
pub enum SupervisorError {
	#[error("config error: {0}")]
	Config(#[from] crate::config::ConfigError),
	#[error("no usable input device: {0}")]
	Capture(#[from] bmar_capture::CaptureError),
	#[error("intercom failed to start: {0}")]
	Intercom(#[from] bmar_monitor::IntercomError),
}

/// Owns cancellation, every long-lived worker, the renderer dispatcher, and
/// dated-directory rollover per §4.9. Renderer jobs and the intercom are
/// started/stopped on demand by the command loop; capture and the
/// configured scheduler/detector workers run for the life of the process.
pub struct Supervisor {
	config: Config,
	ring: Arc<RingBuffer>,
	capture: CaptureEngine,
	monitor_worker: Option<SegmentWorker>,
	period_worker: Option<SegmentWorker>,
	event_worker: Option<EventWorker>,
	event_segment_worker: Option<SegmentWorker>,
	dispatcher: Arc<Dispatcher>,
	intercom: Mutex<Option<Intercom>>,
	path_resolver: bmar_scheduler::PathResolver,
	data_root: PathBuf,
}

/// "disabled" when the mode isn't configured at all, else "running"/"stopped"
/// from the worker's own daemon state.
fn worker_status<W>(worker: Option<&W>, is_running: impl FnOnce(&W) -> bool) -> &'static str {
	match worker {
		Some(worker) if is_running(worker) => "running",
		Some(_) => "stopped",
		None => "disabled",
	}
}

impl Supervisor {
	pub fn start(config: Config, data_root: PathBuf) -> Result<Self, SupervisorError> {
		config.validate()?;

		let capacity_frames = u64::from(config.buffer_seconds) * u64::from(config.primary_in_samplerate);
		let ring = Arc::new(RingBuffer::new(capacity_frames, config.sound_in_chs() as usize));

		let capture_config = CaptureConfig {
			sample_rate_hz: config.primary_in_samplerate,
			channels: config.sound_in_chs(),
			bit_depth: config.primary_bit_depth()?,
			device_id: config.device_id.clone(),
			api_preference: config.api_preference(),
			block_frames: 0,
		};
		let capture = CaptureEngine::start(capture_config, ring.clone())?;

		let path_resolver = dated_path_resolver(data_root.clone(), config.location_id.clone(), config.hive_id.clone());

		let source_rate = capture.sample_rate_hz();
		let channels = capture.channels();
		let bit_depth = config.primary_bit_depth()?;

		let monitor_worker = if config.mode_audio_monitor {
			let (format, subtype) = config.monitor_format()?;
			let tod_window = crate::config::TodConfig {
				start: config.audio_monitor_start.clone(),
				end: config.audio_monitor_end.clone(),
			}
			.parse()?;
			Some(SegmentWorker::start(
				ring.clone(),
				Trigger::Periodic {
					duration: Duration::from_secs(config.audio_monitor_record),
					interval: Duration::from_secs(config.audio_monitor_interval),
					tod_window,
				},
				WorkerConfig {
					thread_tag: "monitor".to_string(),
					location_id: config.location_id.clone(),
					hive_id: config.hive_id.clone(),
					channels,
					bit_depth,
					source_sample_rate: source_rate,
					target_sample_rate: config.audio_monitor_samplerate,
					format,
					subtype,
					headroom_db: config.save_headroom_db,
					mp3_quality: config.monitor_mp3_quality(),
					use_monitor_dir: true,
				},
				path_resolver.clone(),
			))
		} else {
			None
		};

		let period_worker = if config.mode_period {
			let (format, subtype) = config.primary_format()?;
			let tod_window = crate::config::TodConfig {
				start: config.period_start.clone(),
				end: config.period_end.clone(),
			}
			.parse()?;
			Some(SegmentWorker::start(
				ring.clone(),
				Trigger::Periodic {
					duration: Duration::from_secs(config.period_record),
					interval: Duration::from_secs(config.period_interval),
					tod_window,
				},
				WorkerConfig {
					thread_tag: "period".to_string(),
					location_id: config.location_id.clone(),
					hive_id: config.hive_id.clone(),
					channels,
					bit_depth,
					source_sample_rate: source_rate,
					target_sample_rate: config.primary_save_samplerate.unwrap_or(source_rate),
					format,
					subtype,
					headroom_db: config.save_headroom_db,
					mp3_quality: config.monitor_mp3_quality(),
					use_monitor_dir: false,
				},
				path_resolver.clone(),
			))
		} else {
			None
		};

		let (event_worker, event_segment_worker) = if config.mode_event {
			let (format, subtype) = config.primary_format()?;
			let event_tod_window = crate::config::TodConfig {
				start: config.event_start.clone(),
				end: config.event_end.clone(),
			}
			.parse()?;
			let (tx, rx) = unbounded();
			let selector = if config.monitor_ch == usize::MAX {
				ChannelSelector::All
			} else {
				ChannelSelector::Single(config.monitor_ch)
			};
			let detector = EventWorker::start(
				ring.clone(),
				selector,
				config.event_threshold,
				config.save_before_event * u64::from(source_rate),
				config.save_after_event * u64::from(source_rate),
				tx,
			);
			let writer = SegmentWorker::start(
				ring.clone(),
				Trigger::Event {
					requests: rx,
					pre_frames: config.save_before_event * u64::from(source_rate),
					post_frames: config.save_after_event * u64::from(source_rate),
					tod_window: event_tod_window,
				},
				WorkerConfig {
					thread_tag: "event".to_string(),
					location_id: config.location_id.clone(),
					hive_id: config.hive_id.clone(),
					channels,
					bit_depth,
					source_sample_rate: source_rate,
					target_sample_rate: source_rate,
					format,
					subtype,
					headroom_db: config.save_headroom_db,
					mp3_quality: config.monitor_mp3_quality(),
					use_monitor_dir: false,
				},
				path_resolver.clone(),
			);
			(Some(detector), Some(writer))
		} else {
			(None, None)
		};

		Ok(Self {
			config,
			ring,
			capture,
			monitor_worker,
			period_worker,
			event_worker,
			event_segment_worker,
			dispatcher: Arc::new(Dispatcher::new()),
			intercom: Mutex::new(None),
			path_resolver,
			data_root,
		})
	}

	#[must_use]
	pub fn config(&self) -> &Config {
		&self.config
	}

	#[must_use]
	pub fn ring(&self) -> &Arc<RingBuffer> {
		&self.ring
	}

	#[must_use]
	pub fn dispatcher(&self) -> &Arc<Dispatcher> {
		&self.dispatcher
	}

	fn today_plots_dir(&self) -> PathBuf {
		(self.path_resolver)(Local::now().date_naive())
			.map(|p| p.plots_dir)
			.unwrap_or_else(|_| self.data_root.join("plots"))
	}

	/// # Errors
	/// [`bmar_render::RenderError::NonPositiveDuration`] if `duration_s <= 0`
	/// — rejected before any ring snapshot or rendering work starts.
	pub fn launch_scope(&self, duration_s: f32, gain_db: f32) -> Result<(), bmar_render::RenderError> {
		bmar_render::RenderJob::scope(duration_s, gain_db)?;
		let rate = self.capture.sample_rate_hz();
		let channels = self.capture.channels() as usize;
		let bit_depth = self.config.primary_bit_depth().unwrap_or(BitDepth::Sixteen);
		let ring = self.ring.clone();
		let plots_dir = self.today_plots_dir();
		let timeout = RenderKind::Scope.default_timeout_secs(duration_s).map(Duration::from_secs_f32);
		self.dispatcher.launch(RenderKind::Scope, timeout, move |_shutdown| {
			let n_frames = (duration_s * rate as f32) as u64;
			if let Ok(snapshot) = ring.snapshot_last(n_frames) {
				let samples = snapshot.into_contiguous();
				let path = plots_dir.join(format!("scope_{}.png", Local::now().format("%H%M%S")));
				let _ = bmar_render::render_scope(&path, &samples, channels, bit_depth, rate, gain_db);
			}
		});
		Ok(())
	}

	/// # Errors
	/// [`bmar_render::RenderError::NonPositiveDuration`] if `duration_s <= 0`
	/// — rejected before any ring snapshot or rendering work starts.
	pub fn launch_fft(&self, duration_s: f32, gain_db: f32, bucket_hz: f32, channel: usize) -> Result<(), bmar_render::RenderError> {
		bmar_render::RenderJob::fft(duration_s, gain_db, bucket_hz)?;
		let rate = self.capture.sample_rate_hz();
		let channels = self.capture.channels() as usize;
		let bit_depth = self.config.primary_bit_depth().unwrap_or(BitDepth::Sixteen);
		let ring = self.ring.clone();
		let plots_dir = self.today_plots_dir();
		let timeout = RenderKind::Fft.default_timeout_secs(duration_s).map(Duration::from_secs_f32);
		self.dispatcher.launch(RenderKind::Fft, timeout, move |_shutdown| {
			let n_frames = (duration_s * rate as f32) as u64;
			if let Ok(snapshot) = ring.snapshot_last(n_frames) {
				let interleaved = snapshot.into_contiguous();
				let ch = bmar_monitor::clamp_channel(channel, channels);
				let single: Vec<i32> = interleaved.chunks(channels.max(1)).filter_map(|frame| frame.get(ch).copied()).collect();
				let path = plots_dir.join(format!("fft_{}.png", Local::now().format("%H%M%S")));
				let _ = bmar_render::render_fft(&path, &single, bit_depth, rate, gain_db, Some(bucket_hz));
			}
		});
		Ok(())
	}

	pub fn launch_spectrogram(&self, offset_from_latest: usize, channel: usize, axis: Axis) {
		let raw_dir = (self.path_resolver)(Local::now().date_naive()).map(|p| p.primary_raw_dir);
		let plots_dir = self.today_plots_dir();
		let label = format!("{}/{}", self.config.location_id, self.config.hive_id);
		let timeout = Duration::from_secs_f32(RenderKind::Spectrogram.default_timeout_secs(0.0).unwrap_or(240.0));
		self.dispatcher.launch(RenderKind::Spectrogram, Some(timeout), move |_shutdown| {
			if let Ok(raw_dir) = raw_dir {
				let path = plots_dir.join(format!("spectrogram_{}.png", Local::now().format("%H%M%S")));
				let _ = bmar_render::render_spectrogram_from_file(&path, &raw_dir, offset_from_latest, channel, axis, &label);
			}
		});
	}

	pub fn launch_vu(&self, channel: usize) {
		let capture_config = CaptureConfig {
			sample_rate_hz: self.config.audio_monitor_samplerate,
			channels: self.config.sound_in_chs(),
			bit_depth: self.config.primary_bit_depth().unwrap_or(BitDepth::Sixteen),
			device_id: self.config.device_id.clone(),
			api_preference: self.config.api_preference(),
			block_frames: 0,
		};
		self.dispatcher.launch(RenderKind::Vu, None, move |shutdown| {
			crate::vu_stream::run_vu(capture_config, channel, shutdown);
		});
	}

	pub fn launch_perf(&self, continuous: bool) {
		let timeout = if continuous { None } else { Some(Duration::from_secs(1)) };
		self.dispatcher.launch(RenderKind::Perf, timeout, move |shutdown| {
			if continuous {
				loop {
					let reached = shutdown
						.with_lock(|v| *v);
					if reached {
						break;
					}
					println!("{}", bmar_render::snapshot());
					std::thread::sleep(Duration::from_secs(1));
				}
			} else {
				println!("{}", bmar_render::snapshot());
			}
		});
	}

	pub fn start_intercom(&self) -> Result<(), SupervisorError> {
		let mut guard = self.intercom.lock().unwrap();
		if guard.is_some() {
			return Ok(());
		}
		let intercom = Intercom::start(IntercomConfig {
			input_device_id: self.config.device_id.clone(),
			input_sample_rate_hz: self.config.intercom_samplerate,
			api_preference: self.config.api_preference(),
			output_device_id: None,
			output_sample_rate_hz: self.config.sound_out_sr_default,
			initial_channel: self.config.monitor_ch,
		})?;
		*guard = Some(intercom);
		Ok(())
	}

	pub fn stop_intercom(&self) {
		if let Some(mut intercom) = self.intercom.lock().unwrap().take() {
			intercom.stop();
		}
	}

	pub fn set_intercom_channel(&self, channel: usize) {
		if let Some(intercom) = self.intercom.lock().unwrap().as_ref() {
			intercom.set_channel(channel);
		}
	}

	pub fn intercom_running(&self) -> bool {
		self.intercom.lock().unwrap().is_some()
	}

	/// A thin, testable version of the original program's ad hoc thread
	/// bookkeeping (`t` command): lists which long-lived workers are active.
	#[must_use]
	pub fn worker_report(&self) -> Vec<String> {
		let mut report = vec![format!(
			"capture: {} ({} ch @ {} Hz){}",
			self.capture.device_label(),
			self.capture.channels(),
			self.capture.sample_rate_hz(),
			if self.capture.is_running() { "" } else { " (stopped)" }
		)];
		report.push(format!("monitor: {}", worker_status(self.monitor_worker.as_ref(), SegmentWorker::is_running)));
		report.push(format!("period: {}", worker_status(self.period_worker.as_ref(), SegmentWorker::is_running)));
		report.push(format!("event-detector: {}", worker_status(self.event_worker.as_ref(), EventWorker::is_running)));
		report.push(format!("event-writer: {}", worker_status(self.event_segment_worker.as_ref(), SegmentWorker::is_running)));
		report.push(format!(
			"intercom: {}",
			match self.intercom.lock().unwrap().as_ref() {
				Some(intercom) if intercom.is_running() => "running",
				Some(_) => "stopped",
				None => "disabled",
			}
		));
		for kind in [RenderKind::Scope, RenderKind::Fft, RenderKind::Spectrogram, RenderKind::Vu, RenderKind::Monitor, RenderKind::Perf] {
			if self.dispatcher.is_active(kind) {
				report.push(format!("renderer {kind:?}: running"));
			}
		}
		report
	}

	/// Shutdown sequence per §4.9: signal workers, wait, cancel renderers,
	/// stop capture, then return — pending segment writes are awaited
	/// inside each worker's own `stop()`.
	pub fn shutdown(mut self) {
		self.dispatcher.cancel_all();
		self.stop_intercom();
		if let Some(mut worker) = self.monitor_worker.take() {
			worker.stop();
		}
		if let Some(mut worker) = self.period_worker.take() {
			worker.stop();
		}
		if let Some(mut worker) = self.event_worker.take() {
			worker.stop();
		}
		if let Some(mut worker) = self.event_segment_worker.take() {
			worker.stop();
		}
		self.capture.stop();
	}
}
