use std::sync::mpsc;
use std::sync::Arc;

use bmar_ring::{BitDepth, RingBuffer};
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use resource_daemon::ResourceDaemon;

use crate::config::CaptureConfig;
use crate::probe::{candidate_devices, resolve_stream_config};

#[derive(thiserror::Error, Debug, Clone)]
pub enum CaptureError {
	#[error("no usable input device found among the probed candidates")]
	NoUsableInputDevice,
}

/// Why the capture stream stopped. `Cancelled` is a normal shutdown;
/// `StreamError` means cpal reported a fatal stream error after capture was
/// already running (the device disappeared, for instance).
#[derive(Debug, Clone)]
pub enum CaptureQuitReason {
	Cancelled,
	NoUsableInputDevice,
	StreamError(String),
}

/// Upper bound on the number of frames a single driver-chosen callback ever
/// delivers, used to size the callback's scratch buffer once up front when
/// `block_frames` isn't pinned (0). Real drivers stay well under this; it
/// only exists so the callback never has to grow its scratch buffer.
const DEFAULT_MAX_CALLBACK_FRAMES: u32 = 8192;

/// Whether a rendered [`cpal::StreamError`] names a buffer overrun/xrun.
/// cpal doesn't expose a typed overflow variant, only a free-text error, so
/// detection is a substring match on the handful of words every backend
/// uses for the condition.
fn is_overflow_text(rendered_err: &str) -> bool {
	let text = rendered_err.to_ascii_lowercase();
	text.contains("overrun") || text.contains("overflow") || text.contains("xrun")
}

pub struct ActualCaptureConfig {
	pub sample_rate_hz: u32,
	pub channels: u16,
	pub device_label: String,
}

pub struct CaptureEngine {
	actual: ActualCaptureConfig,
	ring: Arc<RingBuffer>,
	daemon: ResourceDaemon<Stream, CaptureQuitReason>,
}

impl CaptureEngine {
	/// Runs the device acquisition protocol (§4.2) and, on success, starts
	/// the capture stream on a dedicated daemon thread: the stream itself is
	/// built there because platform stream handles aren't generally `Send`.
	///
	/// # Errors
	/// [`CaptureError::NoUsableInputDevice`] if every candidate device and
	/// rate fallback failed.
	pub fn start(config: CaptureConfig, ring: Arc<RingBuffer>) -> Result<Self, CaptureError> {
		let (ack_tx, ack_rx) = mpsc::sync_channel::<Result<ActualCaptureConfig, CaptureError>>(0);
		let bit_depth = config.bit_depth;

		let daemon = ResourceDaemon::new({
			let ring = ring.clone();
			move |quit_signal| {
				let candidates = candidate_devices(&config);
				for candidate in candidates {
					let Some((supported, actual_rate, actual_channels)) =
						resolve_stream_config(&candidate.device, &config)
					else {
						continue;
					};
					let mut stream_config: StreamConfig = supported.clone().into();
					if config.block_frames > 0 {
						stream_config.buffer_size =
							cpal::BufferSize::Fixed(config.block_frames);
					}

					let ring_for_callback = ring.clone();
					let ring_for_err = ring.clone();
					let quit_signal_for_err = quit_signal.clone();
					let max_callback_frames = if config.block_frames > 0 {
						config.block_frames
					} else {
						DEFAULT_MAX_CALLBACK_FRAMES
					};
					let mut scratch: Vec<i32> =
						Vec::with_capacity(max_callback_frames as usize * actual_channels as usize);
					let built = candidate.device.build_input_stream(
						&stream_config,
						move |data: &[f32], _info: &cpal::InputCallbackInfo| {
							write_samples_into_ring(&ring_for_callback, &mut scratch, data, bit_depth);
						},
						move |err| {
							let rendered = err.to_string();
							if is_overflow_text(&rendered) {
								ring_for_err.record_overflow();
								return;
							}
							quit_signal_for_err.dispatch(CaptureQuitReason::StreamError(rendered));
						},
						None,
					);

					let Ok(stream) = built else { continue };
					if stream.play().is_err() {
						continue;
					}

					let _ = ack_tx.send(Ok(ActualCaptureConfig {
						sample_rate_hz: actual_rate,
						channels: actual_channels,
						device_label: candidate.label,
					}));
					return Ok(stream);
				}

				let _ = ack_tx.send(Err(CaptureError::NoUsableInputDevice));
				Err(CaptureQuitReason::NoUsableInputDevice)
			}
		});

		match ack_rx.recv() {
			Ok(Ok(actual)) => Ok(Self { actual, ring, daemon }),
			Ok(Err(err)) => Err(err),
			Err(_) => Err(CaptureError::NoUsableInputDevice),
		}
	}

	#[must_use]
	pub fn sample_rate_hz(&self) -> u32 {
		self.actual.sample_rate_hz
	}

	#[must_use]
	pub fn channels(&self) -> u16 {
		self.actual.channels
	}

	#[must_use]
	pub fn device_label(&self) -> &str {
		&self.actual.device_label
	}

	#[must_use]
	pub fn ring(&self) -> &Arc<RingBuffer> {
		&self.ring
	}

	#[must_use]
	pub fn is_running(&self) -> bool {
		self.daemon.is_holding()
	}

	pub fn stop(&mut self) {
		self.daemon.quit(CaptureQuitReason::Cancelled);
	}
}

/// Converts `data` into the ring's canonical `i32` range and writes it,
/// reusing `scratch` across calls instead of allocating per callback. If a
/// driver ever hands over more frames than `scratch`'s pre-sized capacity,
/// the excess is dropped and counted as an overflow rather than growing the
/// buffer — the callback must never allocate.
fn write_samples_into_ring(ring: &RingBuffer, scratch: &mut Vec<i32>, data: &[f32], bit_depth: BitDepth) {
	let scale = bit_depth.max_value() as f32;
	let capacity = scratch.capacity();
	if data.len() > capacity {
		ring.record_overflow();
	}
	scratch.clear();
	scratch.extend(data.iter().take(capacity).map(|&s| (s.clamp(-1.0, 1.0) * scale) as i32));
	ring.write(scratch);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn callback_write_scales_into_ring_range() {
		let ring = RingBuffer::new(1024, 2);
		let mut scratch = Vec::with_capacity(4);
		let data = [0.5f32, -0.5, 1.0, -1.0];
		write_samples_into_ring(&ring, &mut scratch, &data, BitDepth::Sixteen);
		let snap = ring.snapshot_last(2).unwrap();
		let samples = snap.into_contiguous();
		assert_eq!(samples.len(), 4);
		assert!(samples[0] > 0 && samples[1] < 0);
	}

	#[test]
	fn callback_write_reuses_scratch_without_growing() {
		let ring = RingBuffer::new(1024, 2);
		let mut scratch = Vec::with_capacity(4);
		let data = [0.1f32, -0.1, 0.2, -0.2];
		write_samples_into_ring(&ring, &mut scratch, &data, BitDepth::Sixteen);
		let capacity_after_first = scratch.capacity();
		write_samples_into_ring(&ring, &mut scratch, &data, BitDepth::Sixteen);
		assert_eq!(scratch.capacity(), capacity_after_first);
	}

	#[test]
	fn callback_write_counts_overflow_instead_of_growing() {
		let ring = RingBuffer::new(1024, 2);
		let mut scratch = Vec::with_capacity(2);
		let data = [0.1f32, -0.1, 0.2, -0.2];
		write_samples_into_ring(&ring, &mut scratch, &data, BitDepth::Sixteen);
		assert_eq!(ring.overflow_count(), 1);
		assert_eq!(scratch.capacity(), 2);
	}

	#[test]
	fn overflow_error_text_is_recognized() {
		assert!(is_overflow_text("ALSA buffer overrun (xrun)"));
		assert!(is_overflow_text("input overflow"));
		assert!(!is_overflow_text("device disconnected"));
	}
}
