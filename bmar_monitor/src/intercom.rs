use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use bmar_capture::CaptureConfig;
use bmar_capture::{candidate_devices, resolve_stream_config};
use bmar_ring::BitDepth;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Stream;
use mutex_ext::LockExt;
use resource_daemon::ResourceDaemon;

use crate::channel::{clamp_channel, LiveChannel};
use crate::config::IntercomConfig;
use crate::resample::linear_resample;

#[derive(thiserror::Error, Debug)]
pub enum IntercomError {
	#[error("no usable input device for the intercom")]
	NoUsableInputDevice,
	#[error("no usable output device for the intercom")]
	NoUsableOutputDevice,
}

#[derive(Debug, Clone)]
pub enum IntercomQuitReason {
	Cancelled,
	StreamError(String),
}

const MAX_BUFFERED_SECONDS: u32 = 2;

/// Duplex worker per §4.8: an ephemeral input stream feeds a short
/// resampled buffer that an ephemeral output stream drains. Changing the
/// monitored channel is lock-free and doesn't restart either stream.
pub struct Intercom {
	channel: LiveChannel,
	input_daemon: ResourceDaemon<Stream, IntercomQuitReason>,
	output_daemon: ResourceDaemon<Stream, IntercomQuitReason>,
}

impl Intercom {
	/// # Errors
	/// [`IntercomError::NoUsableInputDevice`] or
	/// [`IntercomError::NoUsableOutputDevice`] if neither side can be
	/// opened on any candidate device.
	pub fn start(config: IntercomConfig) -> Result<Self, IntercomError> {
		let channel = LiveChannel::new(config.initial_channel);
		let buffer: Arc<Mutex<VecDeque<f32>>> = Arc::new(Mutex::new(VecDeque::new()));
		let output_rate = config.output_sample_rate_hz;

		let (input_ack_tx, input_ack_rx) = mpsc::sync_channel::<bool>(0);
		let input_daemon = ResourceDaemon::new({
			let buffer = buffer.clone();
			let channel = channel.clone();
			let probe_config = CaptureConfig {
				sample_rate_hz: config.input_sample_rate_hz,
				channels: 8,
				bit_depth: BitDepth::Sixteen,
				device_id: config.input_device_id.clone(),
				api_preference: config.api_preference.clone(),
				block_frames: 0,
			};
			move |quit_signal| {
				for candidate in candidate_devices(&probe_config) {
					let Some((stream_config, input_rate, n_channels)) = resolve_stream_config(&candidate.device, &probe_config) else {
						continue;
					};
					let buffer = buffer.clone();
					let channel = channel.clone();
					let n_channels = n_channels as usize;
					let err_signal = quit_signal.clone();
					let built = candidate.device.build_input_stream(
						&stream_config.into(),
						move |data: &[f32], _: &cpal::InputCallbackInfo| {
							let ch = clamp_channel(channel.get(), n_channels);
							let mono: Vec<f32> = data
								.chunks(n_channels.max(1))
								.map(|frame| *frame.get(ch).unwrap_or(&0.0))
								.collect();
							let resampled = linear_resample(&mono, input_rate, output_rate);
							buffer.with_lock_mut(|b| {
								b.extend(resampled);
								let cap = output_rate as usize * MAX_BUFFERED_SECONDS as usize;
								while b.len() > cap {
									b.pop_front();
								}
							});
						},
						move |err| err_signal.dispatch(IntercomQuitReason::StreamError(err.to_string())),
						None,
					);
					if let Ok(stream) = built {
						if stream.play().is_ok() {
							let _ = input_ack_tx.send(true);
							return Ok(stream);
						}
					}
				}
				let _ = input_ack_tx.send(false);
				Err(IntercomQuitReason::StreamError("no usable intercom input device".to_string()))
			}
		});
		if !input_ack_rx.recv().unwrap_or(false) {
			return Err(IntercomError::NoUsableInputDevice);
		}

		let (output_ack_tx, output_ack_rx) = mpsc::sync_channel::<bool>(0);
		let output_daemon = ResourceDaemon::new({
			let buffer = buffer.clone();
			let wanted_device_id = config.output_device_id.clone();
			move |quit_signal| {
				let host = cpal::default_host();
				let devices: Vec<cpal::Device> = match &wanted_device_id {
					Some(id) => host
						.output_devices()
						.into_iter()
						.flatten()
						.filter(|d| d.name().map(|n| n == *id).unwrap_or(false))
						.chain(host.default_output_device())
						.collect(),
					None => host.default_output_device().into_iter().collect(),
				};

				for device in devices {
					let Ok(supported) = device.default_output_config() else { continue };
					let stream_config: cpal::StreamConfig = supported.into();
					let err_signal = quit_signal.clone();
					let buffer = buffer.clone();
					let built = device.build_output_stream(
						&stream_config,
						move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
							buffer.with_lock_mut(|b| {
								for sample in data.iter_mut() {
									*sample = b.pop_front().unwrap_or(0.0);
								}
							});
						},
						move |err| err_signal.dispatch(IntercomQuitReason::StreamError(err.to_string())),
						None,
					);
					if let Ok(stream) = built {
						if stream.play().is_ok() {
							let _ = output_ack_tx.send(true);
							return Ok(stream);
						}
					}
				}
				let _ = output_ack_tx.send(false);
				Err(IntercomQuitReason::StreamError("no usable intercom output device".to_string()))
			}
		});
		if !output_ack_rx.recv().unwrap_or(false) {
			return Err(IntercomError::NoUsableOutputDevice);
		}

		Ok(Self {
			channel,
			input_daemon,
			output_daemon,
		})
	}

	/// Changes the monitored input channel without restarting either
	/// stream; the input callback picks it up on its next block.
	pub fn set_channel(&self, channel: usize) {
		self.channel.set(channel);
	}

	#[must_use]
	pub fn channel(&self) -> usize {
		self.channel.get()
	}

	/// Both streams report holding; either one having already quit (e.g. the
	/// output device disappeared) counts as not running.
	#[must_use]
	pub fn is_running(&self) -> bool {
		self.input_daemon.is_holding() && self.output_daemon.is_holding()
	}

	pub fn stop(&mut self) {
		self.input_daemon.quit(IntercomQuitReason::Cancelled);
		self.output_daemon.quit(IntercomQuitReason::Cancelled);
	}
}
