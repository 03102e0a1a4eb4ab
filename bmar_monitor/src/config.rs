use bmar_capture::ApiPreference;

/// Configures the duplex intercom worker. `input_*` fields mirror
/// `bmar_capture::CaptureConfig` (the intercom opens its own ephemeral
/// input stream rather than sharing C2's) and `output_*` fields describe
/// the playback device, per §4.8 and the `SOUND_OUT_*`/`INTERCOM_SAMPLERATE`
/// options in §6.
#[derive(Debug, Clone)]
pub struct IntercomConfig {
	pub input_device_id: Option<String>,
	pub input_sample_rate_hz: u32,
	pub api_preference: Vec<ApiPreference>,
	pub output_device_id: Option<String>,
	pub output_sample_rate_hz: u32,
	pub initial_channel: usize,
}

impl Default for IntercomConfig {
	fn default() -> Self {
		Self {
			input_device_id: None,
			input_sample_rate_hz: 48_000,
			api_preference: ApiPreference::platform_default(),
			output_device_id: None,
			output_sample_rate_hz: 48_000,
			initial_channel: 0,
		}
	}
}
