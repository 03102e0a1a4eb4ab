use bmar_ring::BitDepth;

/// Platform audio APIs in priority order. The probe tries hosts whose name
/// matches one of these, in order, before falling back to whatever
/// `cpal::default_host()` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiPreference {
	Wasapi,
	DirectSound,
	Mme,
	CoreAudio,
	Alsa,
	PulseAudio,
	PipeWire,
}

impl ApiPreference {
	/// Case-insensitive substring cpal's `HostId::name()` is matched against.
	#[must_use]
	pub fn host_name_fragment(self) -> &'static str {
		match self {
			ApiPreference::Wasapi => "wasapi",
			ApiPreference::DirectSound => "dsound",
			ApiPreference::Mme => "mme",
			ApiPreference::CoreAudio => "coreaudio",
			ApiPreference::Alsa => "alsa",
			ApiPreference::PulseAudio => "pulse",
			ApiPreference::PipeWire => "pipewire",
		}
	}

	/// The platform-appropriate default priority list from §4.2.
	#[must_use]
	pub fn platform_default() -> Vec<ApiPreference> {
		if cfg!(target_os = "windows") {
			vec![ApiPreference::Wasapi, ApiPreference::DirectSound, ApiPreference::Mme]
		} else if cfg!(target_os = "macos") {
			vec![ApiPreference::CoreAudio]
		} else {
			vec![ApiPreference::Alsa, ApiPreference::PulseAudio, ApiPreference::PipeWire]
		}
	}
}

#[derive(Debug, Clone)]
pub struct CaptureConfig {
	pub sample_rate_hz: u32,
	pub channels: u8,
	pub bit_depth: BitDepth,
	/// Exact device name/id to probe first, if known.
	pub device_id: Option<String>,
	/// Used both to pick a host and, when `device_id` is unset, as a
	/// substring match against a device's reported name ("make/model").
	pub api_preference: Vec<ApiPreference>,
	/// 0 lets the driver choose the callback block size.
	pub block_frames: u32,
}

impl Default for CaptureConfig {
	fn default() -> Self {
		Self {
			sample_rate_hz: 48_000,
			channels: 2,
			bit_depth: BitDepth::Sixteen,
			device_id: None,
			api_preference: ApiPreference::platform_default(),
			block_frames: 0,
		}
	}
}
