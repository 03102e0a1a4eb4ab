use std::path::PathBuf;

use bmar_capture::ApiPreference;
use bmar_encode::{Mp3Quality, SegmentFormat, SegmentSubtype};
use bmar_ring::BitDepth;
use chrono::NaiveTime;
use serde::Deserialize;

/// A time-of-day window, or `None` for continuous operation. Mirrors
/// `BMAR_config.py`'s `datetime.time(...)` fields with `None` meaning
/// "no gating".
#[derive(Debug, Clone, Default)]
pub struct TodConfig {
	pub start: Option<String>,
	pub end: Option<String>,
}

impl TodConfig {
	pub fn parse(&self) -> Result<Option<bmar_scheduler::TodWindow>, ConfigError> {
		match (&self.start, &self.end) {
			(Some(start), Some(end)) => {
				let start = parse_hms(start)?;
				let end = parse_hms(end)?;
				Ok(Some(bmar_scheduler::TodWindow { start, end }))
			}
			(None, None) => Ok(None),
			_ => Err(ConfigError::IncompleteTodWindow),
		}
	}
}

fn parse_hms(s: &str) -> Result<NaiveTime, ConfigError> {
	NaiveTime::parse_from_str(s, "%H:%M:%S").map_err(|_| ConfigError::BadTimeOfDay(s.to_string()))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
	// Identity
	pub location_id: String,
	pub hive_id: String,
	pub hive_config: String,
	pub mic_location: [String; 4],
	pub mic_1: bool,
	pub mic_2: bool,
	pub mic_3: bool,
	pub mic_4: bool,

	// Modes
	pub mode_audio_monitor: bool,
	pub mode_period: bool,
	pub mode_event: bool,
	pub mode_fft_periodic_record: bool,

	// Capture
	pub primary_in_samplerate: u32,
	pub primary_bitdepth: u16,
	pub primary_save_samplerate: Option<u32>,
	pub primary_file_format: String,
	pub buffer_seconds: u32,
	pub save_headroom_db: f32,

	// Monitor
	pub audio_monitor_samplerate: u32,
	pub audio_monitor_bitdepth: u16,
	pub audio_monitor_channels: u16,
	pub audio_monitor_quality: u32,
	pub audio_monitor_format: String,
	pub audio_monitor_record: u64,
	pub audio_monitor_interval: u64,
	pub audio_monitor_start: Option<String>,
	pub audio_monitor_end: Option<String>,

	// Period
	pub period_record: u64,
	pub period_interval: u64,
	pub period_start: Option<String>,
	pub period_end: Option<String>,
	pub period_spectrogram: f32,

	// Event
	pub event_start: Option<String>,
	pub event_end: Option<String>,
	pub save_before_event: u64,
	pub save_after_event: u64,
	pub event_threshold: i32,
	pub monitor_ch: usize,

	// Renderer
	pub trace_duration: f32,
	pub oscope_gain_db: f32,
	pub fft_duration: f32,
	pub fft_gain: f32,
	pub fft_bw: f32,
	pub fft_interval: u64,
	pub spectrogram_duration: f32,
	pub spectrogram_gain: f32,
	pub spectrogram_db_min: f32,
	pub spectrogram_db_max: f32,
	pub fft_freq_min_hz: f32,
	pub fft_freq_max_hz: f32,

	// Devices
	pub make_name: String,
	pub model_name: Vec<String>,
	pub device_name: String,
	pub api_name: String,
	pub hostapi_index: i32,
	pub device_id: Option<String>,
	pub sound_out_id_default: i32,
	pub sound_out_chs_default: u16,
	pub sound_out_sr_default: u32,
	pub intercom_samplerate: u32,

	pub data_root: PathBuf,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			location_id: "Zeev-Berkeley".to_string(),
			hive_id: "Z1_4mic".to_string(),
			hive_config: "dual-mic, sensor".to_string(),
			mic_location: [
				"1: upper--front".to_string(),
				"2: upper--back".to_string(),
				"3: lower w/queen--front".to_string(),
				"4: lower w/queen--back".to_string(),
			],
			mic_1: true,
			mic_2: true,
			mic_3: false,
			mic_4: false,

			mode_audio_monitor: true,
			mode_period: true,
			mode_event: false,
			mode_fft_periodic_record: true,

			primary_in_samplerate: 192_000,
			primary_bitdepth: 16,
			primary_save_samplerate: None,
			primary_file_format: "FLAC".to_string(),
			buffer_seconds: 300,
			save_headroom_db: 0.0,

			audio_monitor_samplerate: 48_000,
			audio_monitor_bitdepth: 16,
			audio_monitor_channels: 2,
			audio_monitor_quality: 0,
			audio_monitor_format: "MP3".to_string(),
			audio_monitor_record: 1800,
			audio_monitor_interval: 0,
			audio_monitor_start: None,
			audio_monitor_end: Some("23:00:00".to_string()),

			period_record: 900,
			period_interval: 0,
			period_start: None,
			period_end: Some("20:00:00".to_string()),
			period_spectrogram: 60.0,

			event_start: Some("04:00:00".to_string()),
			event_end: Some("22:00:00".to_string()),
			save_before_event: 30,
			save_after_event: 30,
			event_threshold: 20_000,
			monitor_ch: 0,

			trace_duration: 10.0,
			oscope_gain_db: 0.0,
			fft_duration: 10.0,
			fft_gain: 0.0,
			fft_bw: 1_000.0,
			fft_interval: 0,
			spectrogram_duration: 60.0,
			spectrogram_gain: 0.0,
			spectrogram_db_min: -80.0,
			spectrogram_db_max: 0.0,
			fft_freq_min_hz: 0.0,
			fft_freq_max_hz: 0.0,

			make_name: "Focusrite".to_string(),
			model_name: vec!["UMC404HD".to_string(), "Analogue 1 + 2".to_string()],
			device_name: "UAC".to_string(),
			api_name: "WASAPI".to_string(),
			hostapi_index: 3,
			device_id: None,
			sound_out_id_default: -1,
			sound_out_chs_default: 1,
			sound_out_sr_default: 48_000,
			intercom_samplerate: 48_000,

			data_root: PathBuf::from("./bmar_data"),
		}
	}
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
	#[error("failed to read config file {path}: {source}")]
	Read { path: PathBuf, source: std::io::Error },
	#[error("failed to parse config file {path}: {source}")]
	Parse { path: PathBuf, source: toml::de::Error },
	#[error("a time-of-day window needs both a start and an end")]
	IncompleteTodWindow,
	#[error("'{0}' isn't a valid HH:MM:SS time of day")]
	BadTimeOfDay(String),
	#[error("sound_in_chs must be between 1 and 8, got {0}")]
	ChannelCountOutOfRange(u8),
	#[error("audio_monitor_channels must be 1 or 2, got {0}")]
	MonitorChannelsOutOfRange(u16),
	#[error("'{0}' isn't a recognized segment format (WAV, FLAC, MP3)")]
	UnknownFormat(String),
	#[error("primary_save_samplerate ({save}) can't exceed primary_in_samplerate ({source_rate})")]
	SaveRateExceedsSourceRate { save: u32, source_rate: u32 },
}

impl Config {
	pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
		let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
		let config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
		config.validate()?;
		Ok(config)
	}

	/// Validates the subset of invariants the distilled spec calls out
	/// explicitly: channel count range, the monitor-channel clamp from
	/// `BMAR_config.py`'s comment, recognized formats, and the save rate
	/// never exceeding the capture rate.
	pub fn validate(&self) -> Result<(), ConfigError> {
		let channels = self.sound_in_chs();
		if channels == 0 || channels > 8 {
			return Err(ConfigError::ChannelCountOutOfRange(channels));
		}
		if !matches!(self.audio_monitor_channels, 1 | 2) {
			return Err(ConfigError::MonitorChannelsOutOfRange(self.audio_monitor_channels));
		}
		self.primary_format()?;
		self.monitor_format()?;
		if let Some(save_rate) = self.primary_save_samplerate {
			if save_rate > self.primary_in_samplerate {
				return Err(ConfigError::SaveRateExceedsSourceRate { save: save_rate, source_rate: self.primary_in_samplerate });
			}
		}
		Ok(())
	}

	#[must_use]
	pub fn sound_in_chs(&self) -> u8 {
		u8::from(self.mic_1) + u8::from(self.mic_2) + u8::from(self.mic_3) + u8::from(self.mic_4)
	}

	#[must_use]
	pub fn mic_positions(&self) -> Vec<MicPosition> {
		let enabled = [self.mic_1, self.mic_2, self.mic_3, self.mic_4];
		self.mic_location
			.iter()
			.zip(enabled)
			.enumerate()
			.map(|(index, (label, active))| MicPosition { index, label: label.clone(), active })
			.collect()
	}

	pub fn primary_bit_depth(&self) -> Result<BitDepth, ConfigError> {
		bit_depth_from_u16(self.primary_bitdepth)
	}

	pub fn primary_format(&self) -> Result<(SegmentFormat, SegmentSubtype), ConfigError> {
		let format = parse_format(&self.primary_file_format)?;
		let subtype = subtype_from_bits(self.primary_bitdepth)?;
		Ok((format, subtype))
	}

	pub fn monitor_format(&self) -> Result<(SegmentFormat, SegmentSubtype), ConfigError> {
		let format = parse_format(&self.audio_monitor_format)?;
		let subtype = subtype_from_bits(self.audio_monitor_bitdepth)?;
		Ok((format, subtype))
	}

	#[must_use]
	pub fn monitor_mp3_quality(&self) -> Mp3Quality {
		if self.audio_monitor_quality <= 9 {
			Mp3Quality::Vbr(self.audio_monitor_quality as u8)
		} else {
			Mp3Quality::Cbr(self.audio_monitor_quality.clamp(64, 320) as u16)
		}
	}

	#[must_use]
	pub fn api_preference(&self) -> Vec<ApiPreference> {
		ApiPreference::platform_default()
	}
}

fn bit_depth_from_u16(bits: u16) -> Result<BitDepth, ConfigError> {
	match bits {
		16 => Ok(BitDepth::Sixteen),
		24 => Ok(BitDepth::TwentyFour),
		32 => Ok(BitDepth::ThirtyTwo),
		other => Err(ConfigError::UnknownFormat(format!("{other}-bit"))),
	}
}

fn subtype_from_bits(bits: u16) -> Result<SegmentSubtype, ConfigError> {
	match bits {
		16 => Ok(SegmentSubtype::Pcm16),
		24 => Ok(SegmentSubtype::Pcm24),
		32 => Ok(SegmentSubtype::Pcm32),
		other => Err(ConfigError::UnknownFormat(format!("{other}-bit"))),
	}
}

fn parse_format(name: &str) -> Result<SegmentFormat, ConfigError> {
	match name.to_uppercase().as_str() {
		"WAV" => Ok(SegmentFormat::Wav),
		"FLAC" => Ok(SegmentFormat::Flac),
		"MP3" => Ok(SegmentFormat::Mp3),
		other => Err(ConfigError::UnknownFormat(other.to_string())),
	}
}

/// One entry of the `m` command's listing, derived from `MIC_LOCATION` /
/// `MIC_1..4` in `BMAR_config.py`.
#[derive(Debug, Clone)]
pub struct MicPosition {
	pub index: usize,
	pub label: String,
	pub active: bool,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_config_validates() {
		Config::default().validate().unwrap();
	}

	#[test]
	fn sound_in_chs_counts_enabled_mics() {
		let config = Config::default();
		assert_eq!(config.sound_in_chs(), 2);
	}

	#[test]
	fn odd_monitor_channel_count_is_rejected() {
		let mut config = Config::default();
		config.audio_monitor_channels = 3;
		assert!(matches!(config.validate(), Err(ConfigError::MonitorChannelsOutOfRange(3))));
	}

	#[test]
	fn save_rate_above_source_rate_is_rejected() {
		let mut config = Config::default();
		config.primary_save_samplerate = Some(config.primary_in_samplerate + 1);
		assert!(matches!(config.validate(), Err(ConfigError::SaveRateExceedsSourceRate { .. })));
	}

	#[test]
	fn tod_window_needs_both_bounds() {
		let tod = TodConfig { start: Some("04:00:00".to_string()), end: None };
		assert!(matches!(tod.parse(), Err(ConfigError::IncompleteTodWindow)));
	}
}
