use std::path::PathBuf;

use crate::error::EncoderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentFormat {
	Wav,
	Flac,
	Mp3,
}

impl SegmentFormat {
	#[must_use]
	pub fn extension(self) -> &'static str {
		match self {
			SegmentFormat::Wav => "wav",
			SegmentFormat::Flac => "flac",
			SegmentFormat::Mp3 => "mp3",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentSubtype {
	Pcm16,
	Pcm24,
	Pcm32,
}

impl SegmentSubtype {
	#[must_use]
	pub fn bits(self) -> u32 {
		match self {
			SegmentSubtype::Pcm16 => 16,
			SegmentSubtype::Pcm24 => 24,
			SegmentSubtype::Pcm32 => 32,
		}
	}
}

/// A finite recording to be emitted as a single file, per §3. Constructing
/// one validates the MP3 rate invariant immediately (IV4): there is no
/// point resolving paths or reading audio for a segment that can never be
/// written.
#[derive(Debug, Clone)]
pub struct Segment {
	pub start_frame: u64,
	pub end_frame: u64,
	pub channels: u16,
	pub source_sample_rate: u32,
	pub target_sample_rate: u32,
	pub format: SegmentFormat,
	pub subtype: SegmentSubtype,
	pub path: PathBuf,
}

impl Segment {
	/// # Errors
	/// [`EncoderError::Mp3RateUnsupported`] if `format` is MP3 and
	/// `target_sample_rate` isn't 44100 or 48000 Hz.
	pub fn new(
		start_frame: u64,
		end_frame: u64,
		channels: u16,
		source_sample_rate: u32,
		target_sample_rate: u32,
		format: SegmentFormat,
		subtype: SegmentSubtype,
		path: PathBuf,
	) -> Result<Self, EncoderError> {
		if format == SegmentFormat::Mp3 && !matches!(target_sample_rate, 44_100 | 48_000) {
			return Err(EncoderError::Mp3RateUnsupported {
				rate: target_sample_rate,
			});
		}
		Ok(Self {
			start_frame,
			end_frame,
			channels,
			source_sample_rate,
			target_sample_rate,
			format,
			subtype,
			path,
		})
	}

	#[must_use]
	pub fn n_of_frames(&self) -> u64 {
		self.end_frame - self.start_frame
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn mp3_at_illegal_rate_is_rejected_at_construction() {
		let result = Segment::new(
			0,
			1000,
			1,
			48_000,
			22_050,
			SegmentFormat::Mp3,
			SegmentSubtype::Pcm16,
			PathBuf::from("out.mp3"),
		);
		assert!(matches!(result, Err(EncoderError::Mp3RateUnsupported { rate: 22_050 })));
	}

	#[test]
	fn mp3_at_legal_rates_is_accepted() {
		for rate in [44_100, 48_000] {
			assert!(Segment::new(
				0,
				1000,
				1,
				48_000,
				rate,
				SegmentFormat::Mp3,
				SegmentSubtype::Pcm16,
				PathBuf::from("out.mp3"),
			)
			.is_ok());
		}
	}
}
