use std::path::Path;

use mp3lame_encoder::{Bitrate, Builder, FlushNoGap, InterleavedPcm, Quality};

use crate::error::EncoderError;

/// Either VBR quality (0 = best, 9 = worst) or a fixed bitrate in kbps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mp3Quality {
	Vbr(u8),
	Cbr(u16),
}

fn nearest_bitrate(kbps: u16) -> Bitrate {
	const TABLE: &[(u16, Bitrate)] = &[
		(32, Bitrate::Kbps32),
		(40, Bitrate::Kbps40),
		(48, Bitrate::Kbps48),
		(64, Bitrate::Kbps64),
		(80, Bitrate::Kbps80),
		(96, Bitrate::Kbps96),
		(112, Bitrate::Kbps112),
		(128, Bitrate::Kbps128),
		(160, Bitrate::Kbps160),
		(192, Bitrate::Kbps192),
		(224, Bitrate::Kbps224),
		(256, Bitrate::Kbps256),
		(320, Bitrate::Kbps320),
	];
	TABLE
		.iter()
		.min_by_key(|(candidate, _)| candidate.abs_diff(kbps))
		.map_or(Bitrate::Kbps192, |(_, rate)| *rate)
}

fn quality_from_u8(q: u8) -> Quality {
	match q {
		0 => Quality::Best,
		1 => Quality::SecondBest,
		2 => Quality::NearBest,
		3 => Quality::VeryNice,
		4 => Quality::Nice,
		5 => Quality::Good,
		6 => Quality::Decent,
		7 => Quality::Ok,
		8 => Quality::SecondWorst,
		_ => Quality::Worst,
	}
}

/// Encodes interleaved `i16` PCM (channel-major) to an MP3 file. Callers
/// must have already validated the sample rate via [`crate::Segment::new`]
/// (IV4) — this function assumes it's 44100 or 48000 Hz.
pub fn write_mp3(
	path: &Path,
	interleaved: &[i16],
	channels: u8,
	sample_rate: u32,
	quality: Mp3Quality,
) -> Result<(), EncoderError> {
	let mut builder = Builder::new()
		.ok_or_else(|| EncoderError::EncoderFailed("failed to initialize LAME".to_string()))?;
	builder
		.set_num_channels(channels)
		.map_err(|e| EncoderError::EncoderFailed(format!("{e:?}")))?;
	builder
		.set_sample_rate(sample_rate)
		.map_err(|e| EncoderError::EncoderFailed(format!("{e:?}")))?;
	match quality {
		Mp3Quality::Vbr(q) => {
			builder
				.set_quality(quality_from_u8(q.min(9)))
				.map_err(|e| EncoderError::EncoderFailed(format!("{e:?}")))?;
		}
		Mp3Quality::Cbr(kbps) => {
			builder
				.set_brate(nearest_bitrate(kbps))
				.map_err(|e| EncoderError::EncoderFailed(format!("{e:?}")))?;
		}
	}
	let mut encoder = builder
		.build()
		.map_err(|e| EncoderError::EncoderFailed(format!("{e:?}")))?;

	let n_of_frames = interleaved.len() / channels.max(1) as usize;
	let mut output = Vec::with_capacity(mp3lame_encoder::max_required_buffer_size(n_of_frames));
	let encoded_len = encoder
		.encode(InterleavedPcm(interleaved), output.spare_capacity_mut())
		.map_err(|e| EncoderError::EncoderFailed(format!("{e:?}")))?;
	// SAFETY: `encode` initialized exactly `encoded_len` bytes of spare capacity.
	unsafe {
		output.set_len(output.len() + encoded_len);
	}
	let flushed_len = encoder
		.flush::<FlushNoGap>(output.spare_capacity_mut())
		.map_err(|e| EncoderError::EncoderFailed(format!("{e:?}")))?;
	// SAFETY: same as above, for the flush tail.
	unsafe {
		output.set_len(output.len() + flushed_len);
	}

	std::fs::write(path, output)?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn nearest_bitrate_snaps_to_known_values() {
		assert!(matches!(nearest_bitrate(130), Bitrate::Kbps128));
		assert!(matches!(nearest_bitrate(1), Bitrate::Kbps32));
	}
}
