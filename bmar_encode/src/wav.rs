use std::path::Path;

use crate::error::EncoderError;
use crate::segment::SegmentSubtype;

/// Writes interleaved `i32` samples (channel-major, already widened/narrowed
/// to `subtype`'s bit depth) as a PCM WAV file.
pub fn write_wav(
	path: &Path,
	interleaved: &[i32],
	channels: u16,
	sample_rate: u32,
	subtype: SegmentSubtype,
) -> Result<(), EncoderError> {
	let spec = hound::WavSpec {
		channels,
		sample_rate,
		bits_per_sample: subtype.bits() as u16,
		sample_format: hound::SampleFormat::Int,
	};
	let mut writer = hound::WavWriter::create(path, spec)
		.map_err(|e| EncoderError::EncoderFailed(e.to_string()))?;
	for &sample in interleaved {
		writer
			.write_sample(sample)
			.map_err(|e| EncoderError::EncoderFailed(e.to_string()))?;
	}
	writer
		.finalize()
		.map_err(|e| EncoderError::EncoderFailed(e.to_string()))?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::tempdir;

	#[test]
	fn writes_a_readable_wav_file() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("seg.wav");
		let samples: Vec<i32> = (0..2000).map(|i| (i % 200) - 100).collect();
		write_wav(&path, &samples, 1, 48_000, SegmentSubtype::Pcm16).unwrap();

		let mut reader = hound::WavReader::open(&path).unwrap();
		assert_eq!(reader.spec().sample_rate, 48_000);
		assert_eq!(reader.spec().channels, 1);
		let read_back: Vec<i32> = reader.samples::<i32>().map(Result::unwrap).collect();
		assert_eq!(read_back.len(), samples.len());
	}
}
