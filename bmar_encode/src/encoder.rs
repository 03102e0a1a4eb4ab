use crate::error::EncoderError;
use crate::flac::write_flac;
use crate::mp3::{write_mp3, Mp3Quality};
use crate::segment::{Segment, SegmentFormat, SegmentSubtype};
use crate::wav::write_wav;

/// Narrows canonical `i32` samples down to the 16-bit range LAME expects,
/// regardless of the segment's nominal bit depth.
fn narrow_to_i16(interleaved: &[i32], subtype: SegmentSubtype) -> Vec<i16> {
	let shift = subtype.bits().saturating_sub(16);
	interleaved
		.iter()
		.map(|&s| (s >> shift).clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16)
		.collect()
}

/// Writes `segment` to disk from already-decimated, already-gained
/// interleaved samples. The caller (the scheduler) owns directory creation;
/// this never creates directories, per §4.4.
pub fn write_segment(
	segment: &Segment,
	interleaved: &[i32],
	mp3_quality: Mp3Quality,
) -> Result<(), EncoderError> {
	match segment.format {
		SegmentFormat::Wav => write_wav(
			&segment.path,
			interleaved,
			segment.channels,
			segment.target_sample_rate,
			segment.subtype,
		),
		SegmentFormat::Flac => write_flac(
			&segment.path,
			interleaved,
			segment.channels,
			segment.target_sample_rate,
			segment.subtype,
		),
		SegmentFormat::Mp3 => {
			let narrowed = narrow_to_i16(interleaved, segment.subtype);
			write_mp3(
				&segment.path,
				&narrowed,
				segment.channels as u8,
				segment.target_sample_rate,
				mp3_quality,
			)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::segment::SegmentSubtype;
	use tempfile::tempdir;

	#[test]
	fn narrow_to_i16_preserves_sign_and_range() {
		let samples = [i32::from(i16::MAX) << 8, i32::from(i16::MIN) << 8, 0];
		let narrowed = narrow_to_i16(&samples, SegmentSubtype::Pcm24);
		assert_eq!(narrowed, [i16::MAX, i16::MIN, 0]);
	}

	#[test]
	fn write_segment_dispatches_by_format() {
		let dir = tempdir().unwrap();
		let samples: Vec<i32> = (0..4800).map(|i| ((i % 300) - 150) * 100).collect();
		let segment = Segment::new(
			0,
			4800,
			1,
			48_000,
			48_000,
			SegmentFormat::Wav,
			SegmentSubtype::Pcm16,
			dir.path().join("seg.wav"),
		)
		.unwrap();
		write_segment(&segment, &samples, Mp3Quality::Vbr(4)).unwrap();
		assert!(segment.path.exists());
	}
}
