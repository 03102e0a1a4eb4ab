use std::path::Path;

use flacenc::component::BitRepr;
use flacenc::error::Verify;
use flacenc::source::MemSource;

use crate::error::EncoderError;
use crate::segment::SegmentSubtype;

/// Writes interleaved `i32` samples (channel-major) as a FLAC file. FLAC's
/// own bit-packing handles PCM_24 natively, so no separate packing step is
/// needed before handing samples to the encoder.
pub fn write_flac(
	path: &Path,
	interleaved: &[i32],
	channels: u16,
	sample_rate: u32,
	subtype: SegmentSubtype,
) -> Result<(), EncoderError> {
	let config = flacenc::config::Encoder::default()
		.into_verified()
		.map_err(|(_, e)| EncoderError::EncoderFailed(format!("{e:?}")))?;
	let source = MemSource::from_samples(
		interleaved,
		channels as usize,
		subtype.bits() as usize,
		sample_rate as usize,
	);
	let stream =
		flacenc::encode_with_fixed_block_size(&config, source, config.block_size)
			.map_err(|e| EncoderError::EncoderFailed(format!("{e:?}")))?;

	let mut sink = flacenc::bitsink::ByteSink::new();
	stream
		.write(&mut sink)
		.map_err(|e| EncoderError::EncoderFailed(format!("{e:?}")))?;
	std::fs::write(path, sink.as_slice())?;
	Ok(())
}
