#[derive(thiserror::Error, Debug)]
pub enum EncoderError {
	#[error("target rate {rate} Hz is not supported by MP3 (must be 44100 or 48000)")]
	Mp3RateUnsupported { rate: u32 },
	#[error("failed to write segment file: {0}")]
	WriteFailed(#[from] std::io::Error),
	#[error("encoder rejected the segment: {0}")]
	EncoderFailed(String),
}
