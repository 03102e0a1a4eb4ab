#[derive(thiserror::Error, Debug)]
pub enum RenderError {
	#[error("failed to draw plot: {0}")]
	Plotting(String),
	#[error("failed to read source audio file: {0}")]
	SourceRead(#[from] hound::Error),
	#[error("no primary-format files found to render a spectrogram from")]
	NoSourceFile,
	#[error("spectrogram source file format is not readable (only WAV is supported)")]
	UnsupportedSourceFormat,
	#[error(transparent)]
	Io(#[from] std::io::Error),
	#[error("duration_s must be positive, got {0}")]
	NonPositiveDuration(f32),
}
