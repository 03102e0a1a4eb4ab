use std::{ops::RangeInclusive, sync::Arc};

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::{
	fft_point::FftPoint,
	utils::{fft_frequency_bins, filtered_frequency_index_range, index_to_frequency},
	windowing::WindowingFn,
};

/// Windowed FFT analyzer reused across a short-time transform: holds its
/// plan and scratch buffers so that a caller running an STFT over many
/// overlapping windows doesn't replan or reallocate per window.
pub struct StftAnalyzer {
	sample_rate: usize,
	samples_per_window: usize,
	windowing_fn: Box<dyn WindowingFn + Send + 'static>,
	frequency_indices: RangeInclusive<usize>,
	fft_processor: Arc<dyn Fft<f32>>,
	complex_signal: Vec<Complex<f32>>,
	cur_transform: Vec<FftPoint>,
}

impl StftAnalyzer {
	pub fn new(
		sample_rate: usize,
		samples_per_window: usize,
		frequency_range: (f32, f32),
		windowing_fn: impl WindowingFn + Send + 'static,
	) -> Self {
		let mut planner = FftPlanner::new();
		let frequency_indices =
			filtered_frequency_index_range(sample_rate, samples_per_window, frequency_range);
		Self {
			sample_rate,
			samples_per_window,
			windowing_fn: Box::new(windowing_fn) as Box<dyn WindowingFn + Send + 'static>,
			frequency_indices: frequency_indices.clone(),
			fft_processor: planner.plan_fft_forward(samples_per_window),
			complex_signal: vec![Complex { re: 0., im: 0. }; samples_per_window],
			cur_transform: vec![
				FftPoint {
					magnitude: 0.,
					frequency: 0.
				};
				frequency_indices.count()
			],
		}
	}

	#[must_use]
	pub fn frequency_bins(&self) -> Vec<f32> {
		fft_frequency_bins(self.sample_rate, self.samples_per_window)
			.skip(*self.frequency_indices.start())
			.take(self.frequency_indices.clone().count())
			.collect()
	}

	/// Analyzes a window of time-domain samples at the configured sample
	/// rate. The returned slice is sorted by frequency.
	///
	/// # Panics
	/// If `signal.len()` doesn't match the configured window size.
	pub fn analyze(&mut self, signal: &[f32]) -> &[FftPoint] {
		let samples = signal.len();
		assert_eq!(
			samples, self.samples_per_window,
			"signal with incompatible length received"
		);

		for (i, c) in self.complex_signal.iter_mut().enumerate() {
			*c = Complex::new(
				signal[i] * self.windowing_fn.ratio_at(i, self.samples_per_window),
				0.0,
			);
		}

		self.fft_processor.process(&mut self.complex_signal);

		// https://docs.rs/rustfft/6.2.0/rustfft/index.html#normalization
		#[allow(clippy::cast_precision_loss)]
		let normalization_factor = 1.0 / (samples as f32).sqrt();

		for (transform_i, complex_i) in self.frequency_indices.clone().enumerate() {
			self.cur_transform[transform_i] = FftPoint {
				frequency: index_to_frequency(complex_i, self.sample_rate, samples),
				magnitude: (self.complex_signal[complex_i] * normalization_factor).norm(),
			};
		}

		&self.cur_transform
	}
}

/// Runs an [`StftAnalyzer`] over overlapping windows of a signal, returning
/// one transform per hop. `hop_size` is typically half or a quarter of
/// `samples_per_window` for a spectrogram; equal to it for no overlap.
pub fn short_time_transform(
	analyzer: &mut StftAnalyzer,
	signal: &[f32],
	samples_per_window: usize,
	hop_size: usize,
) -> Vec<Vec<FftPoint>> {
	assert!(hop_size > 0, "hop size must be nonzero");
	if signal.len() < samples_per_window {
		return Vec::new();
	}
	let mut frames = Vec::new();
	let mut start = 0;
	while start + samples_per_window <= signal.len() {
		frames.push(analyzer.analyze(&signal[start..start + samples_per_window]).to_vec());
		start += hop_size;
	}
	frames
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::windowing::HannWindow;

	#[test]
	fn single_tone_peaks_near_its_frequency() {
		let fs = 48_000;
		let window = 1024;
		let tone_hz = 2_000.0;
		let signal: Vec<f32> = (0..window)
			.map(|i| (2.0 * std::f32::consts::PI * tone_hz * i as f32 / fs as f32).sin())
			.collect();
		let mut analyzer = StftAnalyzer::new(fs, window, (0.0, fs as f32 / 2.0), HannWindow::new());
		let transform = analyzer.analyze(&signal);
		let peak = transform
			.iter()
			.max_by(|a, b| a.magnitude.partial_cmp(&b.magnitude).unwrap())
			.unwrap();
		assert!((peak.frequency - tone_hz).abs() < 100.0);
	}

	#[test]
	fn short_time_transform_emits_one_frame_per_hop() {
		let fs = 48_000;
		let window = 256;
		let hop = 128;
		let signal = vec![0.0f32; 256 * 4];
		let mut analyzer = StftAnalyzer::new(fs, window, (0.0, fs as f32 / 2.0), HannWindow::new());
		let frames = short_time_transform(&mut analyzer, &signal, window, hop);
		assert_eq!(frames.len(), (signal.len() - window) / hop + 1);
	}
}
