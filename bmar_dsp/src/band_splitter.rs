use crate::butterworth::{ButterworthFilter, FilterKind};

/// Splits a single channel's signal into a low band and a high band around
/// `cutoff_hz`, used only by renderer diagnostics (e.g. separating
/// ultrasonic content for its own spectrogram) and an offline analysis
/// utility — never on the live capture path, so filtering is always
/// zero-phase.
pub struct BandSplitter {
	low: ButterworthFilter,
	high: ButterworthFilter,
}

impl BandSplitter {
	#[must_use]
	pub fn new(order: usize, sample_rate_hz: f32, cutoff_hz: f32) -> Self {
		Self {
			low: ButterworthFilter::new(FilterKind::LowPass, order, sample_rate_hz, cutoff_hz),
			high: ButterworthFilter::new(FilterKind::HighPass, order, sample_rate_hz, cutoff_hz),
		}
	}

	/// Returns `(low_band, high_band)`, each the same length as `signal`.
	#[must_use]
	pub fn split(&mut self, signal: &[f32]) -> (Vec<f32>, Vec<f32>) {
		let mut low = signal.to_vec();
		self.low.apply_zero_phase(&mut low);
		let mut high = signal.to_vec();
		self.high.apply_zero_phase(&mut high);
		(low, high)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn low_and_high_bands_sum_roughly_to_input_energy() {
		let fs = 96_000.0;
		let n = 4096;
		let low_tone: Vec<f32> = (0..n)
			.map(|i| (2.0 * std::f32::consts::PI * 1_000.0 * i as f32 / fs).sin())
			.collect();
		let mut splitter = BandSplitter::new(5, fs, 20_000.0);
		let (low, high) = splitter.split(&low_tone);
		let low_rms = (low.iter().map(|v| v * v).sum::<f32>() / n as f32).sqrt();
		let high_rms = (high.iter().map(|v| v * v).sum::<f32>() / n as f32).sqrt();
		assert!(low_rms > 0.5);
		assert!(high_rms < 0.2);
	}
}
