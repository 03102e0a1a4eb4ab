use crate::butterworth::{ButterworthFilter, FilterKind};

/// Anti-aliased integer-ratio downsampler, one instance per channel.
///
/// The ratio `M = round(source_rate / target_rate)` is fixed at
/// construction. `M < 2` degenerates to a pass-through (no filtering, no
/// resampling) and `M` values that don't divide evenly are rounded, per the
/// anti-alias decimation contract: exact-rate matching is not guaranteed,
/// only that the output stays below its own Nyquist.
pub struct Decimator {
	ratio: usize,
	filter: Option<ButterworthFilter>,
}

impl Decimator {
	/// # Panics
	/// If `target_rate_hz` is below 8 kHz (the minimum supported target) or
	/// above `source_rate_hz`.
	#[must_use]
	pub fn new(source_rate_hz: u32, target_rate_hz: u32) -> Self {
		assert!(
			target_rate_hz >= 8_000,
			"decimator target rate must be at least 8 kHz, got {target_rate_hz}"
		);
		assert!(
			target_rate_hz <= source_rate_hz,
			"decimator target rate {target_rate_hz} must not exceed source rate {source_rate_hz}"
		);
		#[allow(clippy::cast_precision_loss)]
		let ratio = (f64::from(source_rate_hz) / f64::from(target_rate_hz)).round() as usize;
		let filter = (ratio >= 2).then(|| {
			#[allow(clippy::cast_precision_loss)]
			let cutoff = 0.5 * target_rate_hz as f32;
			ButterworthFilter::new(FilterKind::LowPass, 5, source_rate_hz as f32, cutoff)
		});
		Self { ratio, filter }
	}

	#[must_use]
	pub fn ratio(&self) -> usize {
		self.ratio
	}

	#[must_use]
	pub fn is_pass_through(&self) -> bool {
		self.filter.is_none()
	}

	/// Decimates a single channel's samples, filtering causally (one pass):
	/// appropriate for the live capture path, where latency matters more
	/// than phase fidelity.
	pub fn process_causal(&mut self, input: &[f32]) -> Vec<f32> {
		let Some(filter) = &mut self.filter else {
			return input.to_vec();
		};
		let mut filtered = input.to_vec();
		filter.apply_causal(&mut filtered);
		filtered.into_iter().step_by(self.ratio).collect()
	}

	/// Decimates a single channel's samples with zero-phase (forward then
	/// reverse) filtering: appropriate for finite, already-captured
	/// segments where latency is irrelevant.
	pub fn process_offline(&mut self, input: &[f32]) -> Vec<f32> {
		let Some(filter) = &mut self.filter else {
			return input.to_vec();
		};
		let mut filtered = input.to_vec();
		filter.apply_zero_phase(&mut filtered);
		filtered.into_iter().step_by(self.ratio).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ratio_below_two_is_pass_through() {
		let mut d = Decimator::new(48_000, 44_100);
		assert!(d.is_pass_through());
		let input: Vec<f32> = (0..100).map(|i| i as f32).collect();
		assert_eq!(d.process_offline(&input), input);
	}

	#[test]
	fn ratio_rounds_to_nearest_integer() {
		let d = Decimator::new(192_000, 48_000);
		assert_eq!(d.ratio(), 4);
	}

	#[test]
	fn output_length_matches_ratio() {
		let mut d = Decimator::new(192_000, 48_000);
		let input = vec![0.0f32; 4000];
		let output = d.process_offline(&input);
		assert_eq!(output.len(), 1000);
	}

	#[test]
	fn tone_survives_decimation_within_passband() {
		let fs = 192_000.0;
		let n = 8192;
		let tone_hz = 1_000.0;
		let input: Vec<f32> = (0..n)
			.map(|i| (2.0 * std::f32::consts::PI * tone_hz * i as f32 / fs).sin())
			.collect();
		let mut d = Decimator::new(192_000, 48_000);
		let output = d.process_offline(&input);
		let output_rms = (output.iter().map(|v| v * v).sum::<f32>() / output.len() as f32).sqrt();
		assert!(output_rms > 0.5, "expected in-band tone to survive, got rms {output_rms}");
	}
}
