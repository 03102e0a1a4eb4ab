//! Cascaded-biquad Butterworth filters.
//!
//! `biquad` only synthesizes second-order sections, so an odd-order
//! Butterworth response is built the textbook way: one first-order
//! real-pole section plus `(order - 1) / 2` second-order sections, each
//! sharing the same cutoff but with the Q of that section's conjugate pole
//! pair. The per-section Q values below are the standard Butterworth
//! cascade table (Rane Note 165).

use biquad::{Biquad as _, Coefficients, DirectForm1, ToHertz, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
	LowPass,
	HighPass,
}

fn section_qs(order: usize) -> (bool, Vec<f32>) {
	match order {
		1 => (true, vec![]),
		2 => (false, vec![0.7071]),
		3 => (true, vec![1.0]),
		4 => (false, vec![0.5412, 1.3065]),
		5 => (true, vec![0.6180, 1.6180]),
		6 => (false, vec![0.5176, 0.7071, 1.9319]),
		_ => panic!("unsupported butterworth order {order} (only 1..=6 are tabulated)"),
	}
}

/// A single real-pole section, built directly from the bilinear transform
/// of `H(s) = wc / (s + wc)` (lowpass) or `H(s) = s / (s + wc)` (highpass).
#[derive(Debug, Clone, Copy)]
struct OnePole {
	b0: f32,
	b1: f32,
	a1: f32,
	x_prev: f32,
	y_prev: f32,
}

impl OnePole {
	fn new(kind: FilterKind, fs_hz: f32, fc_hz: f32) -> Self {
		let wc = 2.0 * fs_hz * (std::f32::consts::PI * fc_hz / fs_hz).tan();
		let k = wc / (2.0 * fs_hz + wc);
		let a1 = (wc - 2.0 * fs_hz) / (wc + 2.0 * fs_hz);
		let (b0, b1) = match kind {
			FilterKind::LowPass => (k, k),
			FilterKind::HighPass => {
				let h = 2.0 * fs_hz / (wc + 2.0 * fs_hz);
				(h, -h)
			}
		};
		Self {
			b0,
			b1,
			a1,
			x_prev: 0.0,
			y_prev: 0.0,
		}
	}

	fn run(&mut self, x: f32) -> f32 {
		let y = self.b0 * x + self.b1 * self.x_prev - self.a1 * self.y_prev;
		self.x_prev = x;
		self.y_prev = y;
		y
	}

	fn reset_state(&mut self) {
		self.x_prev = 0.0;
		self.y_prev = 0.0;
	}
}

/// An `order`-pole Butterworth low- or high-pass filter, run one channel at
/// a time.
pub struct ButterworthFilter {
	one_pole: Option<OnePole>,
	sections: Vec<DirectForm1<f32>>,
}

impl ButterworthFilter {
	/// # Panics
	/// If `order` isn't in `1..=6`, or `cutoff_hz` isn't below the Nyquist
	/// frequency of `sample_rate_hz`.
	#[must_use]
	pub fn new(kind: FilterKind, order: usize, sample_rate_hz: f32, cutoff_hz: f32) -> Self {
		assert!(
			cutoff_hz > 0.0 && cutoff_hz < sample_rate_hz / 2.0,
			"cutoff {cutoff_hz} must be within (0, nyquist) of sample rate {sample_rate_hz}"
		);
		let (needs_one_pole, qs) = section_qs(order);
		let biquad_type = match kind {
			FilterKind::LowPass => Type::LowPass,
			FilterKind::HighPass => Type::HighPass,
		};
		let sections = qs
			.into_iter()
			.map(|q| {
				let coeffs = Coefficients::<f32>::from_params(
					biquad_type,
					sample_rate_hz.hz(),
					cutoff_hz.hz(),
					q,
				)
				.expect("cutoff/sample-rate pair must yield stable biquad coefficients");
				DirectForm1::<f32>::new(coeffs)
			})
			.collect();
		Self {
			one_pole: needs_one_pole.then(|| OnePole::new(kind, sample_rate_hz, cutoff_hz)),
			sections,
		}
	}

	pub fn run(&mut self, x: f32) -> f32 {
		let mut y = x;
		if let Some(one_pole) = &mut self.one_pole {
			y = one_pole.run(y);
		}
		for section in &mut self.sections {
			y = section.run(y);
		}
		y
	}

	pub fn reset_state(&mut self) {
		if let Some(one_pole) = &mut self.one_pole {
			one_pole.reset_state();
		}
		for section in &mut self.sections {
			section.reset_state();
		}
	}

	/// Filters `signal` in place, one pass, preserving group delay (i.e.
	/// introducing phase lag). Used on the live capture path where latency
	/// matters more than phase fidelity.
	pub fn apply_causal(&mut self, signal: &mut [f32]) {
		for s in signal.iter_mut() {
			*s = self.run(*s);
		}
	}

	/// Filters `signal` forward then backward, cancelling phase distortion
	/// at the cost of running the whole buffer twice. Only sensible on
	/// already-captured, finite segments.
	pub fn apply_zero_phase(&mut self, signal: &mut [f32]) {
		self.reset_state();
		self.apply_causal(signal);
		signal.reverse();
		self.reset_state();
		self.apply_causal(signal);
		signal.reverse();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sine(freq: f32, fs: f32, n: usize) -> Vec<f32> {
		(0..n)
			.map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / fs).sin())
			.collect()
	}

	fn rms(signal: &[f32]) -> f32 {
		(signal.iter().map(|v| v * v).sum::<f32>() / signal.len() as f32).sqrt()
	}

	#[test]
	fn lowpass_attenuates_above_cutoff() {
		let fs = 48_000.0;
		let mut filt = ButterworthFilter::new(FilterKind::LowPass, 5, fs, 4_000.0);
		let mut high = sine(18_000.0, fs, 4096);
        let original_rms = rms(&high);
		filt.apply_zero_phase(&mut high);
		assert!(rms(&high) < original_rms * 0.1);
	}

	#[test]
	fn lowpass_passes_below_cutoff() {
		let fs = 48_000.0;
		let mut filt = ButterworthFilter::new(FilterKind::LowPass, 5, fs, 10_000.0);
		let mut low = sine(200.0, fs, 4096);
		let original_rms = rms(&low);
		filt.apply_zero_phase(&mut low);
		assert!(rms(&low) > original_rms * 0.8);
	}

	#[test]
	fn highpass_attenuates_below_cutoff() {
		let fs = 48_000.0;
		let mut filt = ButterworthFilter::new(FilterKind::HighPass, 6, fs, 20_000.0);
		let mut low = sine(500.0, fs, 4096);
		let original_rms = rms(&low);
		filt.apply_zero_phase(&mut low);
		assert!(rms(&low) < original_rms * 0.1);
	}
}
