use std::ops::RangeInclusive;

#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn index_to_frequency(index: usize, sample_rate: usize, n_of_samples: usize) -> f32 {
	index as f32 * sample_rate as f32 / n_of_samples as f32
}

/// The real-valued frequency represented by each FFT bin up to and
/// including the Nyquist bin.
pub fn fft_frequency_bins(sample_rate: usize, n_of_samples: usize) -> impl Iterator<Item = f32> {
	(0..=n_of_samples / 2).map(move |i| index_to_frequency(i, sample_rate, n_of_samples))
}

/// The inclusive range of bin indices whose frequency falls within
/// `frequency_range`. Falls back to the full Nyquist range if the
/// requested band is empty.
#[must_use]
pub fn filtered_frequency_index_range(
	sample_rate: usize,
	n_of_samples: usize,
	frequency_range: (f32, f32),
) -> RangeInclusive<usize> {
	let (lo, hi) = frequency_range;
	let nyquist_index = n_of_samples / 2;
	let start = fft_frequency_bins(sample_rate, n_of_samples)
		.position(|f| f >= lo)
		.unwrap_or(0);
	let end = fft_frequency_bins(sample_rate, n_of_samples)
		.enumerate()
		.filter(|(_, f)| *f <= hi)
		.map(|(i, _)| i)
		.last()
		.unwrap_or(nyquist_index);
	start..=end.max(start)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn index_to_frequency_matches_bin_zero_and_nyquist() {
		assert_eq!(index_to_frequency(0, 48_000, 1024), 0.0);
		let nyquist_bin = index_to_frequency(512, 48_000, 1024);
		assert!((nyquist_bin - 24_000.0).abs() < 1e-3);
	}

	#[test]
	fn filtered_range_narrows_to_requested_band() {
		let range = filtered_frequency_index_range(48_000, 1024, (1_000.0, 2_000.0));
		let bins: Vec<f32> = fft_frequency_bins(48_000, 1024).collect();
		assert!(bins[*range.start()] >= 1_000.0 - 1.0);
		assert!(bins[*range.end()] <= 2_000.0 + 1.0);
	}
}
