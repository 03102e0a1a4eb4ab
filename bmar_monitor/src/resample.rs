/// Linear-interpolation resample from `input_rate_hz` to `output_rate_hz`.
/// Quality is explicitly not a goal for the intercom path (§4.8): this
/// trades fidelity for a stateless, allocation-light implementation safe to
/// call from an audio callback.
#[must_use]
pub fn linear_resample(input: &[f32], input_rate_hz: u32, output_rate_hz: u32) -> Vec<f32> {
	if input.is_empty() || input_rate_hz == output_rate_hz {
		return input.to_vec();
	}
	let ratio = f64::from(input_rate_hz) / f64::from(output_rate_hz);
	let out_len = ((input.len() as f64) / ratio).floor() as usize;
	(0..out_len)
		.map(|i| {
			let src_pos = i as f64 * ratio;
			let i0 = src_pos.floor() as usize;
			let frac = (src_pos - i0 as f64) as f32;
			let s0 = input[i0.min(input.len() - 1)];
			let s1 = input[(i0 + 1).min(input.len() - 1)];
			s0 + (s1 - s0) * frac
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn same_rate_is_identity() {
		let input = vec![0.1, 0.2, 0.3];
		assert_eq!(linear_resample(&input, 48_000, 48_000), input);
	}

	#[test]
	fn upsampling_lengthens_the_signal() {
		let input = vec![0.0, 1.0, 0.0, -1.0];
		let out = linear_resample(&input, 24_000, 48_000);
		assert_eq!(out.len(), 8);
	}

	#[test]
	fn downsampling_shortens_the_signal() {
		let input = vec![0.0; 48_000];
		let out = linear_resample(&input, 48_000, 24_000);
		assert_eq!(out.len(), 24_000);
	}
}
