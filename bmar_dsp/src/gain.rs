use bmar_ring::BitDepth;

/// Applies `gain_db` to canonical `i32` samples in place, per the numeric
/// policy in §4.3: convert to `f32` scaled by `1/max_value`, multiply,
/// clamp to `[-1, 1]`, and reconvert. Used for both renderer gain controls
/// and the scheduler's pre-write headroom attenuation.
pub fn apply_gain_db(samples: &mut [i32], bit_depth: BitDepth, gain_db: f32) {
	if gain_db == 0.0 {
		return;
	}
	let scale = bit_depth.max_value() as f32;
	let factor = 10f32.powf(gain_db / 20.0);
	for s in samples.iter_mut() {
		let normalized = *s as f32 / scale;
		*s = (normalized * factor).clamp(-1.0, 1.0).mul_add(scale, 0.0) as i32;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn zero_db_is_a_no_op() {
		let mut samples = vec![100, -200, 300];
		let original = samples.clone();
		apply_gain_db(&mut samples, BitDepth::Sixteen, 0.0);
		assert_eq!(samples, original);
	}

	#[test]
	fn negative_headroom_attenuates() {
		let mut samples = vec![10_000, -10_000];
		apply_gain_db(&mut samples, BitDepth::Sixteen, -6.0);
		assert!(samples[0].abs() < 10_000);
		assert!(samples[0] > 4_000);
	}

	#[test]
	fn positive_gain_clamps_at_full_scale() {
		let mut samples = vec![BitDepth::Sixteen.max_value()];
		apply_gain_db(&mut samples, BitDepth::Sixteen, 20.0);
		assert_eq!(samples[0], BitDepth::Sixteen.max_value());
	}
}
