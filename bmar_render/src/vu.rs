const MAX_ASTERISKS: usize = 50;

/// Maps a block's peak absolute amplitude to 0..50 asterisks, printed with
/// carriage-return overprint by the caller. `channel` exceeding the
/// device's channel count is the caller's responsibility to detect and
/// silently reduce to channel 0, per §4.7.
#[must_use]
pub fn vu_bar(peak_abs: i32, max_value: i32) -> String {
	let ratio = (f64::from(peak_abs) / f64::from(max_value)).clamp(0.0, 1.0);
	let n = (ratio * MAX_ASTERISKS as f64).round() as usize;
	"*".repeat(n)
}

/// Overprints `bar` on the current terminal line.
pub fn print_vu_line(bar: &str) {
	print!("\r{bar:<width$}", width = MAX_ASTERISKS);
	let _ = std::io::Write::flush(&mut std::io::stdout());
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn full_scale_is_fifty_asterisks() {
		assert_eq!(vu_bar(32_768, 32_768).len(), MAX_ASTERISKS);
	}

	#[test]
	fn silence_is_empty() {
		assert_eq!(vu_bar(0, 32_768), "");
	}

	#[test]
	fn overrange_clamps_to_fifty() {
		assert_eq!(vu_bar(100_000, 32_768).len(), MAX_ASTERISKS);
	}
}
