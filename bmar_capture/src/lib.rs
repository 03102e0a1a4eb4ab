//! Owns the single input device stream and copies its callback data into a
//! shared [`bmar_ring::RingBuffer`]. Device acquisition follows a
//! configured-id → API-preference → full-enumeration probe order, with a
//! per-candidate rate fallback chain.

mod config;
pub use config::*;

mod engine;
pub use engine::*;

mod probe;
pub use probe::*;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_config_is_sane() {
		let config = CaptureConfig::default();
		assert!(config.channels >= 1);
		assert!(config.sample_rate_hz >= 8_000);
	}
}
