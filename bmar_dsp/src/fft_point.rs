#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FftPoint {
	pub magnitude: f32,
	pub frequency: f32,
}
