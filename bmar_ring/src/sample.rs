/// Canonical in-memory sample representation. The ring always stores `i32`
/// regardless of the configured capture bit depth (16/24/32), so the hot
/// write path never branches on format: narrowing or widening to the
/// configured depth happens once, at encode time, in `bmar_encode`.
pub type Sample = i32;

/// The PCM bit depth a capture device was opened with. Carried alongside a
/// [`crate::RingBuffer`] by callers that need it (the encoder, mostly) since
/// the ring itself is agnostic to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
	Sixteen,
	TwentyFour,
	ThirtyTwo,
}

impl BitDepth {
	#[must_use]
	pub fn max_value(self) -> i32 {
		match self {
			BitDepth::Sixteen => i32::from(i16::MAX),
			BitDepth::TwentyFour => (1 << 23) - 1,
			BitDepth::ThirtyTwo => i32::MAX,
		}
	}

	#[must_use]
	pub fn bits(self) -> u32 {
		match self {
			BitDepth::Sixteen => 16,
			BitDepth::TwentyFour => 24,
			BitDepth::ThirtyTwo => 32,
		}
	}
}
