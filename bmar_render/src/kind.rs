/// The dispatcher's one-per-kind registry key (§4.7). Launching a new job
/// of a given kind cancels whichever instance of that kind is already
/// running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderKind {
	Scope,
	Fft,
	Spectrogram,
	Vu,
	Monitor,
	Perf,
}

impl RenderKind {
	/// `scope`/`fft` get `duration_s + 30s`, `spectrogram` gets a flat 240s;
	/// continuous kinds (`vu`, `monitor`, `perf` in its continuous form) are
	/// cancelled explicitly and have no dispatcher-owned timeout.
	#[must_use]
	pub fn default_timeout_secs(self, duration_s: f32) -> Option<f32> {
		match self {
			RenderKind::Scope | RenderKind::Fft => Some(duration_s + 30.0),
			RenderKind::Spectrogram => Some(240.0),
			RenderKind::Vu | RenderKind::Monitor | RenderKind::Perf => None,
		}
	}
}
