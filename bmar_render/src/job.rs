use std::path::PathBuf;

use crate::error::RenderError;
use crate::kind::RenderKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
	Linear,
	Log,
}

/// Where a spectrogram reads its samples from: a fresh ring snapshot, or
/// the most recently written primary-format file (by offset into a
/// time-sorted listing of `primary_raw_dir`).
#[derive(Debug, Clone)]
pub enum RingOrFile {
	Ring,
	File { dir: PathBuf, offset_from_latest: usize },
}

/// The tagged union of renderable jobs, per §3. Each variant owns its own
/// output stream or image path; none share mutable state with the capture
/// engine except read-only ring access.
#[derive(Debug, Clone)]
pub enum RenderJob {
	Scope { duration_s: f32, gain_db: f32 },
	Fft { duration_s: f32, gain_db: f32, bucket_hz: f32 },
	Spectrogram { source: RingOrFile, channel: usize, axis: Axis, max_duration_s: f32 },
	Vu { channel: usize },
	Monitor { channel: usize },
	Perf { continuous: bool },
}

impl RenderJob {
	/// Constructs a [`RenderJob::Scope`], rejecting `duration_s <= 0`
	/// immediately rather than letting a job run that would snapshot zero
	/// frames and render an empty plot.
	///
	/// # Errors
	/// [`RenderError::NonPositiveDuration`] if `duration_s` isn't positive.
	pub fn scope(duration_s: f32, gain_db: f32) -> Result<Self, RenderError> {
		check_positive_duration(duration_s)?;
		Ok(RenderJob::Scope { duration_s, gain_db })
	}

	/// Constructs a [`RenderJob::Fft`] with the same `duration_s` check as
	/// [`RenderJob::scope`].
	///
	/// # Errors
	/// [`RenderError::NonPositiveDuration`] if `duration_s` isn't positive.
	pub fn fft(duration_s: f32, gain_db: f32, bucket_hz: f32) -> Result<Self, RenderError> {
		check_positive_duration(duration_s)?;
		Ok(RenderJob::Fft { duration_s, gain_db, bucket_hz })
	}

	#[must_use]
	pub fn kind(&self) -> RenderKind {
		match self {
			RenderJob::Scope { .. } => RenderKind::Scope,
			RenderJob::Fft { .. } => RenderKind::Fft,
			RenderJob::Spectrogram { .. } => RenderKind::Spectrogram,
			RenderJob::Vu { .. } => RenderKind::Vu,
			RenderJob::Monitor { .. } => RenderKind::Monitor,
			RenderJob::Perf { .. } => RenderKind::Perf,
		}
	}

	#[must_use]
	pub fn duration_s(&self) -> f32 {
		match self {
			RenderJob::Scope { duration_s, .. } | RenderJob::Fft { duration_s, .. } => *duration_s,
			RenderJob::Spectrogram { max_duration_s, .. } => *max_duration_s,
			RenderJob::Vu { .. } | RenderJob::Monitor { .. } | RenderJob::Perf { .. } => 0.0,
		}
	}
}

fn check_positive_duration(duration_s: f32) -> Result<(), RenderError> {
	if duration_s > 0.0 {
		Ok(())
	} else {
		Err(RenderError::NonPositiveDuration(duration_s))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn zero_duration_scope_is_rejected() {
		assert!(matches!(RenderJob::scope(0.0, 0.0), Err(RenderError::NonPositiveDuration(_))));
	}

	#[test]
	fn negative_duration_fft_is_rejected() {
		assert!(matches!(RenderJob::fft(-1.0, 0.0, 1_000.0), Err(RenderError::NonPositiveDuration(_))));
	}

	#[test]
	fn positive_duration_scope_is_accepted() {
		assert!(RenderJob::scope(10.0, 0.0).is_ok());
	}
}
