use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;

/// The directories a worker writes into for a given local date, per §3.
/// Regenerated whenever the local date rolls over; workers resolve these at
/// segment-close time, not segment-open time, so a segment that straddles
/// midnight lands in the day it finished on.
#[derive(Debug, Clone)]
pub struct DatedPaths {
	pub primary_raw_dir: PathBuf,
	pub monitor_dir: PathBuf,
	pub plots_dir: PathBuf,
}

/// Supplied by the supervisor: given a local date, lazily creates (recursive
/// mkdir) and returns that date's directories. Scheduler workers never
/// create directories themselves — a failure here is surfaced as
/// [`crate::worker::SchedulerError::DirCreateFailed`].
pub type PathResolver = Arc<dyn Fn(NaiveDate) -> io::Result<DatedPaths> + Send + Sync>;
