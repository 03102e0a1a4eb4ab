use std::path::PathBuf;

use bmar_scheduler::{DatedPaths, PathResolver};
use chrono::NaiveDate;

/// Builds the supervisor's [`PathResolver`]: `{data_root}/{location}/{hive}/audio/raw/{yymmdd}`,
/// `.../audio/mp3/{yymmdd}`, `.../plots/{yymmdd}`, created recursively and
/// lazily the first time a worker asks for a given date.
#[must_use]
pub fn dated_path_resolver(data_root: PathBuf, location_id: String, hive_id: String) -> PathResolver {
	std::sync::Arc::new(move |date: NaiveDate| {
		let yymmdd = date.format("%y%m%d").to_string();
		let base = data_root.join(&location_id).join(&hive_id);
		let primary_raw_dir = base.join("audio").join("raw").join(&yymmdd);
		let monitor_dir = base.join("audio").join("mp3").join(&yymmdd);
		let plots_dir = base.join("plots").join(&yymmdd);

		std::fs::create_dir_all(&primary_raw_dir)?;
		std::fs::create_dir_all(&monitor_dir)?;
		std::fs::create_dir_all(&plots_dir)?;

		Ok(DatedPaths { primary_raw_dir, monitor_dir, plots_dir })
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn resolver_creates_dated_directories() {
		let tmp = tempfile::tempdir().unwrap();
		let resolver = dated_path_resolver(tmp.path().to_path_buf(), "loc".to_string(), "hive".to_string());
		let date = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
		let paths = resolver(date).unwrap();
		assert!(paths.primary_raw_dir.is_dir());
		assert!(paths.monitor_dir.is_dir());
		assert!(paths.plots_dir.is_dir());
		assert!(paths.primary_raw_dir.ends_with("audio/raw/260801"));
	}

	#[test]
	fn different_dates_yield_different_directories() {
		let tmp = tempfile::tempdir().unwrap();
		let resolver = dated_path_resolver(tmp.path().to_path_buf(), "loc".to_string(), "hive".to_string());
		let first = resolver(NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()).unwrap();
		let second = resolver(NaiveDate::from_ymd_opt(2026, 8, 2).unwrap()).unwrap();
		assert_ne!(first.primary_raw_dir, second.primary_raw_dir);
	}
}
