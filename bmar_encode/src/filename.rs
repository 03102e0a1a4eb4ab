use chrono::{Datelike, NaiveDateTime, Timelike};

/// The fields encoded in a segment filename, per the bit-exact contract
/// between the scheduler and the encoder:
/// `YYYYMMDD-HHMMSS_<rate_hz>_<bit_depth>_<thread_tag>_<location_id>_<hive_id>.<ext>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameFields {
	pub timestamp: NaiveDateTime,
	pub rate_hz: u32,
	pub bit_depth: u8,
	pub thread_tag: String,
	pub location_id: String,
	pub hive_id: String,
	pub ext: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FilenameParseError {
	#[error("filename {0:?} is missing an extension")]
	MissingExtension(String),
	#[error("filename {0:?} doesn't have the expected underscore-delimited field count")]
	WrongFieldCount(String),
	#[error("filename {0:?} has an unparseable timestamp")]
	BadTimestamp(String),
	#[error("filename {0:?} has a non-numeric rate or bit depth field")]
	BadNumericField(String),
}

impl FilenameFields {
	#[must_use]
	pub fn render(&self) -> String {
		format!(
			"{:04}{:02}{:02}-{:02}{:02}{:02}_{}_{}_{}_{}_{}.{}",
			self.timestamp.year(),
			self.timestamp.month(),
			self.timestamp.day(),
			self.timestamp.hour(),
			self.timestamp.minute(),
			self.timestamp.second(),
			self.rate_hz,
			self.bit_depth,
			self.thread_tag,
			self.location_id,
			self.hive_id,
			self.ext,
		)
	}

	/// Inverse of [`FilenameFields::render`] — used by IV6's roundtrip
	/// property and by the spectrogram renderer to read back a file's rate
	/// and channel labelling without a sidecar.
	pub fn parse(name: &str) -> Result<Self, FilenameParseError> {
		let (stem, ext) = name
			.rsplit_once('.')
			.ok_or_else(|| FilenameParseError::MissingExtension(name.to_string()))?;
		let parts: Vec<&str> = stem.split('_').collect();
		let [timestamp_part, rate_part, bit_depth_part, thread_tag, location_id, hive_id] =
			parts.as_slice()
		else {
			return Err(FilenameParseError::WrongFieldCount(name.to_string()));
		};

		let timestamp = NaiveDateTime::parse_from_str(timestamp_part, "%Y%m%d-%H%M%S")
			.map_err(|_| FilenameParseError::BadTimestamp(name.to_string()))?;
		let rate_hz = rate_part
			.parse()
			.map_err(|_| FilenameParseError::BadNumericField(name.to_string()))?;
		let bit_depth = bit_depth_part
			.parse()
			.map_err(|_| FilenameParseError::BadNumericField(name.to_string()))?;

		Ok(Self {
			timestamp,
			rate_hz,
			bit_depth,
			thread_tag: (*thread_tag).to_string(),
			location_id: (*location_id).to_string(),
			hive_id: (*hive_id).to_string(),
			ext: ext.to_string(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::NaiveDate;

	#[test]
	fn filename_roundtrips() {
		let fields = FilenameFields {
			timestamp: NaiveDate::from_ymd_opt(2026, 8, 1)
				.unwrap()
				.and_hms_opt(13, 5, 9)
				.unwrap(),
			rate_hz: 48_000,
			bit_depth: 16,
			thread_tag: "period".to_string(),
			location_id: "apiary1".to_string(),
			hive_id: "hive3".to_string(),
			ext: "flac".to_string(),
		};
		let rendered = fields.render();
		assert_eq!(rendered, "20260801-130509_48000_16_period_apiary1_hive3.flac");
		let parsed = FilenameFields::parse(&rendered).unwrap();
		assert_eq!(parsed, fields);
	}

	#[test]
	fn malformed_filename_is_rejected() {
		assert!(FilenameFields::parse("not_enough_fields.flac").is_err());
		assert!(FilenameFields::parse("noextension").is_err());
	}
}
