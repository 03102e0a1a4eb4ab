use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, SupportedStreamConfig};

use crate::config::{ApiPreference, CaptureConfig};

/// An input device paired with the label it was found under, kept around
/// for the log line emitted once a candidate is accepted or exhausted.
pub struct Candidate {
	pub device: Device,
	pub label: String,
}

/// Builds the ordered candidate list per the device acquisition protocol in
/// §4.2: configured id first, then API-preference plus make/model substring,
/// then a full enumeration sorted by API priority.
pub fn candidate_devices(config: &CaptureConfig) -> Vec<Candidate> {
	let hosts_in_priority_order = ordered_hosts(&config.api_preference);

	let mut candidates = Vec::new();
	let mut seen_names = std::collections::HashSet::new();

	if let Some(wanted) = &config.device_id {
		for host in &hosts_in_priority_order {
			for device in host.input_devices().into_iter().flatten() {
				if let Ok(name) = device.name() {
					if name == *wanted && seen_names.insert(name.clone()) {
						candidates.push(Candidate { device, label: format!("{wanted} (exact match)") });
					}
				}
			}
		}
	}

	if let Some(wanted) = &config.device_id {
		let wanted_lower = wanted.to_lowercase();
		for host in &hosts_in_priority_order {
			for device in host.input_devices().into_iter().flatten() {
				if let Ok(name) = device.name() {
					if name.to_lowercase().contains(&wanted_lower) && seen_names.insert(name.clone()) {
						candidates.push(Candidate { device, label: format!("{name} (substring match)") });
					}
				}
			}
		}
	}

	for host in &hosts_in_priority_order {
		for device in host.input_devices().into_iter().flatten() {
			if let Ok(name) = device.name() {
				if seen_names.insert(name.clone()) {
					candidates.push(Candidate { device, label: name });
				}
			}
		}
	}

	candidates
}

fn ordered_hosts(api_preference: &[ApiPreference]) -> Vec<cpal::Host> {
	let mut hosts = Vec::new();
	for pref in api_preference {
		for host_id in cpal::available_hosts() {
			if host_id
				.name()
				.to_lowercase()
				.contains(pref.host_name_fragment())
			{
				if let Ok(host) = cpal::host_from_id(host_id) {
					hosts.push(host);
				}
			}
		}
	}
	hosts.push(cpal::default_host());
	hosts
}

/// Picks a stream config for `device` by trying, in order: the configured
/// rate, the device's own default rate, and 44.1 kHz. Channel count is
/// clamped to the device maximum if it's lower than requested.
pub fn resolve_stream_config(
	device: &Device,
	config: &CaptureConfig,
) -> Option<(SupportedStreamConfig, u32, u16)> {
	let supported_range = device.supported_input_configs().ok()?.collect::<Vec<_>>();
	if supported_range.is_empty() {
		return None;
	}
	let max_channels = supported_range
		.iter()
		.map(cpal::SupportedStreamConfigRange::channels)
		.max()?;
	let wanted_channels = u16::from(config.channels).min(max_channels);

	let default_rate = device
		.default_input_config()
		.ok()
		.map(|c| c.sample_rate().0);

	for candidate_rate in [Some(config.sample_rate_hz), default_rate, Some(44_100)]
		.into_iter()
		.flatten()
	{
		for range in &supported_range {
			if range.channels() != wanted_channels {
				continue;
			}
			let sample_rate = cpal::SampleRate(candidate_rate);
			if sample_rate >= range.min_sample_rate() && sample_rate <= range.max_sample_rate() {
				return Some((range.clone().with_sample_rate(sample_rate), candidate_rate, wanted_channels));
			}
		}
	}
	None
}
