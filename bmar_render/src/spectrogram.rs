use std::path::{Path, PathBuf};

use bmar_dsp::{short_time_transform, HannWindow, StftAnalyzer};
use plotters::prelude::*;

use crate::error::RenderError;
use crate::job::Axis;

const DPI: u32 = 80;
const WIDTH_IN: u32 = 14;
const HEIGHT_IN: u32 = 6;
const DB_FLOOR: f32 = -100.0;

/// `(n_fft, hop_length)` per the adaptive table in §4.7.
#[must_use]
pub fn adaptive_fft_params(sample_rate_hz: u32, duration_s: f32) -> (usize, usize) {
	match (sample_rate_hz > 96_000, duration_s > 60.0) {
		(true, true) => (8192, 4096),
		(true, false) => (4096, 2048),
		(false, true) => (4096, 2048),
		(false, false) => (2048, 512),
	}
}

/// Picks the file `offset_from_latest` back from the most recent
/// time-sorted entry in `dir` (0 = most recent). Relies on lexical
/// filename ordering, which holds for the `YYYYMMDD-HHMMSS...` contract.
pub fn nth_latest_file(dir: &Path, offset_from_latest: usize) -> Result<PathBuf, RenderError> {
	let mut names: Vec<PathBuf> = std::fs::read_dir(dir)?
		.filter_map(Result::ok)
		.map(|e| e.path())
		.filter(|p| p.is_file())
		.collect();
	names.sort();
	names.reverse();
	names.into_iter().nth(offset_from_latest).ok_or(RenderError::NoSourceFile)
}

fn read_wav_mono(path: &Path, channel: usize) -> Result<(Vec<f32>, u32), RenderError> {
	if path.extension().and_then(|e| e.to_str()) != Some("wav") {
		return Err(RenderError::UnsupportedSourceFormat);
	}
	let mut reader = hound::WavReader::open(path)?;
	let spec = reader.spec();
	let channels = spec.channels as usize;
	let max_value = f32::from(i16::MAX).max(2f32.powi(spec.bits_per_sample as i32 - 1) - 1.0);
	let samples: Vec<f32> = reader
		.samples::<i32>()
		.filter_map(Result::ok)
		.collect::<Vec<_>>()
		.chunks(channels.max(1))
		.map(|frame| *frame.get(channel).unwrap_or(&0) as f32 / max_value)
		.collect();
	Ok((samples, spec.sample_rate))
}

/// Computes an STFT over `signal` and renders a dB-scaled heatmap at
/// `path`, with frequency on the Y axis (linear or log per `axis`) and time
/// on the X axis.
#[allow(clippy::too_many_arguments)]
pub fn render_spectrogram(
	path: &Path,
	signal: &[f32],
	sample_rate_hz: u32,
	axis: Axis,
	label: &str,
) -> Result<(), RenderError> {
	let duration_s = signal.len() as f32 / sample_rate_hz as f32;
	let (n_fft, hop) = adaptive_fft_params(sample_rate_hz, duration_s);
	let n_fft = n_fft.min(signal.len().next_power_of_two().max(256));

	let mut analyzer = StftAnalyzer::new(sample_rate_hz as usize, n_fft, (0.0, sample_rate_hz as f32 / 2.0), HannWindow::new());
	let frames = short_time_transform(&mut analyzer, signal, n_fft, hop.min(n_fft));
	if frames.is_empty() {
		return Err(RenderError::NoSourceFile);
	}

	let max_magnitude = frames
		.iter()
		.flat_map(|f| f.iter().map(|p| p.magnitude))
		.fold(0.0f32, f32::max)
		.max(1e-9);
	let n_bins = frames[0].len();
	let max_freq = frames[0].last().map_or(sample_rate_hz as f32 / 2.0, |p| p.frequency);

	let root = BitMapBackend::new(path, (WIDTH_IN * DPI, HEIGHT_IN * DPI)).into_drawing_area();
	root.fill(&WHITE).map_err(|e| RenderError::Plotting(e.to_string()))?;

	let y_range = match axis {
		Axis::Linear => 0f32..max_freq,
		Axis::Log => 1f32.ln()..max_freq.max(2.0).ln(),
	};
	let mut chart = ChartBuilder::on(&root)
		.caption(label, ("sans-serif", 18))
		.margin(10)
		.x_label_area_size(30)
		.y_label_area_size(50)
		.build_cartesian_2d(0f32..duration_s, y_range)
		.map_err(|e| RenderError::Plotting(e.to_string()))?;
	chart
		.configure_mesh()
		.x_desc("seconds")
		.y_desc("Hz")
		.draw()
		.map_err(|e| RenderError::Plotting(e.to_string()))?;

	let hop_s = hop.min(n_fft) as f32 / sample_rate_hz as f32;
	for (frame_i, frame) in frames.iter().enumerate() {
		let t0 = frame_i as f32 * hop_s;
		for (bin_i, point) in frame.iter().enumerate() {
			let db = 20.0 * (point.magnitude / max_magnitude).max(1e-9).log10();
			let intensity = ((db - DB_FLOOR) / -DB_FLOOR).clamp(0.0, 1.0);
			let color = HSLColor(0.66 * (1.0 - f64::from(intensity)), 1.0, 0.5 * f64::from(intensity));
			let y0 = match axis {
				Axis::Linear => point.frequency,
				Axis::Log => point.frequency.max(1.0).ln(),
			};
			let y1 = match axis {
				Axis::Linear => frame.get(bin_i + 1).map_or(max_freq, |p| p.frequency),
				Axis::Log => frame.get(bin_i + 1).map_or(max_freq.max(2.0).ln(), |p| p.frequency.max(1.0).ln()),
			};
			let _ = chart.draw_series(std::iter::once(Rectangle::new(
				[(t0, y0), (t0 + hop_s, y1)],
				color.filled(),
			)));
		}
	}
	let _ = n_bins;

	root.present().map_err(|e| RenderError::Plotting(e.to_string()))?;
	Ok(())
}

/// Reads the last-written (or `offset_from_latest`-back) primary-format
/// WAV file from `dir` and renders its spectrogram.
pub fn render_spectrogram_from_file(
	path: &Path,
	dir: &Path,
	offset_from_latest: usize,
	channel: usize,
	axis: Axis,
	label: &str,
) -> Result<(), RenderError> {
	let source = nth_latest_file(dir, offset_from_latest)?;
	let (signal, rate) = read_wav_mono(&source, channel)?;
	render_spectrogram(path, &signal, rate, axis, label)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn adaptive_params_match_table() {
		assert_eq!(adaptive_fft_params(192_000, 90.0), (8192, 4096));
		assert_eq!(adaptive_fft_params(192_000, 10.0), (4096, 2048));
		assert_eq!(adaptive_fft_params(48_000, 90.0), (4096, 2048));
		assert_eq!(adaptive_fft_params(48_000, 10.0), (2048, 512));
	}

	#[test]
	fn renders_from_raw_signal() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("spec.png");
		let fs = 48_000u32;
		let signal: Vec<f32> = (0..48_000)
			.map(|i| (2.0 * std::f32::consts::PI * 2_000.0 * i as f32 / fs as f32).sin())
			.collect();
		render_spectrogram(&path, &signal, fs, Axis::Linear, "test").unwrap();
		assert!(path.exists());
	}
}
