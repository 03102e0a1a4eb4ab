use std::path::Path;

use bmar_dsp::{apply_gain_db, HannWindow, StftAnalyzer};
use bmar_ring::BitDepth;
use plotters::prelude::*;

use crate::error::RenderError;

const DPI: u32 = 80;
const WIDTH_IN: u32 = 12;
const HEIGHT_IN: u32 = 6;
const DEFAULT_BUCKET_HZ: f32 = 1_000.0;

/// Bin-averages a linear-frequency FFT transform into `bucket_hz`-wide
/// buckets: `n_buckets = (n_of_samples / 2) / bucket_size` where
/// `bucket_size = bucket_hz * n_of_samples / sample_rate`, per §4.7.
fn bucket_average(transform: &[bmar_dsp::FftPoint], sample_rate_hz: u32, n_of_samples: usize, bucket_hz: f32) -> Vec<(f32, f32)> {
	let bucket_size = (bucket_hz * n_of_samples as f32 / sample_rate_hz as f32).max(1.0) as usize;
	let n_buckets = ((n_of_samples / 2) / bucket_size).max(1);
	let mut sums = vec![0f32; n_buckets];
	let mut counts = vec![0u32; n_buckets];
	for point in transform {
		let bin = (point.frequency / bucket_hz) as usize;
		if bin < n_buckets {
			sums[bin] += point.magnitude;
			counts[bin] += 1;
		}
	}
	sums.into_iter()
		.zip(counts)
		.enumerate()
		.map(|(i, (sum, count))| {
			let avg = if count > 0 { sum / count as f32 } else { 0.0 };
			(i as f32 * bucket_hz, avg)
		})
		.collect()
}

/// Acquires `duration_s * rate` frames on one channel, applies gain,
/// computes a single real FFT, bucket-averages, and renders amplitude vs
/// frequency at `path`.
pub fn render_fft(
	path: &Path,
	single_channel: &[i32],
	bit_depth: BitDepth,
	sample_rate_hz: u32,
	gain_db: f32,
	bucket_hz: Option<f32>,
) -> Result<(), RenderError> {
	let bucket_hz = bucket_hz.unwrap_or(DEFAULT_BUCKET_HZ);
	let mut samples = single_channel.to_vec();
	apply_gain_db(&mut samples, bit_depth, gain_db);
	let scale = bit_depth.max_value() as f32;
	let n = samples.len().next_power_of_two().min(samples.len().max(1));
	let signal: Vec<f32> = samples[..n].iter().map(|&s| s as f32 / scale).collect();

	let mut analyzer = StftAnalyzer::new(sample_rate_hz as usize, n, (0.0, sample_rate_hz as f32 / 2.0), HannWindow::new());
	let transform = analyzer.analyze(&signal).to_vec();
	let buckets = bucket_average(&transform, sample_rate_hz, n, bucket_hz);

	let max_magnitude = buckets.iter().map(|(_, m)| *m).fold(0.0f32, f32::max).max(1e-9);
	let max_freq = buckets.last().map_or(sample_rate_hz as f32 / 2.0, |(f, _)| *f);

	let root = BitMapBackend::new(path, (WIDTH_IN * DPI, HEIGHT_IN * DPI)).into_drawing_area();
	root.fill(&WHITE).map_err(|e| RenderError::Plotting(e.to_string()))?;
	let mut chart = ChartBuilder::on(&root)
		.caption("FFT", ("sans-serif", 18))
		.margin(10)
		.x_label_area_size(30)
		.y_label_area_size(40)
		.build_cartesian_2d(0f32..max_freq, 0f32..max_magnitude * 1.1)
		.map_err(|e| RenderError::Plotting(e.to_string()))?;
	chart
		.configure_mesh()
		.x_desc("Hz")
		.y_desc("amplitude")
		.draw()
		.map_err(|e| RenderError::Plotting(e.to_string()))?;
	chart
		.draw_series(LineSeries::new(buckets, &RED))
		.map_err(|e| RenderError::Plotting(e.to_string()))?;

	root.present().map_err(|e| RenderError::Plotting(e.to_string()))?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn renders_without_error() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("fft.png");
		let fs = 48_000u32;
		let samples: Vec<i32> = (0..4096)
			.map(|i| ((2.0 * std::f32::consts::PI * 1000.0 * i as f32 / fs as f32).sin() * 10_000.0) as i32)
			.collect();
		render_fft(&path, &samples, BitDepth::Sixteen, fs, 0.0, None).unwrap();
		assert!(path.exists());
	}
}
