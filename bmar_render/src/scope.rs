use std::path::Path;

use bmar_dsp::apply_gain_db;
use bmar_ring::BitDepth;
use plotters::prelude::*;

use crate::error::RenderError;

const DPI: u32 = 80;
const INCHES_WIDE: u32 = 12;
const INCHES_TALL_PER_CHANNEL: u32 = 2;
const GRATICULE_SECONDS: f64 = 0.5;

/// Renders one amplitude-vs-time subplot per channel, clamped to ±1.0, with
/// a graticule every 0.5 s, at `path`.
pub fn render_scope(
	path: &Path,
	interleaved: &[i32],
	channels: usize,
	bit_depth: BitDepth,
	sample_rate_hz: u32,
	gain_db: f32,
) -> Result<(), RenderError> {
	let mut samples = interleaved.to_vec();
	apply_gain_db(&mut samples, bit_depth, gain_db);
	let scale = bit_depth.max_value() as f64;
	let n_frames = samples.len() / channels.max(1);
	let duration_s = n_frames as f64 / f64::from(sample_rate_hz);

	let width = INCHES_WIDE * DPI;
	let height = INCHES_TALL_PER_CHANNEL * DPI * channels.max(1) as u32;
	let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
	root.fill(&WHITE).map_err(|e| RenderError::Plotting(e.to_string()))?;
	let areas = root.split_evenly((channels.max(1), 1));

	for (ch, area) in areas.into_iter().enumerate() {
		let mut chart = ChartBuilder::on(&area)
			.caption(format!("channel {ch}"), ("sans-serif", 16))
			.margin(5)
			.x_label_area_size(20)
			.y_label_area_size(30)
			.build_cartesian_2d(0f64..duration_s.max(GRATICULE_SECONDS), -1.0f64..1.0f64)
			.map_err(|e| RenderError::Plotting(e.to_string()))?;

		chart
			.configure_mesh()
			.x_desc("seconds")
			.x_labels((duration_s / GRATICULE_SECONDS).ceil() as usize + 1)
			.draw()
			.map_err(|e| RenderError::Plotting(e.to_string()))?;

		let series = (0..n_frames).map(|i| {
			let t = i as f64 / f64::from(sample_rate_hz);
			let v = f64::from(samples[i * channels + ch]) / scale;
			(t, v.clamp(-1.0, 1.0))
		});
		chart
			.draw_series(LineSeries::new(series, &BLUE))
			.map_err(|e| RenderError::Plotting(e.to_string()))?;
	}

	root.present().map_err(|e| RenderError::Plotting(e.to_string()))?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn renders_a_png_for_each_channel() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("scope.png");
		let samples: Vec<i32> = (0..4800 * 2)
			.map(|i| ((i % 100) as i32 - 50) * 300)
			.collect();
		render_scope(&path, &samples, 2, BitDepth::Sixteen, 48_000, 0.0).unwrap();
		assert!(path.exists());
		assert!(std::fs::metadata(&path).unwrap().len() > 0);
	}
}
