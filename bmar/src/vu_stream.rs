use bmar_capture::{candidate_devices, resolve_stream_config, CaptureConfig};
use bmar_monitor::clamp_channel;
use bmar_render::{print_vu_line, vu_bar};
use cpal::traits::{DeviceTrait, StreamTrait};
use mutex_ext::CondvarExt;
use mutex_ext::ReactiveCondvar;

/// Opens its own ephemeral input stream (never shares C2's) and overprints
/// a VU bar until `shutdown` is set, per §4.7. Runs on the dispatcher's
/// `Vu`-kind worker thread, so it owns the cpal stream's lifetime directly
/// rather than handing it back through a `ResourceDaemon` like the other
/// long-lived streams: there's nothing else this thread needs to do once
/// the stream is built.
pub fn run_vu(config: CaptureConfig, channel: usize, shutdown: ReactiveCondvar<bool>) {
	let max_value_i32 = config.bit_depth.max_value();
	let max_value = f64::from(max_value_i32);
	let mut stream = None;
	for candidate in candidate_devices(&config) {
		let Some((stream_config, _rate, n_channels)) = resolve_stream_config(&candidate.device, &config) else {
			continue;
		};
		let n_channels = n_channels as usize;
		let built = candidate.device.build_input_stream(
			&stream_config.into(),
			move |data: &[f32], _: &cpal::InputCallbackInfo| {
				let ch = clamp_channel(channel, n_channels);
				let peak = data
					.chunks(n_channels.max(1))
					.filter_map(|frame| frame.get(ch))
					.fold(0.0f32, |acc, &s| acc.max(s.abs()));
				let bar = vu_bar((f64::from(peak) * max_value) as i32, max_value_i32);
				print_vu_line(&bar);
			},
			|_err| {},
			None,
		);
		if let Ok(built) = built {
			if built.play().is_ok() {
				stream = Some(built);
				break;
			}
		}
	}

	let Some(_stream) = stream else {
		println!("no usable input device for the VU meter");
		return;
	};

	shutdown.wait_while_and_then_mut(|quitting| !*quitting, |_| ());
	println!();
}
