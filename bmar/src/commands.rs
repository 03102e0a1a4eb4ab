use std::io::{self, BufRead, Write};

use bmar_render::Axis;

use crate::supervisor::Supervisor;

/// Runs the `h/?, q, d, D, a, c, 1..9, v, i, o, f, s, m, t, p, P, ^` command
/// surface from §6. Lacking a raw-terminal crate anywhere in the retrieval
/// pack, commands are read one line at a time rather than one keystroke at
/// a time; the first non-whitespace character selects the command, matching
/// the spec's dispatch table otherwise unchanged.
pub fn run(supervisor: &Supervisor, quit: &std::sync::atomic::AtomicBool) {
	print_help();
	let stdin = io::stdin();
	let mut lines = stdin.lock().lines();
	loop {
		print!("bmar> ");
		let _ = io::stdout().flush();
		let Some(Ok(line)) = lines.next() else { break };
		let Some(command) = line.trim().chars().next() else { continue };
		match command {
			'h' | '?' => print_help(),
			'q' => {
				quit.store(true, std::sync::atomic::Ordering::SeqCst);
				break;
			}
			'd' => println!("(short device list is an external CLI concern; not reimplemented here)"),
			'D' => println!("(detailed device list is an external CLI concern; not reimplemented here)"),
			'a' => watch_overflow(supervisor),
			'c' => change_monitor_channel(supervisor, &mut lines),
			'1'..='9' => select_channel(supervisor, command),
			'v' => toggle_vu(supervisor),
			'i' => toggle_monitor(supervisor),
			'o' => {
				let config = supervisor.config();
				if let Err(err) = supervisor.launch_scope(config.trace_duration, config.oscope_gain_db) {
					println!("couldn't start scope: {err}");
				}
			}
			'f' => {
				let config = supervisor.config();
				if let Err(err) = supervisor.launch_fft(config.fft_duration, config.fft_gain, config.fft_bw, config.monitor_ch) {
					println!("couldn't start FFT: {err}");
				}
			}
			's' => {
				let config = supervisor.config();
				supervisor.launch_spectrogram(0, config.monitor_ch, Axis::Linear);
			}
			'm' => list_mic_positions(supervisor),
			't' => list_threads(supervisor),
			'p' => supervisor.launch_perf(false),
			'P' => supervisor.launch_perf(true),
			'^' => println!("(listener toggle has no effect: capture runs for the process lifetime)"),
			other => println!("unrecognized command '{other}', press h for help"),
		}
	}
}

fn print_help() {
	println!("h/? help  q quit  d/D device list  a overflow watch  c change channel");
	println!("1-9 select channel  v toggle VU  i toggle monitor  o scope  f FFT  s spectrogram");
	println!("m mic positions  t thread report  p perf once  P perf continuous  ^ listener toggle");
}

fn watch_overflow(supervisor: &Supervisor) {
	let ring = supervisor.ring();
	let before = ring.overflow_count();
	println!("watching for input overflow for 10s...");
	std::thread::sleep(std::time::Duration::from_secs(10));
	let after = ring.overflow_count();
	println!("overflow events: {}", after - before);
}

fn change_monitor_channel(supervisor: &Supervisor, lines: &mut std::io::Lines<std::io::StdinLock<'_>>) {
	print!("channel (1..N, 0 cancels): ");
	let _ = io::stdout().flush();
	let Some(Ok(line)) = lines.next() else { return };
	let Ok(selection) = line.trim().parse::<usize>() else {
		println!("not a number");
		return;
	};
	if selection == 0 {
		println!("cancelled");
		return;
	}
	supervisor.set_intercom_channel(selection - 1);
}

fn select_channel(supervisor: &Supervisor, digit: char) {
	let channel = digit.to_digit(10).unwrap_or(1) as usize - 1;
	supervisor.set_intercom_channel(channel);
}

fn toggle_vu(supervisor: &Supervisor) {
	if supervisor.dispatcher().is_active(bmar_render::RenderKind::Vu) {
		supervisor.dispatcher().cancel(bmar_render::RenderKind::Vu);
	} else {
		supervisor.launch_vu(supervisor.config().monitor_ch);
	}
}

fn toggle_monitor(supervisor: &Supervisor) {
	if supervisor.intercom_running() {
		supervisor.stop_intercom();
	} else if let Err(err) = supervisor.start_intercom() {
		println!("couldn't start monitor: {err}");
	}
}

fn list_mic_positions(supervisor: &Supervisor) {
	for mic in supervisor.config().mic_positions() {
		println!("{}: {} ({})", mic.index + 1, mic.label, if mic.active { "active" } else { "inactive" });
	}
}

fn list_threads(supervisor: &Supervisor) {
	for line in supervisor.worker_report() {
		println!("{line}");
	}
}
