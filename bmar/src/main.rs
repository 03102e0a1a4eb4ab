mod cli;
mod commands;
mod config;
mod paths;
mod supervisor;
mod vu_stream;

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;

use cli::Cli;
use config::Config;
use supervisor::Supervisor;

const FORCED_EXIT_WINDOW: Duration = Duration::from_secs(2);
const EXIT_CONFIG_OR_DEVICE_ERROR: u8 = 1;
const EXIT_INTERRUPTED: u8 = 130;

fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.init();

	let cli = Cli::parse();

	let mut config = match Config::load(&cli.config) {
		Ok(config) => config,
		Err(err) => {
			tracing::error!(%err, "failed to load configuration");
			return ExitCode::from(EXIT_CONFIG_OR_DEVICE_ERROR);
		}
	};
	let data_root = cli.data_root.clone().unwrap_or_else(|| config.data_root.clone());
	config.data_root = data_root.clone();

	let supervisor = match Supervisor::start(config, data_root) {
		Ok(supervisor) => supervisor,
		Err(err) => {
			tracing::error!(%err, "failed to start supervisor");
			return ExitCode::from(EXIT_CONFIG_OR_DEVICE_ERROR);
		}
	};

	let quit = Arc::new(AtomicBool::new(false));
	let interrupted = Arc::new(AtomicU8::new(0));
	install_signal_handler(quit.clone(), interrupted.clone());

	if cli.headless {
		while !quit.load(Ordering::SeqCst) {
			std::thread::sleep(Duration::from_millis(200));
		}
	} else {
		commands::run(&supervisor, quit.as_ref());
	}

	tracing::info!("shutting down");
	supervisor.shutdown();

	if interrupted.load(Ordering::SeqCst) > 0 {
		ExitCode::from(EXIT_INTERRUPTED)
	} else {
		ExitCode::SUCCESS
	}
}

/// Interrupt (SIGINT/SIGTERM) requests a graceful stop; a second interrupt
/// within [`FORCED_EXIT_WINDOW`] forces an immediate exit rather than
/// waiting on the normal shutdown sequence, per §4.9.
fn install_signal_handler(quit: Arc<AtomicBool>, interrupted: Arc<AtomicU8>) {
	let last_interrupt = std::sync::Mutex::new(None::<Instant>);
	ctrlc::set_handler(move || {
		let now = Instant::now();
		let mut last = last_interrupt.lock().unwrap();
		let forced = last.is_some_and(|previous| now.duration_since(previous) < FORCED_EXIT_WINDOW);
		*last = Some(now);
		interrupted.store(1, Ordering::SeqCst);
		quit.store(true, Ordering::SeqCst);
		if forced {
			std::process::exit(i32::from(EXIT_INTERRUPTED));
		}
	})
	.expect("failed to install signal handler");
}
