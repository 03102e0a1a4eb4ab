use std::path::PathBuf;

use clap::Parser;

/// BMAR — unattended multichannel acoustic recorder.
#[derive(Debug, Parser)]
#[command(name = "bmar", version, about)]
pub struct Cli {
	/// Path to the TOML configuration file.
	#[arg(long, default_value = "bmar.toml")]
	pub config: PathBuf,

	/// Overrides `data_root` from the config file.
	#[arg(long)]
	pub data_root: Option<PathBuf>,

	/// Run non-interactively: no stdin command loop, exit on signal only.
	#[arg(long)]
	pub headless: bool,
}
