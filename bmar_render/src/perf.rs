use sysinfo::System;

/// One-shot snapshot of per-core CPU usage and system memory, per §4.7's
/// Perf renderer. Not an audio renderer, but it shares the dispatcher's
/// one-per-kind lifecycle.
#[derive(Debug, Clone)]
pub struct PerfSnapshot {
	pub per_core_cpu_percent: Vec<f32>,
	pub used_memory_bytes: u64,
	pub total_memory_bytes: u64,
}

impl std::fmt::Display for PerfSnapshot {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		writeln!(f, "mem: {}/{} MiB", self.used_memory_bytes / (1024 * 1024), self.total_memory_bytes / (1024 * 1024))?;
		for (i, pct) in self.per_core_cpu_percent.iter().enumerate() {
			writeln!(f, "core {i}: {pct:5.1}%")?;
		}
		Ok(())
	}
}

/// Refreshing CPU usage requires two samples taken apart in time;
/// `System::refresh_cpu_usage` is called twice here with a short sleep so a
/// single snapshot call is self-contained for a one-shot Perf job.
#[must_use]
pub fn snapshot() -> PerfSnapshot {
	let mut sys = System::new_all();
	sys.refresh_cpu_usage();
	std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
	sys.refresh_cpu_usage();
	sys.refresh_memory();

	PerfSnapshot {
		per_core_cpu_percent: sys.cpus().iter().map(sysinfo::Cpu::cpu_usage).collect(),
		used_memory_bytes: sys.used_memory(),
		total_memory_bytes: sys.total_memory(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn snapshot_reports_at_least_one_core() {
		let snap = snapshot();
		assert!(!snap.per_core_cpu_percent.is_empty());
		assert!(snap.total_memory_bytes > 0);
	}
}
