use chrono::NaiveTime;

/// An optional time-of-day gate shared by every worker mode (Monitor,
/// Period, Event). `start` may be after `end`, meaning the window wraps
/// past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodWindow {
	pub start: NaiveTime,
	pub end: NaiveTime,
}

impl TodWindow {
	#[must_use]
	pub fn contains(&self, now: NaiveTime) -> bool {
		if self.start <= self.end {
			now >= self.start && now <= self.end
		} else {
			now >= self.start || now <= self.end
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn t(h: u32, m: u32) -> NaiveTime {
		NaiveTime::from_hms_opt(h, m, 0).unwrap()
	}

	#[test]
	fn same_day_window() {
		let window = TodWindow { start: t(8, 0), end: t(18, 0) };
		assert!(window.contains(t(12, 0)));
		assert!(!window.contains(t(20, 0)));
	}

	#[test]
	fn wrapping_window_crosses_midnight() {
		let window = TodWindow { start: t(22, 0), end: t(4, 0) };
		assert!(window.contains(t(23, 0)));
		assert!(window.contains(t(1, 0)));
		assert!(!window.contains(t(12, 0)));
	}
}
