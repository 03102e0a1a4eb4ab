//! Runs one background worker per active recording mode (Monitor, Period,
//! Event), turning ring buffer snapshots into finished segment files per
//! §4.5.

mod paths;
pub use paths::*;

mod tod;
pub use tod::*;

mod worker;
pub use worker::*;
