//! Duplex intercom monitor: an ephemeral input stream on the capture
//! device feeds a short resampled buffer drained by an ephemeral output
//! stream on a configured playback device, per §4.8.

mod channel;
pub use channel::*;

mod config;
pub use config::*;

mod intercom;
pub use intercom::*;

mod resample;
pub use resample::*;
