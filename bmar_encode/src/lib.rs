//! Writes PCM segments to WAV, FLAC, or MP3 under the filename contract
//! shared with the recording scheduler. Never creates directories — that's
//! the supervisor's job.

mod encoder;
pub use encoder::*;

mod error;
pub use error::*;

mod filename;
pub use filename::*;

mod flac;
pub use flac::*;

mod mp3;
pub use mp3::*;

mod segment;
pub use segment::*;

mod wav;
pub use wav::*;
