//! One-per-kind renderer registry: scope/FFT/spectrogram PNGs, a VU text
//! meter, and a perf snapshot, all sharing the dispatcher's cancellation
//! lifecycle per §4.7.

mod dispatcher;
pub use dispatcher::*;

mod error;
pub use error::*;

mod fft;
pub use fft::*;

mod job;
pub use job::*;

mod kind;
pub use kind::*;

mod perf;
pub use perf::*;

mod scope;
pub use scope::*;

mod spectrogram;
pub use spectrogram::*;

mod vu;
pub use vu::*;
