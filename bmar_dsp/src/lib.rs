//! Signal processing shared by the recording scheduler and the render
//! dispatcher: anti-alias decimation, Butterworth band splitting, and
//! windowed FFT/STFT analysis.

mod band_splitter;
pub use band_splitter::*;

mod butterworth;
pub use butterworth::*;

mod decimator;
pub use decimator::*;

mod fft_point;
pub use fft_point::*;

mod gain;
pub use gain::*;

mod stft;
pub use stft::*;

pub mod utils;
pub use utils::*;

pub mod windowing;
pub use windowing::*;
