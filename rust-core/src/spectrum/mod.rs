//! Spectral estimation: windows, FFT and the H1 accumulator

pub mod accumulator;
pub mod fft;
pub mod windowing;

pub use accumulator::{accumulate, estimate, hit_spectra, FrfEstimate, HitSpectra, SpectralSums};
pub use fft::FftEngine;
pub use windowing::{apply_window, generate_window, WindowType};
