pub mod decode;
pub mod mood;
pub mod signal;
pub mod spectrum;
pub mod stft;
