pub mod bins;
pub mod delta;
pub mod distribution;
pub mod error;
pub mod file_sizes;
pub mod histogram;
pub mod rates;
pub mod smoothing;
pub mod traffic;
