use thiserror::Error;

pub type Result<T = ()> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("smoothing window must be at least 1, got {0}")]
    InvalidWindow(usize),
    #[error("no counter records to analyze")]
    NoRecords,
}
