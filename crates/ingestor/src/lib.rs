pub mod disk;
pub mod error;
pub mod jsonl;
pub mod types;
