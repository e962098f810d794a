use std::{io, path::PathBuf};
use thiserror::Error;

pub type Result<T = ()> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("path does not exist: {}", .0.display())]
    MissingPath(PathBuf),
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("read error: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: unreadable line: {source}")]
    Line {
        line: usize,
        #[source]
        source: io::Error,
    },
    #[error("line {line}: invalid json: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("line {line}: record is not a json object")]
    NotAnObject { line: usize },
    #[error("line {line}: missing required fields: {}", .fields.join(", "))]
    MissingFields {
        line: usize,
        fields: Vec<&'static str>,
    },
    #[error("line {line}: invalid value for `{field}`: {value}")]
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("input contains no records")]
    EmptyInput,
}
