use thiserror::Error;

/// Errors that can occur while loading or building a body table.
#[derive(Debug, Error)]
pub enum BodyTableError {
    #[error("failed to read body table: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to parse body table: {0}")]
    Parse(#[source] ron::error::SpannedError),
    #[error("body table contains no bodies")]
    Empty,
    #[error("body '{0}' is defined more than once")]
    DuplicateName(String),
    #[error("body '{name}' has an invalid {field}: {value}")]
    InvalidField {
        name: String,
        field: &'static str,
        value: f64,
    },
}
