/// I/O-layer errors. Kept separate from [`cep_core::CepError`]: a
/// malformed input line is an external-data problem, never a core bug.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("line {line}: expected {expected} comma-separated fields, found {found}")]
    FieldCountMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: missing required key {key:?}")]
    MissingKey { line: usize, key: String },
    #[error("line {line}: event_time_key value {value:?} is not a 12-digit YYYYMMDDHHMM timestamp")]
    MalformedTimestamp { line: usize, value: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type IoResult<T> = Result<T, IoError>;
