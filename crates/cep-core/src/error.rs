/// Fatal error kinds for the evaluation core.
///
/// Per the error design: malformed plans, missing statistics, wrong event
/// types delivered to a leaf, and predicate failures on a *complete* binding
/// are all programmer/dispatcher bugs — fatal for the pattern, never
/// retried. Normal rejections (window violation, sequence violation, unary
/// predicate false) are never represented here; they are silent drops
/// handled inline where they occur.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CepError {
    #[error("malformed tree blueprint: {0}")]
    MalformedBlueprint(String),

    #[error("optimizer requires statistics that were not supplied")]
    MissingStatistics,

    #[error("leaf received event of type {actual:?}, expected {expected:?}")]
    WrongEventType { expected: String, actual: String },

    #[error("predicate evaluation failed on a complete binding: {0}")]
    PredicateEvalFailure(String),
}

pub type CepResult<T> = Result<T, CepError>;
