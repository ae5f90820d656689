use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid email: {0}")]
    InvalidEmail(String),

    #[error("unknown logo kind: {0}")]
    UnknownLogoKind(String),

    #[error("invalid mockup url: {0}")]
    InvalidMockupUrl(String),

    #[error("invalid model: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
