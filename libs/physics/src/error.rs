use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("dimension mismatch: '{left}' vs '{right}'")]
    DimensionMismatch { left: String, right: String },

    #[error("two vectors cannot be {0}")]
    VectorProduct(&'static str),

    #[error("operands of '{0}' must both be vectors")]
    NonVectorOperand(&'static str),

    #[error("exponent {0} applied to a dimensioned base must be an integer")]
    NonIntegerExponent(f64),

    #[error("zero raised to the zero power is indeterminate")]
    ZeroToTheZero,

    #[error("unknown dimension '{0}'")]
    UnknownDimension(String),

    #[error("dimension '{0}' is already defined")]
    DuplicateDimension(String),

    #[error("dimension prime product overflow")]
    Overflow,
}
