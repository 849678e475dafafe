use thiserror;

/// Failures of exact fraction arithmetic.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RationalError {
    #[error("Denominator is zero")]
    ZeroDenominator,
    #[error("Division by zero Rational")]
    DivisionByZero,
    #[error("Arithmetic overflow in `{0}`")]
    Overflow(&'static str),
    #[error("Value {0} can not be represented as Rational")]
    Unrepresentable(String),
    #[error("Can not parse Rational from `{0}`")]
    Parse(String),
}
pub type RationalResult<T> = Result<T, RationalError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoreError {
    #[error(transparent)]
    Rational(#[from] RationalError),
    #[error("Invalid note name: `{0}`")]
    InvalidNoteName(String),
    #[error("Invalid time signature: `{0}`")]
    InvalidTimeSignature(String),
}
pub type ScoreResult<T> = Result<T, ScoreError>;
