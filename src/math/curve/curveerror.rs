use thiserror::Error;

use crate::math::curve::coefficient::Time;
use crate::math::curve::key::Key;

/// 錯誤分類：呼叫端違反契約、設定檔問題、數值問題。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    PreconditionViolation,
    Configuration,
    Numerical,
}

#[derive(Debug, Error)]
pub enum CurveError {
    #[error("time {time} is outside the curve domain [{min_time}, {max_time})")]
    OutOfRange { time: Time, min_time: Time, max_time: Time },

    #[error("insufficient samples: got {got}, need at least 2")]
    InsufficientSamples { got: usize },

    #[error("degenerate bracket [{t0}, {t1}) for time {time}: requested division by 0")]
    DegenerateBracket { time: Time, t0: Time, t1: Time },

    #[error("a sample already exists at time {time}")]
    DuplicateTime { time: Time },

    #[error("time {time} must be strictly after {previous}")]
    NonIncreasingTime { time: Time, previous: Time },

    #[error("key {0} is already stored")]
    DuplicateKey(Key),

    #[error("key {0} was not found")]
    MissingKey(Key),

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("measurement weight {weight} must be finite and > 0")]
    InvalidWeight { weight: f64 },

    #[error("non-finite time {time}")]
    NonFiniteTime { time: Time },

    #[error("{operation} of order {order} is not implemented")]
    Unimplemented { operation: &'static str, order: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("unknown interpolation policy '{0}'")]
    UnknownPolicy(String),

    #[error("least-squares solver failed: {0}")]
    Solver(String),
}

impl CurveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CurveError::Io(_) | CurveError::Json(_) | CurveError::UnknownPolicy(_) => {
                ErrorKind::Configuration
            }
            CurveError::Solver(_) => ErrorKind::Numerical,
            _ => ErrorKind::PreconditionViolation,
        }
    }

    pub fn is_precondition_violation(&self) -> bool {
        self.kind() == ErrorKind::PreconditionViolation
    }
}

// argmin 回傳的錯誤若原本就是 CurveError（從 residual / Jacobian 傳出），還原成原本的 variant。
impl From<argmin::core::Error> for CurveError {
    fn from(error: argmin::core::Error) -> Self {
        match error.downcast::<CurveError>() {
            Ok(curve_error) => curve_error,
            Err(other) => CurveError::Solver(other.to_string())
        }
    }
}

pub type CurveResult<T> = Result<T, CurveError>;
