use thiserror::Error;

pub type ComputeResult<T> = Result<T, ComputeError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputeError {
    #[error("Method {method} is not supported for {view_type} views")]
    UnsupportedMethod {
        view_type: &'static str,
        method: &'static str,
    },

    #[error("Not enough data: {what}")]
    InsufficientData { what: String },

    #[error("Column not found in request data: {name}")]
    MissingColumn { name: String },

    #[error("Coefficient and feature columns differ in length ({coefficients} vs {features})")]
    CoefficientMismatch { features: usize, coefficients: usize },

    #[error("Numeric failure: {what}")]
    Numeric { what: String },
}
