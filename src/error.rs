use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AmortizeError {
    #[error("effective rate did not converge after {iterations} iterations (last delta: {last_delta:e})")]
    ConvergenceFailure { iterations: u32, last_delta: f64 },

    #[error("invalid fee amount: {input:?}")]
    InvalidFee { input: String },
}

pub type Result<T> = std::result::Result<T, AmortizeError>;
