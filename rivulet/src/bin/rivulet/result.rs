use rivulet::core::ConstraintOperationError;
use rivulet::core::RuntimeError;
use thiserror::Error;

pub(crate) type RivuletResult<T> = Result<T, RivuletError>;

#[derive(Error, Debug)]
pub(crate) enum RivuletError {
    #[error("IO error, more details: {0}")]
    IOError(#[from] std::io::Error),
    #[error("The model could not be built: {0}")]
    Model(#[from] ConstraintOperationError),
    #[error("The runtime reported an error: {0}")]
    Runtime(#[from] RuntimeError),
    #[error("{0} did not finish within the time limit")]
    Timeout(&'static str),
}
