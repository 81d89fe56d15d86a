use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;

use crate::matrix::MatrixCommand;

#[derive(Error, Debug, Serialize)]
pub enum DispatchError {
    #[error("unknown entity `{0}`")]
    UnknownEntity(String),
    #[error("unknown option `{0}`")]
    UnknownOption(String),
    #[error("matrix channel error `{0}`")]
    MatrixChannelError(MatrixChannelError),
    #[error("json encoding error `{0}`")]
    JsonEncodingError(String),
}

#[derive(Error, Debug, Serialize)]
pub enum MatrixChannelError {
    #[error("full")]
    Full,
    #[error("closed")]
    Closed,
}

impl From<TrySendError<MatrixCommand>> for MatrixChannelError {
    fn from(value: TrySendError<MatrixCommand>) -> Self {
        match value {
            TrySendError::Full(_) => Self::Full,
            TrySendError::Closed(_) => Self::Closed,
        }
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(value: serde_json::Error) -> Self {
        Self::JsonEncodingError(value.to_string())
    }
}

impl From<MatrixChannelError> for DispatchError {
    fn from(value: MatrixChannelError) -> Self {
        Self::MatrixChannelError(value)
    }
}
