//! Error type shared by the hypnogram routines.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HypnoError {
    /// The label sequence had no samples.
    #[error("hypnogram is empty")]
    EmptyHypnogram,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Drawing or encoding the chart failed.
    #[error("render error: {0}")]
    Render(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HypnoError>;

impl HypnoError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}
