use std::{error::Error, fmt::Display, sync::mpsc};

use crate::error::GuideError;

#[derive(Debug)]
pub enum GuideGuiError {
    FmtError(std::fmt::Error),
    IOError(std::io::Error),
    GuideError(GuideError),
    MPSCSendError,
    MPSCRecvError(mpsc::RecvError),
    MPSCTryRecvError(mpsc::TryRecvError),
    JoinError,
}

impl Display for GuideGuiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GuideError(e) => write!(f, "{e}"),
            Self::IOError(e) => write!(f, "terminal io error: {e}"),
            other => write!(f, "{:?}", other),
        }
    }
}

impl Error for GuideGuiError {}

impl From<std::fmt::Error> for GuideGuiError {
    fn from(value: std::fmt::Error) -> Self {
        Self::FmtError(value)
    }
}

impl From<std::io::Error> for GuideGuiError {
    fn from(value: std::io::Error) -> Self {
        Self::IOError(value)
    }
}

impl From<GuideError> for GuideGuiError {
    fn from(value: GuideError) -> Self {
        Self::GuideError(value)
    }
}

impl<T> From<mpsc::SendError<T>> for GuideGuiError {
    fn from(_: mpsc::SendError<T>) -> Self {
        Self::MPSCSendError
    }
}

impl From<mpsc::RecvError> for GuideGuiError {
    fn from(value: mpsc::RecvError) -> Self {
        Self::MPSCRecvError(value)
    }
}

impl From<mpsc::TryRecvError> for GuideGuiError {
    fn from(value: mpsc::TryRecvError) -> Self {
        Self::MPSCTryRecvError(value)
    }
}
