//! The error type shared by the loading, persisting and replay code paths.
//! The guidance engine itself never fails; see the degraded paths in
//! [`crate::engine`].

use std::{borrow::Cow, error::Error, fmt, sync::mpsc};

/// A nice little error that we can return if things go wrong while loading
/// configuration, persisting preferences or replaying traces.
#[derive(Debug)]
pub enum GuideError {
    /// Returned when io fails when reading or writing files.
    IoError(std::io::Error),

    /// Returned when serialization to RON fails.
    RonError(ron::Error),

    /// Returned when deserialization from RON fails.
    RonSpannedError(ron::de::SpannedError),

    /// Returned when a location trace line cannot be parsed.
    TraceError { line: usize, input: String },

    /// Returned when a configuration value makes no sense.
    InvalidConfig(String),

    /// Returned when the other end of a channel went away.
    Disconnected,
}

impl fmt::Display for GuideError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use GuideError as GE;
        let msg = match self {
            GE::IoError(error) => Cow::from(format!("io error: {}", error)),
            GE::RonError(error) => Cow::from(format!("ron error: {}", error)),
            GE::RonSpannedError(error) => Cow::from(format!("ron spanning error: {}", error)),
            GE::TraceError { line, input } => {
                Cow::from(format!("unparsable trace line {}: {:?}", line, input))
            }
            GE::InvalidConfig(why) => Cow::from(format!("invalid configuration: {}", why)),
            GE::Disconnected => Cow::from("channel disconnected"),
        };

        write!(f, "{}", msg)
    }
}

impl Error for GuideError {}

impl From<std::io::Error> for GuideError {
    fn from(value: std::io::Error) -> Self {
        Self::IoError(value)
    }
}

impl From<ron::Error> for GuideError {
    fn from(value: ron::Error) -> Self {
        Self::RonError(value)
    }
}

impl From<ron::de::SpannedError> for GuideError {
    fn from(value: ron::de::SpannedError) -> Self {
        Self::RonSpannedError(value)
    }
}

impl<T> From<mpsc::SendError<T>> for GuideError {
    fn from(_: mpsc::SendError<T>) -> Self {
        Self::Disconnected
    }
}

impl From<mpsc::RecvError> for GuideError {
    fn from(_: mpsc::RecvError) -> Self {
        Self::Disconnected
    }
}
