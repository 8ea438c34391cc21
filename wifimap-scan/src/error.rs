use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The tool could not be started or exited abnormally
    CommandFailed(String),
    /// The tool did not finish in time and was killed
    Timeout(String),
    NotSupported,
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::CommandFailed(reason) => write!(f, "command failed: {}", reason),
            ScanError::Timeout(command) => write!(f, "command timed out: {}", command),
            ScanError::NotSupported => f.write_str("not supported on this platform"),
        }
    }
}

impl std::error::Error for ScanError {}
