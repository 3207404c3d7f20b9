//! Error types for SDM verification.

use thiserror::Error;

/// Broad class of a failure, used by callers to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required value was absent or empty.
    Input,
    /// A value was present but is not hex of the expected size.
    Format,
    /// The cipher primitive was driven with inputs it cannot accept.
    Internal,
}

/// Errors that can occur while verifying an SDM message.
#[derive(Debug, Error)]
pub enum SdmError {
    /// Parameter is missing or empty
    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    /// Value has the wrong number of hex characters
    #[error("Invalid length for {field}: expected {expected} hex characters, got {got}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    /// Value contains non-hex characters or has odd length
    #[error("Invalid hex in {field}: {source}")]
    InvalidHex {
        field: &'static str,
        #[source]
        source: hex::FromHexError,
    },

    /// AES-128 key of the wrong size
    #[error("AES key must be 16 bytes, got {0}")]
    KeyLength(usize),

    /// Block CMAC was handed a message it does not cover
    #[error("Block CMAC accepts 0 or 16 byte messages, got {0}")]
    BlockLength(usize),
}

impl SdmError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SdmError::MissingParameter(_) => ErrorKind::Input,
            SdmError::InvalidLength { .. } | SdmError::InvalidHex { .. } => ErrorKind::Format,
            SdmError::KeyLength(_) | SdmError::BlockLength(_) => ErrorKind::Internal,
        }
    }
}

/// Result type alias for SDM operations.
pub type Result<T> = std::result::Result<T, SdmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(SdmError::MissingParameter("uid").kind(), ErrorKind::Input);
        assert_eq!(
            SdmError::InvalidLength {
                field: "uid",
                expected: 14,
                got: 13
            }
            .kind(),
            ErrorKind::Format
        );
        assert_eq!(SdmError::BlockLength(3).kind(), ErrorKind::Internal);
        assert_eq!(SdmError::KeyLength(8).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_messages_name_the_field() {
        let err = SdmError::InvalidLength {
            field: "ctr",
            expected: 6,
            got: 4,
        };
        assert_eq!(
            err.to_string(),
            "Invalid length for ctr: expected 6 hex characters, got 4"
        );
    }
}
