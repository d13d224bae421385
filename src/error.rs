use thiserror::Error;

/// Result type for DSP operations
pub type Result<T> = std::result::Result<T, DspError>;

/// Errors that can occur when talking to a DSP
#[derive(Error, Debug)]
pub enum DspError {
    /// Address resolution, dial, read or write failed
    #[error("Connection error with {address}: {source}")]
    Connection {
        /// Device address
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// No complete frame arrived within the read deadline
    #[error("Timed out waiting for a frame from {address}")]
    Timeout {
        /// Device address
        address: String,
    },

    /// The operation was cancelled by the caller
    #[error("Request to {address} was cancelled")]
    Cancelled {
        /// Device address
        address: String,
    },

    /// The request could not be serialized
    #[error("Could not encode request for {address}: {source}")]
    Encoding {
        /// Device address
        address: String,
        #[source]
        source: serde_json::Error,
    },

    /// The device sent something that does not have the expected shape
    #[error("Invalid response from {address}: {detail} (frame: {frame})")]
    Protocol {
        /// Device address
        address: String,
        /// What was wrong with the frame
        detail: String,
        /// The offending frame, or `name=value` for a bad control value
        frame: String,
    },

    /// A set acknowledgment echoed a different name than the one sent
    #[error("Invalid response from {address}, the name received does not match the name sent {expected}/{received}")]
    Validation {
        /// Device address
        address: String,
        /// Name sent in the request
        expected: String,
        /// Name echoed by the device
        received: String,
    },

    /// A get response had no entry for the requested name
    #[error("No value returned from {address} with the name {name}")]
    NotFound {
        /// Device address
        address: String,
        /// Control name that was requested
        name: String,
    },

    /// A caller supplied value is out of range or not a number
    #[error("Invalid value for {name}: {detail}")]
    InvalidValue {
        /// Control the value was meant for
        name: String,
        /// Why the value was rejected
        detail: String,
    },
}

/// Fieldless view of a [`DspError`] for matching on the error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`DspError::Connection`]
    Connection,
    /// See [`DspError::Timeout`]
    Timeout,
    /// See [`DspError::Cancelled`]
    Cancelled,
    /// See [`DspError::Encoding`]
    Encoding,
    /// See [`DspError::Protocol`]
    Protocol,
    /// See [`DspError::Validation`]
    Validation,
    /// See [`DspError::NotFound`]
    NotFound,
    /// See [`DspError::InvalidValue`]
    InvalidValue,
}

impl DspError {
    /// Get the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DspError::Connection { .. } => ErrorKind::Connection,
            DspError::Timeout { .. } => ErrorKind::Timeout,
            DspError::Cancelled { .. } => ErrorKind::Cancelled,
            DspError::Encoding { .. } => ErrorKind::Encoding,
            DspError::Protocol { .. } => ErrorKind::Protocol,
            DspError::Validation { .. } => ErrorKind::Validation,
            DspError::NotFound { .. } => ErrorKind::NotFound,
            DspError::InvalidValue { .. } => ErrorKind::InvalidValue,
        }
    }

    pub(crate) fn protocol(
        address: &str,
        detail: impl Into<String>,
        frame: &[u8],
    ) -> Self {
        DspError::Protocol {
            address: address.to_string(),
            detail: detail.into(),
            frame: String::from_utf8_lossy(frame).into_owned(),
        }
    }
}
