//! Error types for netlink and ipset operations.

use std::io;

use crate::ipset::ErrorCode;

/// Result type for netlink operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during netlink operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error from socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Kernel returned an error code.
    #[error("kernel error: {code}")]
    Kernel {
        /// The translated error number.
        code: ErrorCode,
    },

    /// Kernel error with operation context.
    #[error("{operation}: {code}")]
    KernelWithContext {
        /// The operation that failed.
        operation: String,
        /// The translated error number.
        code: ErrorCode,
    },

    /// Message was truncated.
    #[error("message truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Expected message length.
        expected: usize,
        /// Actual bytes received.
        actual: usize,
    },

    /// Invalid message format.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Invalid attribute format.
    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),

    /// Set type name not known to this crate.
    #[error("unknown set type: {0}")]
    UnknownSetType(String),

    /// No response within the configured timeout.
    #[error("timed out waiting for kernel response")]
    Timeout,
}

impl Error {
    /// Create a kernel error from an errno value.
    ///
    /// Accepts the negative value found in `nlmsgerr` as well as a positive one.
    pub fn from_errno(errno: i32) -> Self {
        Self::Kernel {
            code: ErrorCode::from_raw(errno.saturating_abs()),
        }
    }

    /// Create a kernel error with operation context.
    pub fn from_errno_with_context(errno: i32, operation: impl Into<String>) -> Self {
        Self::from_errno(errno).with_context(operation)
    }

    /// Add context to this error.
    ///
    /// Wraps kernel errors with operation context. Other errors are returned unchanged.
    pub fn with_context(self, operation: impl Into<String>) -> Self {
        match self {
            Self::Kernel { code } => Self::KernelWithContext {
                operation: operation.into(),
                code,
            },
            other => other,
        }
    }

    /// The translated kernel error, if this is one.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Kernel { code } | Self::KernelWithContext { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Get the errno value if this is a kernel error.
    pub fn errno(&self) -> Option<i32> {
        self.code().map(ErrorCode::raw)
    }

    /// Check if this is a "set does not exist" error (ENOENT).
    pub fn is_not_found(&self) -> bool {
        self.code() == Some(ErrorCode::SET_NOT_EXIST)
    }

    /// Check if this is a permission error (EPERM, EACCES).
    pub fn is_permission_denied(&self) -> bool {
        matches!(
            self.code(),
            Some(ErrorCode::Os(libc::EPERM | libc::EACCES))
        )
    }

    /// Check if the element or set already exists (IPSET_ERR_EXIST or EEXIST).
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self.code(),
            Some(ErrorCode::Exist | ErrorCode::Os(libc::EEXIST))
        )
    }

    /// Check if the set is busy (IPSET_ERR_BUSY or EBUSY).
    pub fn is_busy(&self) -> bool {
        matches!(
            self.code(),
            Some(ErrorCode::Busy | ErrorCode::Os(libc::EBUSY))
        )
    }
}

impl PartialEq<ErrorCode> for Error {
    fn eq(&self, other: &ErrorCode) -> bool {
        self.code() == Some(*other)
    }
}
