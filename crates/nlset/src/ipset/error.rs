//! Translation of kernel error numbers into ipset conditions.
//!
//! The kernel reports ipset failures with three kinds of numbers:
//!
//! - below 4096: plain errno values (`ENOENT`, `EMSGSIZE`, ...);
//! - 4096 to 4351: ipset-wide conditions, each with a named variant here;
//! - 4352 and above: per-type codes, kept raw.

use std::fmt;
use std::io;

use super::types::ipset_err;

/// A translated kernel error number.
///
/// Values compare equal to the sentinel constants on this type, so callers can
/// branch on `code == ErrorCode::SET_NOT_EXIST`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ErrorCode {
    /// Generic OS errno.
    Os(i32),
    Private,
    Protocol,
    FindType,
    MaxSets,
    Busy,
    ExistSetname2,
    TypeMismatch,
    Exist,
    InvalidCidr,
    InvalidNetmask,
    InvalidFamily,
    Timeout,
    Referenced,
    Ipv4Address,
    Ipv6Address,
    Counter,
    Comment,
    InvalidMarkmask,
    Skbinfo,
    /// Unnamed or type-specific code.
    Other(i32),
}

impl ErrorCode {
    /// The set does not exist (`ENOENT`).
    pub const SET_NOT_EXIST: Self = Self::Os(libc::ENOENT);
    /// The request does not fit a netlink message (`EMSGSIZE`).
    pub const MESSAGE_TOO_LARGE: Self = Self::Os(libc::EMSGSIZE);
    /// A set with the same name exists and is not compatible (`EEXIST`).
    pub const SET_EXISTS: Self = Self::Os(libc::EEXIST);
    /// The element (or set) is already present.
    pub const ALREADY_EXISTS: Self = Self::Exist;
    /// Swap target does not exist.
    pub const SECOND_SET_NOT_EXIST: Self = Self::ExistSetname2;
    /// Rename target is already taken.
    pub const NEW_NAME_ALREADY_EXISTS: Self = Self::ExistSetname2;
    pub const TYPE_MISMATCH: Self = Self::TypeMismatch;
    pub const BUSY: Self = Self::Busy;
    pub const REFERENCED: Self = Self::Referenced;
    pub const MAX_SETS: Self = Self::MaxSets;

    /// Translate a raw, positive error number.
    pub fn from_raw(errno: i32) -> Self {
        match errno {
            n if n < ipset_err::PRIVATE => Self::Os(n),
            ipset_err::PRIVATE => Self::Private,
            ipset_err::PROTOCOL => Self::Protocol,
            ipset_err::FIND_TYPE => Self::FindType,
            ipset_err::MAX_SETS => Self::MaxSets,
            ipset_err::BUSY => Self::Busy,
            ipset_err::EXIST_SETNAME2 => Self::ExistSetname2,
            ipset_err::TYPE_MISMATCH => Self::TypeMismatch,
            ipset_err::EXIST => Self::Exist,
            ipset_err::INVALID_CIDR => Self::InvalidCidr,
            ipset_err::INVALID_NETMASK => Self::InvalidNetmask,
            ipset_err::INVALID_FAMILY => Self::InvalidFamily,
            ipset_err::TIMEOUT => Self::Timeout,
            ipset_err::REFERENCED => Self::Referenced,
            ipset_err::IPADDR_IPV4 => Self::Ipv4Address,
            ipset_err::IPADDR_IPV6 => Self::Ipv6Address,
            ipset_err::COUNTER => Self::Counter,
            ipset_err::COMMENT => Self::Comment,
            ipset_err::INVALID_MARKMASK => Self::InvalidMarkmask,
            ipset_err::SKBINFO => Self::Skbinfo,
            n => Self::Other(n),
        }
    }

    /// The raw error number this code was translated from.
    pub fn raw(self) -> i32 {
        match self {
            Self::Os(n) | Self::Other(n) => n,
            Self::Private => ipset_err::PRIVATE,
            Self::Protocol => ipset_err::PROTOCOL,
            Self::FindType => ipset_err::FIND_TYPE,
            Self::MaxSets => ipset_err::MAX_SETS,
            Self::Busy => ipset_err::BUSY,
            Self::ExistSetname2 => ipset_err::EXIST_SETNAME2,
            Self::TypeMismatch => ipset_err::TYPE_MISMATCH,
            Self::Exist => ipset_err::EXIST,
            Self::InvalidCidr => ipset_err::INVALID_CIDR,
            Self::InvalidNetmask => ipset_err::INVALID_NETMASK,
            Self::InvalidFamily => ipset_err::INVALID_FAMILY,
            Self::Timeout => ipset_err::TIMEOUT,
            Self::Referenced => ipset_err::REFERENCED,
            Self::Ipv4Address => ipset_err::IPADDR_IPV4,
            Self::Ipv6Address => ipset_err::IPADDR_IPV6,
            Self::Counter => ipset_err::COUNTER,
            Self::Comment => ipset_err::COMMENT,
            Self::InvalidMarkmask => ipset_err::INVALID_MARKMASK,
            Self::Skbinfo => ipset_err::SKBINFO,
        }
    }

    /// Whether the number came from the per-type range.
    pub fn is_type_specific(self) -> bool {
        matches!(self, Self::Other(n) if n >= ipset_err::TYPE_SPECIFIC)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Os(n) => return write!(f, "{}", io::Error::from_raw_os_error(*n)),
            Self::Other(n) => return write!(f, "errno {}", n),
            Self::Private => "private ipset error",
            Self::Protocol => "kernel does not support the requested ipset protocol",
            Self::FindType => "set type is not supported by the kernel",
            Self::MaxSets => "kernel limit on the number of sets reached",
            Self::Busy => "set is in use by the kernel",
            Self::ExistSetname2 => {
                "second set does not exist or new name already exists"
            }
            Self::TypeMismatch => "sets of incompatible types",
            Self::Exist => "element or set already exists",
            Self::InvalidCidr => "invalid CIDR prefix length",
            Self::InvalidNetmask => "invalid netmask",
            Self::InvalidFamily => "invalid address family",
            Self::Timeout => "set was created without timeout support",
            Self::Referenced => "set is referenced and cannot be destroyed",
            Self::Ipv4Address => "an IPv4 address is expected",
            Self::Ipv6Address => "an IPv6 address is expected",
            Self::Counter => "set was created without counter support",
            Self::Comment => "set was created without comment support",
            Self::InvalidMarkmask => "invalid mark mask",
            Self::Skbinfo => "set was created without skbinfo support",
        };
        f.write_str(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_errno_keeps_identity() {
        assert_eq!(ErrorCode::from_raw(2), ErrorCode::SET_NOT_EXIST);
        assert_eq!(ErrorCode::from_raw(libc::EMSGSIZE), ErrorCode::MESSAGE_TOO_LARGE);
        assert_eq!(ErrorCode::from_raw(2).raw(), 2);
        assert!(ErrorCode::SET_NOT_EXIST.to_string().contains("No such file"));
    }

    #[test]
    fn test_named_range() {
        assert_eq!(ErrorCode::from_raw(4103), ErrorCode::ALREADY_EXISTS);
        assert_eq!(ErrorCode::from_raw(4102), ErrorCode::TYPE_MISMATCH);
        assert_eq!(ErrorCode::from_raw(4100), ErrorCode::BUSY);
        assert_eq!(ErrorCode::from_raw(4101), ErrorCode::SECOND_SET_NOT_EXIST);
        assert_eq!(
            ErrorCode::SECOND_SET_NOT_EXIST,
            ErrorCode::NEW_NAME_ALREADY_EXISTS
        );
        assert_ne!(ErrorCode::from_raw(4103), ErrorCode::SET_NOT_EXIST);
    }

    #[test]
    fn test_every_named_code_roundtrips() {
        for raw in ipset_err::PRIVATE..=ipset_err::SKBINFO {
            let code = ErrorCode::from_raw(raw);
            assert!(!matches!(code, ErrorCode::Other(_)), "{} unnamed", raw);
            assert_eq!(code.raw(), raw);
            assert!(!code.to_string().starts_with("errno"));
        }
    }

    #[test]
    fn test_fallback_message() {
        let code = ErrorCode::from_raw(4096 + 600);
        assert_eq!(code, ErrorCode::Other(4696));
        assert!(code.is_type_specific());
        assert_eq!(code.to_string(), "errno 4696");

        // Gap between the named and the per-type ranges.
        let code = ErrorCode::from_raw(4200);
        assert!(!code.is_type_specific());
        assert!(code.to_string().contains("4200"));
    }
}
