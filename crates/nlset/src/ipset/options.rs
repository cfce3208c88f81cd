//! Creation options and their per-type resolution.

use std::net::IpAddr;
use std::time::Duration;

use super::settype::SetType;
use super::types::CadtFlags;
use crate::util::addr::to_ipv4_form;

/// Address family of a set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Family {
    /// No family attribute is sent.
    #[default]
    Unspec,
    Inet,
    Inet6,
}

impl Family {
    /// The AF_* value on the wire.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Unspec => libc::AF_UNSPEC as u8,
            Self::Inet => libc::AF_INET as u8,
            Self::Inet6 => libc::AF_INET6 as u8,
        }
    }

    /// Map an AF_* value, keeping unknown values as `Unspec`.
    pub fn from_u8(value: u8) -> Self {
        match i32::from(value) {
            libc::AF_INET => Self::Inet,
            libc::AF_INET6 => Self::Inet6,
            _ => Self::Unspec,
        }
    }
}

/// Options for creating a set.
///
/// Every field is optional; [`CreateOptions::resolve`] fills in what the set
/// type requires.
///
/// # Example
///
/// ```ignore
/// use nlset::ipset::CreateOptions;
/// use std::time::Duration;
///
/// let opts = CreateOptions::new()
///     .size(1024)
///     .timeout(Duration::from_secs(600))
///     .comments(true);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CreateOptions {
    pub family: Family,
    /// Override of the IPSET_ATTR_PROTOCOL byte.
    pub protocol: Option<u8>,
    /// Hash size (hash types) or list size (list:set). Zero means kernel default.
    pub size: u32,
    /// Accept an existing compatible set instead of failing.
    pub replace: bool,
    /// Default entry timeout in seconds.
    pub timeout: Option<u32>,
    pub counters: bool,
    pub comments: bool,
    pub skbinfo: bool,
    pub forceadd: bool,
    /// Requested type revision; unsupported values fall back to the newest.
    pub revision: Option<u8>,
    pub ip_from: Option<IpAddr>,
    pub ip_to: Option<IpAddr>,
    pub port_from: u16,
    pub port_to: u16,
    pub netmask: Option<u8>,
    pub max_elements: Option<u32>,
    pub mark_mask: Option<u32>,
}

impl CreateOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn family(mut self, family: Family) -> Self {
        self.family = family;
        self
    }

    pub fn protocol(mut self, protocol: u8) -> Self {
        self.protocol = Some(protocol);
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    /// Default timeout for entries, truncated to whole seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(u32::try_from(timeout.as_secs()).unwrap_or(u32::MAX));
        self
    }

    pub fn counters(mut self, enabled: bool) -> Self {
        self.counters = enabled;
        self
    }

    pub fn comments(mut self, enabled: bool) -> Self {
        self.comments = enabled;
        self
    }

    pub fn skbinfo(mut self, enabled: bool) -> Self {
        self.skbinfo = enabled;
        self
    }

    pub fn forceadd(mut self, enabled: bool) -> Self {
        self.forceadd = enabled;
        self
    }

    pub fn revision(mut self, revision: u8) -> Self {
        self.revision = Some(revision);
        self
    }

    /// Address range of a bitmap:ip or bitmap:ip,mac set.
    pub fn ip_range(mut self, from: IpAddr, to: IpAddr) -> Self {
        self.ip_from = Some(from);
        self.ip_to = Some(to);
        self
    }

    /// Port range of a bitmap:port set.
    pub fn port_range(mut self, from: u16, to: u16) -> Self {
        self.port_from = from;
        self.port_to = to;
        self
    }

    pub fn netmask(mut self, prefix: u8) -> Self {
        self.netmask = Some(prefix);
        self
    }

    pub fn max_elements(mut self, max: u32) -> Self {
        self.max_elements = Some(max);
        self
    }

    pub fn mark_mask(mut self, mask: u32) -> Self {
        self.mark_mask = Some(mask);
        self
    }

    /// Feature flags derived from the boolean options.
    pub fn cadt_flags(&self) -> CadtFlags {
        let mut flags = CadtFlags::default();
        if self.comments {
            flags |= CadtFlags::WITH_COMMENT;
        }
        if self.counters {
            flags |= CadtFlags::WITH_COUNTERS;
        }
        if self.skbinfo {
            flags |= CadtFlags::WITH_SKBINFO;
        }
        if self.forceadd {
            flags |= CadtFlags::WITH_FORCEADD;
        }
        flags
    }

    /// Fill in type-dependent defaults.
    ///
    /// The revision becomes the newest one the type supports unless a
    /// supported revision was requested. Types that carry a family default to
    /// IPv4; the others keep `Unspec`. For IPv4, range bounds are reduced to
    /// their 4-byte form.
    pub fn resolve(mut self, set_type: SetType) -> Self {
        let info = set_type.info();

        self.revision = match self.revision {
            Some(rev) if info.supports_revision(rev) => Some(rev),
            _ => Some(info.newest_revision()),
        };

        if !info.has_family {
            self.family = Family::Unspec;
        } else if self.family == Family::Unspec {
            self.family = Family::Inet;
        }

        if self.family == Family::Inet {
            self.ip_from = self.ip_from.map(to_ipv4_form);
            self.ip_to = self.ip_to.map(to_ipv4_form);
        }

        self
    }
}
