//! ipset kernel constants.
//!
//! These constants match the Linux kernel's ipset netlink interface
//! definitions from `include/uapi/linux/netfilter/ipset/ip_set.h`.

/// nfnetlink subsystem id of ipset.
pub const NFNL_SUBSYS_IPSET: u8 = 6;

/// Protocol version spoken by this crate.
pub const IPSET_PROTOCOL: u8 = 6;

/// Maximum set name length, terminator included.
pub const IPSET_MAXNAMELEN: usize = 32;

/// ipset commands.
pub mod ipset_cmd {
    pub const PROTOCOL: u8 = 1;
    pub const CREATE: u8 = 2;
    pub const DESTROY: u8 = 3;
    pub const FLUSH: u8 = 4;
    pub const RENAME: u8 = 5;
    pub const SWAP: u8 = 6;
    pub const LIST: u8 = 7;
    pub const SAVE: u8 = 8;
    pub const ADD: u8 = 9;
    pub const DEL: u8 = 10;
    pub const TEST: u8 = 11;
    pub const HEADER: u8 = 12;
    pub const TYPE: u8 = 13;
}

/// Top-level attributes.
pub mod ipset_attr {
    pub const PROTOCOL: u16 = 1;
    pub const SETNAME: u16 = 2;
    pub const TYPENAME: u16 = 3;
    /// Second set name for rename/swap (shares the TYPENAME code).
    pub const SETNAME2: u16 = TYPENAME;
    pub const REVISION: u16 = 4;
    pub const FAMILY: u16 = 5;
    pub const FLAGS: u16 = 6;
    /// Nested header or entry data.
    pub const DATA: u16 = 7;
    /// Nested list of entries.
    pub const ADT: u16 = 8;
    pub const LINENO: u16 = 9;
    pub const PROTOCOL_MIN: u16 = 10;
    /// Minimal supported type revision (shares the PROTOCOL_MIN code).
    pub const REVISION_MIN: u16 = PROTOCOL_MIN;
}

/// Attributes shared by create and add/del/test data.
pub mod ipset_cadt_attr {
    pub const IP: u16 = 1;
    pub const IP_FROM: u16 = IP;
    pub const IP_TO: u16 = 2;
    pub const CIDR: u16 = 3;
    pub const PORT: u16 = 4;
    pub const PORT_FROM: u16 = PORT;
    pub const PORT_TO: u16 = 5;
    pub const TIMEOUT: u16 = 6;
    pub const PROTO: u16 = 7;
    pub const CADT_FLAGS: u16 = 8;
    pub const CADT_LINENO: u16 = super::ipset_attr::LINENO;
    pub const MARK: u16 = 10;
    pub const MARKMASK: u16 = 11;
}

/// Create-only data attributes.
pub mod ipset_create_attr {
    pub const GC: u16 = 17;
    pub const HASHSIZE: u16 = 18;
    pub const MAXELEM: u16 = 19;
    pub const NETMASK: u16 = 20;
    pub const PROBES: u16 = 21;
    pub const RESIZE: u16 = 22;
    pub const SIZE: u16 = 23;
    pub const ELEMENTS: u16 = 24;
    pub const REFERENCES: u16 = 25;
    pub const MEMSIZE: u16 = 26;
}

/// Add/del/test-only data attributes.
pub mod ipset_adt_attr {
    pub const ETHER: u16 = 17;
    pub const NAME: u16 = 18;
    pub const NAMEREF: u16 = 19;
    pub const IP2: u16 = 20;
    pub const CIDR2: u16 = 21;
    pub const IP2_TO: u16 = 22;
    pub const IFACE: u16 = 23;
    pub const BYTES: u16 = 24;
    pub const PACKETS: u16 = 25;
    pub const COMMENT: u16 = 26;
    pub const SKBMARK: u16 = 27;
    pub const SKBPRIO: u16 = 28;
    pub const SKBQUEUE: u16 = 29;
}

/// Address attributes nested inside IP/IP_TO/IP2.
pub mod ipset_ipaddr_attr {
    pub const IPV4: u16 = 1;
    pub const IPV6: u16 = 2;
}

/// Kernel error codes beyond the errno range.
pub mod ipset_err {
    pub const PRIVATE: i32 = 4096;
    pub const PROTOCOL: i32 = 4097;
    pub const FIND_TYPE: i32 = 4098;
    pub const MAX_SETS: i32 = 4099;
    pub const BUSY: i32 = 4100;
    pub const EXIST_SETNAME2: i32 = 4101;
    pub const TYPE_MISMATCH: i32 = 4102;
    pub const EXIST: i32 = 4103;
    pub const INVALID_CIDR: i32 = 4104;
    pub const INVALID_NETMASK: i32 = 4105;
    pub const INVALID_FAMILY: i32 = 4106;
    pub const TIMEOUT: i32 = 4107;
    pub const REFERENCED: i32 = 4108;
    pub const IPADDR_IPV4: i32 = 4109;
    pub const IPADDR_IPV6: i32 = 4110;
    pub const COUNTER: i32 = 4111;
    pub const COMMENT: i32 = 4112;
    pub const INVALID_MARKMASK: i32 = 4113;
    pub const SKBINFO: i32 = 4114;
    /// First code of the per-type (bitmap/hash/list) ranges.
    pub const TYPE_SPECIFIC: i32 = 4352;
}

/// Set feature flags carried in CADT_FLAGS.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CadtFlags(pub u32);

impl CadtFlags {
    pub const BEFORE: Self = Self(1 << 0);
    pub const PHYSDEV: Self = Self(1 << 1);
    pub const NOMATCH: Self = Self(1 << 2);
    pub const WITH_COUNTERS: Self = Self(1 << 3);
    pub const WITH_COMMENT: Self = Self(1 << 4);
    pub const WITH_FORCEADD: Self = Self(1 << 5);
    pub const WITH_SKBINFO: Self = Self(1 << 6);

    /// Raw bits.
    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Check that every bit of `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for CadtFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for CadtFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// IP protocol numbers used by port-bearing set types.
pub mod ip_proto {
    pub const TCP: u8 = libc::IPPROTO_TCP as u8;
    pub const UDP: u8 = libc::IPPROTO_UDP as u8;
    pub const SCTP: u8 = libc::IPPROTO_SCTP as u8;
}
