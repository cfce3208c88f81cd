//! Set types and the per-type descriptor table.
//!
//! Every set type the crate knows is described by one [`TypeInfo`] row: its
//! storage method, the revisions it supports (newest first), whether a family
//! attribute is sent, and which range attributes a bitmap takes. Request
//! building and option resolution both read this table.

use std::fmt;
use std::str::FromStr;

use super::types::ipset_create_attr;
use crate::netlink::Error;

/// Storage family of a set type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Method {
    Hash,
    Bitmap,
    List,
}

/// Range attributes taken by bitmap types at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range {
    None,
    /// IP_FROM / IP_TO as nested addresses.
    Ip,
    /// PORT_FROM / PORT_TO as 16-bit integers.
    Port,
}

/// Static description of a set type.
#[derive(Debug)]
pub struct TypeInfo {
    pub name: &'static str,
    pub method: Method,
    /// Supported revisions, newest first.
    pub revisions: &'static [u8],
    /// Whether requests carry IPSET_ATTR_FAMILY.
    pub has_family: bool,
    pub range: Range,
}

impl TypeInfo {
    /// Newest supported revision.
    pub fn newest_revision(&self) -> u8 {
        self.revisions.first().copied().unwrap_or(0)
    }

    pub fn supports_revision(&self, revision: u8) -> bool {
        self.revisions.contains(&revision)
    }

    /// Attribute carrying the user-supplied size, if the method takes one.
    pub fn size_attr(&self) -> Option<u16> {
        match self.method {
            Method::Hash => Some(ipset_create_attr::HASHSIZE),
            Method::List => Some(ipset_create_attr::SIZE),
            Method::Bitmap => None,
        }
    }
}

/// Kernel set types.
///
/// Variants are declared in the order of [`TYPES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SetType {
    ListSet,
    HashMac,
    HashIpMac,
    HashNetIface,
    HashNetPort,
    HashNetPortNet,
    HashNetNet,
    HashNet,
    HashIpPortNet,
    HashIpPortIp,
    HashIpMark,
    HashIpPort,
    HashIp,
    BitmapPort,
    BitmapIpMac,
    BitmapIp,
}

/// Descriptor table, one row per [`SetType`] variant.
static TYPES: [TypeInfo; 16] = [
    TypeInfo {
        name: "list:set",
        method: Method::List,
        revisions: &[3, 2, 1, 0],
        has_family: false,
        range: Range::None,
    },
    TypeInfo {
        name: "hash:mac",
        method: Method::Hash,
        revisions: &[0],
        has_family: false,
        range: Range::None,
    },
    TypeInfo {
        name: "hash:ip,mac",
        method: Method::Hash,
        revisions: &[0],
        has_family: true,
        range: Range::None,
    },
    TypeInfo {
        name: "hash:net,iface",
        method: Method::Hash,
        revisions: &[6, 5, 4, 3, 2, 1, 0],
        has_family: true,
        range: Range::None,
    },
    TypeInfo {
        name: "hash:net,port",
        method: Method::Hash,
        revisions: &[7, 6, 5, 4, 3, 2, 1],
        has_family: true,
        range: Range::None,
    },
    TypeInfo {
        name: "hash:net,port,net",
        method: Method::Hash,
        revisions: &[2, 1, 0],
        has_family: true,
        range: Range::None,
    },
    TypeInfo {
        name: "hash:net,net",
        method: Method::Hash,
        revisions: &[2, 1, 0],
        has_family: true,
        range: Range::None,
    },
    TypeInfo {
        name: "hash:net",
        method: Method::Hash,
        revisions: &[6, 5, 4, 3, 2, 1, 0],
        has_family: true,
        range: Range::None,
    },
    TypeInfo {
        name: "hash:ip,port,net",
        method: Method::Hash,
        revisions: &[7, 6, 5, 4, 3, 2, 1],
        has_family: true,
        range: Range::None,
    },
    TypeInfo {
        name: "hash:ip,port,ip",
        method: Method::Hash,
        revisions: &[5, 4, 3, 2, 1],
        has_family: true,
        range: Range::None,
    },
    TypeInfo {
        name: "hash:ip,mark",
        method: Method::Hash,
        revisions: &[2, 1, 0],
        has_family: true,
        range: Range::None,
    },
    TypeInfo {
        name: "hash:ip,port",
        method: Method::Hash,
        revisions: &[5, 4, 3, 2, 1],
        has_family: true,
        range: Range::None,
    },
    TypeInfo {
        name: "hash:ip",
        method: Method::Hash,
        revisions: &[4, 3, 2, 1, 0],
        has_family: true,
        range: Range::None,
    },
    TypeInfo {
        name: "bitmap:port",
        method: Method::Bitmap,
        revisions: &[3, 2, 1, 0],
        has_family: false,
        range: Range::Port,
    },
    TypeInfo {
        name: "bitmap:ip,mac",
        method: Method::Bitmap,
        revisions: &[3, 2, 1, 0],
        has_family: true,
        range: Range::Ip,
    },
    TypeInfo {
        name: "bitmap:ip",
        method: Method::Bitmap,
        revisions: &[3, 2, 1, 0],
        has_family: true,
        range: Range::Ip,
    },
];

impl SetType {
    /// All known types.
    pub const ALL: [SetType; 16] = [
        SetType::ListSet,
        SetType::HashMac,
        SetType::HashIpMac,
        SetType::HashNetIface,
        SetType::HashNetPort,
        SetType::HashNetPortNet,
        SetType::HashNetNet,
        SetType::HashNet,
        SetType::HashIpPortNet,
        SetType::HashIpPortIp,
        SetType::HashIpMark,
        SetType::HashIpPort,
        SetType::HashIp,
        SetType::BitmapPort,
        SetType::BitmapIpMac,
        SetType::BitmapIp,
    ];

    /// Descriptor row of this type.
    pub fn info(self) -> &'static TypeInfo {
        &TYPES[self as usize]
    }

    /// Kernel type name, e.g. `hash:ip`.
    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn method(self) -> Method {
        self.info().method
    }

    /// Look a type up by its kernel name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }
}

impl FromStr for SetType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| Error::UnknownSetType(s.to_string()))
    }
}

impl fmt::Display for SetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_roundtrip() {
        for t in SetType::ALL {
            assert_eq!(t.name().parse::<SetType>().unwrap(), t);
            assert_eq!(t.to_string(), t.name());
        }
        assert!(matches!(
            "hash:nope".parse::<SetType>(),
            Err(Error::UnknownSetType(name)) if name == "hash:nope"
        ));
    }

    #[test]
    fn test_table_matches_variants() {
        for (i, t) in SetType::ALL.into_iter().enumerate() {
            assert_eq!(t as usize, i);
            assert_eq!(SetType::from_name(TYPES[i].name), Some(t));
        }
    }

    #[test]
    fn test_revisions_newest_first() {
        for t in SetType::ALL {
            let revs = t.info().revisions;
            assert!(!revs.is_empty(), "{} has no revisions", t);
            assert!(revs.windows(2).all(|w| w[0] > w[1]), "{} not sorted", t);
            assert_eq!(t.info().newest_revision(), revs[0]);
        }
        assert_eq!(SetType::HashIp.info().newest_revision(), 4);
        assert_eq!(SetType::HashNetPort.info().newest_revision(), 7);
        assert!(!SetType::HashNetPort.info().supports_revision(0));
    }

    #[test]
    fn test_family_less_types() {
        let no_family: Vec<_> = SetType::ALL
            .iter()
            .filter(|t| !t.info().has_family)
            .copied()
            .collect();
        assert_eq!(
            no_family,
            vec![SetType::ListSet, SetType::HashMac, SetType::BitmapPort]
        );
    }

    #[test]
    fn test_size_attr_by_method() {
        assert_eq!(
            SetType::HashNet.info().size_attr(),
            Some(ipset_create_attr::HASHSIZE)
        );
        assert_eq!(
            SetType::ListSet.info().size_attr(),
            Some(ipset_create_attr::SIZE)
        );
        assert_eq!(SetType::BitmapIp.info().size_attr(), None);
        assert_eq!(SetType::BitmapPort.info().range, Range::Port);
        assert_eq!(SetType::BitmapIpMac.info().range, Range::Ip);
    }
}
