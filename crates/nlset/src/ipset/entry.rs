//! Set entries: request encoding and response decoding.

use std::net::IpAddr;
use std::time::Duration;

use tracing::debug;

use super::types::{
    CadtFlags, ip_proto, ipset_adt_attr, ipset_attr, ipset_cadt_attr, ipset_ipaddr_attr,
};
use crate::netlink::attr::{Attr, AttrIter, NLA_F_NET_BYTEORDER};
use crate::netlink::order::{htonl, htonll, htons};
use crate::netlink::tree::AttrTree;
use crate::netlink::{Error, Result};
use crate::util::addr::{ip_from_bytes, ip_octets, to_ipv4_form};

/// One element of a set.
///
/// Which fields apply depends on the set type: `ip` for hash:ip, `ip` plus
/// `port` for hash:ip,port, `name` for list:set and so on. On the way back
/// from the kernel, absent fields stay `None`.
///
/// A `cidr` of 0 means "whole address"; the kernel omits the attribute for
/// host entries so an explicit /0 cannot be told apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Entry {
    /// Member set name (list:set).
    pub name: Option<String>,
    pub comment: Option<String>,
    pub mac: Option<[u8; 6]>,
    pub ip: Option<IpAddr>,
    pub cidr: u8,
    pub ip2: Option<IpAddr>,
    pub cidr2: u8,
    /// Remaining lifetime in seconds.
    pub timeout: Option<u32>,
    pub packets: Option<u64>,
    pub bytes: Option<u64>,
    /// IP protocol of `port`, TCP when a port is sent without one.
    pub protocol: Option<u8>,
    pub port: Option<u16>,
    pub iface: Option<String>,
    pub mark: Option<u32>,
    /// Exception entry in a hash:net* set.
    pub nomatch: bool,
    /// skbinfo mark and mask.
    pub skbmark: Option<(u32, u32)>,
    pub skbprio: Option<u32>,
    pub skbqueue: Option<u16>,
    /// Overwrite an existing element instead of failing (request only).
    #[cfg_attr(feature = "serde", serde(skip))]
    pub replace: bool,
}

impl Entry {
    /// Create an empty entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for an address.
    pub fn from_ip(ip: IpAddr) -> Self {
        Self {
            ip: Some(ip),
            ..Self::default()
        }
    }

    /// Entry for a network.
    pub fn from_net(ip: IpAddr, cidr: u8) -> Self {
        Self {
            ip: Some(ip),
            cidr,
            ..Self::default()
        }
    }

    /// Entry naming another set (list:set).
    pub fn from_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Entry for a MAC address (hash:mac).
    pub fn from_mac(mac: [u8; 6]) -> Self {
        Self {
            mac: Some(mac),
            ..Self::default()
        }
    }

    pub fn cidr(mut self, cidr: u8) -> Self {
        self.cidr = cidr;
        self
    }

    /// Second address, for hash:net,net and hash:ip,port,ip style types.
    pub fn ip2(mut self, ip: IpAddr, cidr: u8) -> Self {
        self.ip2 = Some(ip);
        self.cidr2 = cidr;
        self
    }

    pub fn mac(mut self, mac: [u8; 6]) -> Self {
        self.mac = Some(mac);
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Protocol of the port, e.g. [`ip_proto::UDP`].
    pub fn protocol(mut self, protocol: u8) -> Self {
        self.protocol = Some(protocol);
        self
    }

    pub fn iface(mut self, iface: impl Into<String>) -> Self {
        self.iface = Some(iface.into());
        self
    }

    pub fn mark(mut self, mark: u32) -> Self {
        self.mark = Some(mark);
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Entry lifetime, truncated to whole seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(u32::try_from(timeout.as_secs()).unwrap_or(u32::MAX));
        self
    }

    pub fn nomatch(mut self, nomatch: bool) -> Self {
        self.nomatch = nomatch;
        self
    }

    pub fn skbmark(mut self, mark: u32, mask: u32) -> Self {
        self.skbmark = Some((mark, mask));
        self
    }

    pub fn skbprio(mut self, prio: u32) -> Self {
        self.skbprio = Some(prio);
        self
    }

    pub fn skbqueue(mut self, queue: u16) -> Self {
        self.skbqueue = Some(queue);
        self
    }

    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    /// Children of the IPSET_ATTR_DATA block describing this entry.
    ///
    /// The trailing line-number attribute is left to the request builder.
    pub fn to_attrs(&self) -> Vec<(u16, AttrTree)> {
        let mut attrs = Vec::new();

        if let Some(name) = &self.name {
            attrs.push((ipset_adt_attr::NAME, AttrTree::string(name)));
        }
        if let Some(comment) = &self.comment {
            attrs.push((ipset_adt_attr::COMMENT, AttrTree::string(comment)));
        }
        if let Some(timeout) = self.timeout {
            attrs.push((
                ipset_cadt_attr::TIMEOUT | NLA_F_NET_BYTEORDER,
                AttrTree::scalar(htonl(timeout)),
            ));
        }
        if let Some(ip) = self.ip {
            attrs.push((ipset_cadt_attr::IP, addr_tree(ip)));
        }
        if let Some(mac) = self.mac {
            attrs.push((ipset_adt_attr::ETHER, AttrTree::scalar(mac)));
        }
        if self.cidr != 0 {
            attrs.push((ipset_cadt_attr::CIDR, AttrTree::u8(self.cidr)));
        }
        if let Some(ip2) = self.ip2 {
            attrs.push((ipset_adt_attr::IP2, addr_tree(ip2)));
        }
        if self.cidr2 != 0 {
            attrs.push((ipset_adt_attr::CIDR2, AttrTree::u8(self.cidr2)));
        }
        if let Some(port) = self.port {
            let proto = self.protocol.unwrap_or(ip_proto::TCP);
            attrs.push((ipset_cadt_attr::PROTO, AttrTree::u8(proto)));
            attrs.push((
                ipset_cadt_attr::PORT | NLA_F_NET_BYTEORDER,
                AttrTree::scalar(htons(port)),
            ));
        }
        if let Some(iface) = &self.iface {
            attrs.push((ipset_adt_attr::IFACE, AttrTree::string(iface)));
        }
        if let Some(mark) = self.mark {
            attrs.push((
                ipset_cadt_attr::MARK | NLA_F_NET_BYTEORDER,
                AttrTree::scalar(htonl(mark)),
            ));
        }
        if self.nomatch {
            attrs.push((
                ipset_cadt_attr::CADT_FLAGS | NLA_F_NET_BYTEORDER,
                AttrTree::scalar(htonl(CadtFlags::NOMATCH.bits())),
            ));
        }
        if let Some((mark, mask)) = self.skbmark {
            let value = (u64::from(mark) << 32) | u64::from(mask);
            attrs.push((
                ipset_adt_attr::SKBMARK | NLA_F_NET_BYTEORDER,
                AttrTree::scalar(htonll(value)),
            ));
        }
        if let Some(prio) = self.skbprio {
            attrs.push((
                ipset_adt_attr::SKBPRIO | NLA_F_NET_BYTEORDER,
                AttrTree::scalar(htonl(prio)),
            ));
        }
        if let Some(queue) = self.skbqueue {
            attrs.push((
                ipset_adt_attr::SKBQUEUE | NLA_F_NET_BYTEORDER,
                AttrTree::scalar(htons(queue)),
            ));
        }

        attrs
    }

    /// Decode the payload of one IPSET_ATTR_DATA block from an ADT list.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut entry = Self::default();

        for attr in AttrIter::new(data) {
            let attr = attr?;
            match attr.kind() {
                ipset_cadt_attr::TIMEOUT => entry.timeout = Some(attr.u32()?),
                ipset_adt_attr::BYTES => entry.bytes = Some(attr.u64()?),
                ipset_adt_attr::PACKETS => entry.packets = Some(attr.u64()?),
                ipset_adt_attr::ETHER => entry.mac = Some(mac_value(&attr)?),
                ipset_adt_attr::COMMENT => entry.comment = Some(attr.string()?),
                ipset_cadt_attr::IP if attr.is_nested() => entry.ip = nested_addr(&attr)?,
                ipset_cadt_attr::IP => entry.ip = Some(addr_value(&attr)?),
                ipset_adt_attr::IP2 => entry.ip2 = nested_addr(&attr)?,
                ipset_cadt_attr::CIDR => entry.cidr = attr.u8()?,
                ipset_adt_attr::CIDR2 => entry.cidr2 = attr.u8()?,
                ipset_cadt_attr::PORT => entry.port = Some(attr.u16()?),
                ipset_cadt_attr::PROTO => entry.protocol = Some(attr.u8()?),
                ipset_adt_attr::IFACE => entry.iface = Some(attr.string()?),
                ipset_adt_attr::NAME => entry.name = Some(attr.string()?),
                ipset_cadt_attr::MARK => entry.mark = Some(attr.u32()?),
                ipset_cadt_attr::CADT_FLAGS => {
                    entry.nomatch = CadtFlags(attr.u32()?).contains(CadtFlags::NOMATCH);
                }
                ipset_adt_attr::SKBMARK => {
                    let value = attr.u64()?;
                    entry.skbmark = Some(((value >> 32) as u32, value as u32));
                }
                ipset_adt_attr::SKBPRIO => entry.skbprio = Some(attr.u32()?),
                ipset_adt_attr::SKBQUEUE => entry.skbqueue = Some(attr.u16()?),
                ipset_attr::LINENO => {}
                kind => debug!(
                    kind,
                    len = attr.value().len(),
                    "skipping unknown ipset entry attribute"
                ),
            }
        }

        Ok(entry)
    }
}

/// Wrap an address in its IPADDR_IPV4/IPV6 child, the form every IP-bearing
/// attribute takes on the wire.
pub(crate) fn addr_tree(ip: IpAddr) -> AttrTree {
    let ip = to_ipv4_form(ip);
    let kind = match ip {
        IpAddr::V4(_) => ipset_ipaddr_attr::IPV4,
        IpAddr::V6(_) => ipset_ipaddr_attr::IPV6,
    };
    AttrTree::nested(vec![(
        kind | NLA_F_NET_BYTEORDER,
        AttrTree::scalar(ip_octets(&ip)),
    )])
}

/// Read the address held inside a nested IP attribute.
pub(crate) fn nested_addr(attr: &Attr<'_>) -> Result<Option<IpAddr>> {
    let mut addr = None;
    for child in attr.nested() {
        let child = child?;
        match child.kind() {
            ipset_ipaddr_attr::IPV4 | ipset_ipaddr_attr::IPV6 => {
                addr = Some(addr_value(&child)?);
            }
            kind => debug!(
                parent = attr.kind(),
                kind,
                len = child.value().len(),
                "skipping unknown nested address attribute"
            ),
        }
    }
    Ok(addr)
}

/// Read a raw 4- or 16-byte address payload.
pub(crate) fn addr_value(attr: &Attr<'_>) -> Result<IpAddr> {
    ip_from_bytes(attr.value()).ok_or_else(|| {
        Error::InvalidAttribute(format!(
            "address attribute {} has {} bytes",
            attr.kind(),
            attr.value().len()
        ))
    })
}

fn mac_value(attr: &Attr<'_>) -> Result<[u8; 6]> {
    attr.value()
        .try_into()
        .map_err(|_| Error::InvalidAttribute(format!("MAC of {} bytes", attr.value().len())))
}
