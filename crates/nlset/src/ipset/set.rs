//! Set headers and contents as reported by the kernel.

use std::net::IpAddr;

use tracing::debug;

use super::entry::{Entry, nested_addr};
use super::options::Family;
use super::types::{CadtFlags, ipset_adt_attr, ipset_attr, ipset_cadt_attr, ipset_create_attr};
use crate::netlink::attr::{Attr, AttrIter};
use crate::netlink::nfgen::NfGenMsg;
use crate::netlink::Result;

/// A set header plus its entries.
///
/// Built from one or more LIST/HEADER/TYPE/PROTOCOL response messages. Fields
/// the kernel did not send keep their default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Set {
    /// nfgenmsg header of the last message parsed.
    pub nfgenmsg: NfGenMsg,
    pub protocol: u8,
    /// Minimal protocol version (PROTOCOL), or minimal type revision (TYPE).
    pub protocol_min: u8,
    pub revision: u8,
    /// Raw AF_* value; see [`Set::family`].
    pub family: u8,
    pub flags: u8,
    pub name: String,
    pub type_name: String,
    pub comment: String,
    pub mark_mask: u32,

    pub ip_from: Option<IpAddr>,
    pub ip_to: Option<IpAddr>,
    pub port_from: u16,
    pub port_to: u16,
    pub netmask: Option<u8>,

    pub size: u32,
    pub hash_size: u32,
    pub num_entries: u32,
    pub max_elements: u32,
    pub references: u32,
    pub memsize: u32,
    pub cadt_flags: CadtFlags,
    /// Default timeout, present only for sets created with one.
    pub timeout: Option<u32>,
    pub lineno: u32,

    pub entries: Vec<Entry>,
}

impl Set {
    /// Build a set from response messages, folding them in order.
    ///
    /// Each message starts at its nfgenmsg header. Later messages overwrite
    /// header fields and append entries.
    pub fn unserialize<M: AsRef<[u8]>>(msgs: &[M]) -> Result<Self> {
        let mut set = Self::default();
        for msg in msgs {
            set.parse_message(msg.as_ref())?;
        }
        Ok(set)
    }

    /// Build one set per set name, keeping arrival order.
    ///
    /// The kernel continues a large set in follow-up messages that repeat the
    /// set name; consecutive messages naming the same set are merged. The
    /// result therefore holds one `Set` per set, not one per message, and can
    /// be shorter than `msgs`.
    pub fn unserialize_all<M: AsRef<[u8]>>(msgs: &[M]) -> Result<Vec<Self>> {
        let mut sets: Vec<Self> = Vec::new();
        for msg in msgs {
            let mut set = Self::default();
            set.parse_message(msg.as_ref())?;
            match sets.last_mut() {
                Some(last) if !set.name.is_empty() && last.name == set.name => last.merge(set),
                _ => sets.push(set),
            }
        }
        Ok(sets)
    }

    /// Address family of the set.
    pub fn family(&self) -> Family {
        Family::from_u8(self.family)
    }

    /// Parse one response message into `self`.
    pub fn parse_message(&mut self, msg: &[u8]) -> Result<()> {
        let (header, attrs) = NfGenMsg::split(msg)?;
        self.nfgenmsg = header;

        for attr in AttrIter::new(attrs) {
            let attr = attr?;
            match attr.kind() {
                ipset_attr::PROTOCOL => self.protocol = attr.u8()?,
                ipset_attr::SETNAME => self.name = attr.string()?,
                ipset_adt_attr::COMMENT => self.comment = attr.string()?,
                ipset_attr::TYPENAME => self.type_name = attr.string()?,
                ipset_attr::REVISION => self.revision = attr.u8()?,
                ipset_attr::FAMILY => self.family = attr.u8()?,
                ipset_attr::FLAGS => self.flags = attr.u8()?,
                ipset_attr::DATA => self.parse_data(&attr)?,
                ipset_attr::ADT => self.parse_adt(&attr)?,
                ipset_attr::PROTOCOL_MIN => self.protocol_min = attr.u8()?,
                ipset_cadt_attr::MARKMASK => self.mark_mask = attr.u32()?,
                kind => debug!(
                    kind,
                    len = attr.value().len(),
                    "skipping unknown ipset attribute"
                ),
            }
        }

        Ok(())
    }

    fn parse_data(&mut self, data: &Attr<'_>) -> Result<()> {
        for attr in data.nested() {
            let attr = attr?;
            match attr.kind() {
                ipset_create_attr::HASHSIZE => self.hash_size = attr.u32()?,
                ipset_create_attr::MAXELEM => self.max_elements = attr.u32()?,
                ipset_cadt_attr::TIMEOUT => self.timeout = Some(attr.u32()?),
                ipset_create_attr::ELEMENTS => self.num_entries = attr.u32()?,
                ipset_create_attr::REFERENCES => self.references = attr.u32()?,
                // MEMSIZE and COMMENT share a code; only the former is sent in
                // network byte order.
                ipset_create_attr::MEMSIZE if attr.is_net_byteorder() => {
                    self.memsize = attr.u32()?;
                }
                ipset_adt_attr::COMMENT => self.comment = attr.string()?,
                ipset_cadt_attr::CADT_FLAGS => self.cadt_flags = CadtFlags(attr.u32()?),
                ipset_cadt_attr::IP => self.ip_from = nested_addr(&attr)?,
                ipset_cadt_attr::IP_TO => self.ip_to = nested_addr(&attr)?,
                ipset_cadt_attr::PORT_FROM => self.port_from = attr.u16()?,
                ipset_cadt_attr::PORT_TO => self.port_to = attr.u16()?,
                ipset_cadt_attr::CADT_LINENO => self.lineno = attr.u32()?,
                ipset_create_attr::SIZE => self.size = attr.u32()?,
                ipset_create_attr::NETMASK => self.netmask = Some(attr.u8()?),
                ipset_cadt_attr::MARKMASK => self.mark_mask = attr.u32()?,
                kind => debug!(
                    kind,
                    len = attr.value().len(),
                    "skipping unknown ipset data attribute"
                ),
            }
        }
        Ok(())
    }

    fn parse_adt(&mut self, adt: &Attr<'_>) -> Result<()> {
        for attr in adt.nested() {
            let attr = attr?;
            match attr.kind() {
                ipset_attr::DATA => self.entries.push(Entry::parse(attr.value())?),
                kind => debug!(
                    kind,
                    len = attr.value().len(),
                    "skipping unknown ADT attribute"
                ),
            }
        }
        Ok(())
    }

    fn merge(&mut self, next: Self) {
        self.entries.extend(next.entries);
    }
}
