//! Request construction for every ipset command.
//!
//! A [`Request`] is the command, its netlink flags and the top-level
//! attribute list. [`Request::encode`] lays it out as a complete nfnetlink
//! message with sequence number and port id left at zero.

use super::entry::{Entry, addr_tree};
use super::options::{CreateOptions, Family};
use super::settype::{Method, Range, SetType};
use super::types::{
    CadtFlags, IPSET_PROTOCOL, NFNL_SUBSYS_IPSET, ipset_attr, ipset_cadt_attr, ipset_cmd,
    ipset_create_attr,
};
use crate::netlink::attr::NLA_F_NET_BYTEORDER;
use crate::netlink::builder::MessageBuilder;
use crate::netlink::message::{
    NLM_F_ACK, NLM_F_CREATE, NLM_F_DUMP, NLM_F_EXCL, NLM_F_REPLACE, NLM_F_REQUEST,
};
use crate::netlink::nfgen::NfGenMsg;
use crate::netlink::order::{htonl, htons};
use crate::netlink::tree::AttrTree;
use crate::netlink::Result;

/// Netlink flags a command is sent with, before the exclusivity policy.
pub fn command_flags(cmd: u8) -> u16 {
    match cmd {
        ipset_cmd::CREATE => NLM_F_REQUEST | NLM_F_ACK | NLM_F_CREATE,
        ipset_cmd::DESTROY
        | ipset_cmd::FLUSH
        | ipset_cmd::RENAME
        | ipset_cmd::SWAP
        | ipset_cmd::ADD
        | ipset_cmd::DEL
        | ipset_cmd::TEST => NLM_F_REQUEST | NLM_F_ACK,
        ipset_cmd::LIST | ipset_cmd::SAVE => NLM_F_REQUEST | NLM_F_ACK | NLM_F_DUMP,
        _ => NLM_F_REQUEST,
    }
}

/// An ipset request ready to be encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    cmd: u8,
    flags: u16,
    protocol: u8,
    attrs: Vec<(u16, AttrTree)>,
}

impl Request {
    fn new(cmd: u8) -> Self {
        Self {
            cmd,
            flags: command_flags(cmd),
            protocol: IPSET_PROTOCOL,
            attrs: Vec::new(),
        }
    }

    fn attr(mut self, attr_type: u16, value: AttrTree) -> Self {
        self.attrs.push((attr_type, value));
        self
    }

    fn setname(self, name: &str) -> Self {
        self.attr(ipset_attr::SETNAME, AttrTree::string(name))
    }

    /// NLM_F_EXCL unless `replace`; with `replace`, NLM_F_REPLACE when asked to.
    fn exclusive(mut self, replace: bool, replace_flag: bool) -> Self {
        if !replace {
            self.flags |= NLM_F_EXCL;
        } else if replace_flag {
            self.flags |= NLM_F_REPLACE;
        }
        self
    }

    /// Query the kernel's protocol version.
    pub fn protocol() -> Self {
        Self::new(ipset_cmd::PROTOCOL)
    }

    /// Create a set. Options are resolved against `set_type` first.
    pub fn create(name: &str, set_type: SetType, options: &CreateOptions) -> Self {
        let info = set_type.info();
        let opts = options.clone().resolve(set_type);

        let mut data = Vec::new();

        if opts.size > 0
            && let Some(size_attr) = info.size_attr()
        {
            data.push((
                size_attr | NLA_F_NET_BYTEORDER,
                AttrTree::scalar(htonl(opts.size)),
            ));
        }

        match info.range {
            Range::Port => {
                data.push((
                    ipset_cadt_attr::PORT_FROM | NLA_F_NET_BYTEORDER,
                    AttrTree::scalar(htons(opts.port_from)),
                ));
                data.push((
                    ipset_cadt_attr::PORT_TO | NLA_F_NET_BYTEORDER,
                    AttrTree::scalar(htons(opts.port_to)),
                ));
            }
            Range::Ip => {
                if let Some(from) = opts.ip_from {
                    data.push((ipset_cadt_attr::IP, addr_tree(from)));
                }
                if let Some(to) = opts.ip_to {
                    data.push((ipset_cadt_attr::IP_TO, addr_tree(to)));
                }
            }
            Range::None => {}
        }

        if let Some(netmask) = opts.netmask {
            data.push((ipset_create_attr::NETMASK, AttrTree::u8(netmask)));
        }
        if info.method == Method::Hash
            && let Some(max) = opts.max_elements
        {
            data.push((
                ipset_create_attr::MAXELEM | NLA_F_NET_BYTEORDER,
                AttrTree::scalar(htonl(max)),
            ));
        }
        if let Some(mask) = opts.mark_mask {
            data.push((
                ipset_cadt_attr::MARKMASK | NLA_F_NET_BYTEORDER,
                AttrTree::scalar(htonl(mask)),
            ));
        }
        if let Some(timeout) = opts.timeout.filter(|t| *t > 0) {
            data.push((
                ipset_cadt_attr::TIMEOUT | NLA_F_NET_BYTEORDER,
                AttrTree::scalar(htonl(timeout)),
            ));
        }

        let mut flags = opts.cadt_flags();
        if info.method != Method::Hash {
            flags = CadtFlags(flags.bits() & !CadtFlags::WITH_FORCEADD.bits());
        }
        if !flags.is_empty() {
            data.push((
                ipset_cadt_attr::CADT_FLAGS | NLA_F_NET_BYTEORDER,
                AttrTree::scalar(htonl(flags.bits())),
            ));
        }

        let mut req = Self::new(ipset_cmd::CREATE)
            .exclusive(opts.replace, false)
            .setname(name)
            .attr(ipset_attr::TYPENAME, AttrTree::string(info.name))
            .attr(
                ipset_attr::REVISION,
                AttrTree::u8(opts.revision.unwrap_or_else(|| info.newest_revision())),
            );
        if opts.family != Family::Unspec {
            req = req.attr(ipset_attr::FAMILY, AttrTree::u8(opts.family.as_u8()));
        }
        if let Some(protocol) = opts.protocol {
            req.protocol = protocol;
        }
        req.attr(ipset_attr::DATA, AttrTree::nested(data))
    }

    pub fn destroy(name: &str) -> Self {
        Self::new(ipset_cmd::DESTROY).setname(name)
    }

    pub fn flush(name: &str) -> Self {
        Self::new(ipset_cmd::FLUSH).setname(name)
    }

    /// Dump one set, or every set when `name` is `None`.
    pub fn list(name: Option<&str>) -> Self {
        let req = Self::new(ipset_cmd::LIST);
        match name {
            Some(name) => req.setname(name),
            None => req,
        }
    }

    /// Fetch a set header without its entries.
    pub fn header(name: &str) -> Self {
        Self::new(ipset_cmd::HEADER).setname(name)
    }

    /// Ask which revisions of a type the kernel supports.
    pub fn type_query(set_type: SetType, family: Family) -> Self {
        Self::new(ipset_cmd::TYPE)
            .attr(ipset_attr::TYPENAME, AttrTree::string(set_type.name()))
            .attr(ipset_attr::FAMILY, AttrTree::u8(family.as_u8()))
    }

    pub fn add(name: &str, entry: &Entry) -> Self {
        Self::adt(ipset_cmd::ADD, name, entry).exclusive(entry.replace, true)
    }

    pub fn delete(name: &str, entry: &Entry) -> Self {
        Self::adt(ipset_cmd::DEL, name, entry).exclusive(entry.replace, true)
    }

    pub fn test(name: &str, entry: &Entry) -> Self {
        Self::adt(ipset_cmd::TEST, name, entry)
    }

    fn adt(cmd: u8, name: &str, entry: &Entry) -> Self {
        let mut data = entry.to_attrs();
        data.push((
            ipset_attr::LINENO | NLA_F_NET_BYTEORDER,
            AttrTree::scalar(htonl(0)),
        ));
        Self::new(cmd)
            .setname(name)
            .attr(ipset_attr::DATA, AttrTree::nested(data))
    }

    /// Rename `from` to `to`; `to` must not exist.
    pub fn rename(from: &str, to: &str) -> Self {
        Self::new(ipset_cmd::RENAME)
            .setname(from)
            .attr(ipset_attr::SETNAME2, AttrTree::string(to))
    }

    /// Exchange the names of two compatible sets.
    pub fn swap(from: &str, to: &str) -> Self {
        Self::new(ipset_cmd::SWAP)
            .setname(from)
            .attr(ipset_attr::SETNAME2, AttrTree::string(to))
    }

    pub fn cmd(&self) -> u8 {
        self.cmd
    }

    pub fn flags(&self) -> u16 {
        self.flags
    }

    /// Top-level attributes after the protocol attribute.
    pub fn attrs(&self) -> &[(u16, AttrTree)] {
        &self.attrs
    }

    /// Encode as a complete netlink message.
    ///
    /// Fails with [`Error::InvalidAttribute`](crate::Error::InvalidAttribute)
    /// when an attribute is too large for its 16-bit length field.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut builder = MessageBuilder::nfnetlink(
            NFNL_SUBSYS_IPSET,
            self.cmd,
            self.flags,
            NfGenMsg::new(libc::AF_INET as u8),
        );
        builder.append_attr_u8(ipset_attr::PROTOCOL, self.protocol)?;
        for (attr_type, attr) in &self.attrs {
            builder.append_tree(*attr_type, attr)?;
        }
        Ok(builder.finish())
    }
}
