//! Assembling nfnetlink request messages.
//!
//! A request is laid out once, with sequence number and port id zeroed; the
//! transport stamps both with [`set_seq`] and [`set_pid`] right before sending.

use super::attr::{NlAttr, nla_align};
use super::error::Result;
use super::message::{NLMSG_HDRLEN, NlMsgHdr, nlmsg_align};
use super::nfgen::NfGenMsg;
use super::tree::AttrTree;

/// `(subsys << 8) | cmd`, the nlmsg_type of an nfnetlink message.
#[inline]
pub const fn nfnl_msg_type(subsys: u8, cmd: u8) -> u16 {
    ((subsys as u16) << 8) | cmd as u16
}

#[derive(Debug, Clone)]
pub struct MessageBuilder {
    buf: Vec<u8>,
}

impl MessageBuilder {
    /// Start a message with a bare netlink header.
    pub fn new(msg_type: u16, flags: u16) -> Self {
        let mut buf = Vec::with_capacity(256);
        buf.extend_from_slice(NlMsgHdr::new(msg_type, flags).as_bytes());
        buf.resize(NLMSG_HDRLEN, 0);
        Self { buf }
    }

    /// Start an nfnetlink message: netlink header then nfgenmsg.
    pub fn nfnetlink(subsys: u8, cmd: u8, flags: u16, header: NfGenMsg) -> Self {
        let mut builder = Self::new(nfnl_msg_type(subsys, cmd), flags);
        builder.buf.extend_from_slice(&header.to_bytes());
        builder.buf.resize(nlmsg_align(builder.buf.len()), 0);
        builder
    }

    pub fn append_attr(&mut self, attr_type: u16, data: &[u8]) -> Result<()> {
        let header = NlAttr::new(attr_type, data.len())?;
        self.buf.extend_from_slice(header.as_bytes());
        self.buf.extend_from_slice(data);
        self.buf.resize(nla_align(self.buf.len()), 0);
        Ok(())
    }

    pub fn append_attr_u8(&mut self, attr_type: u16, value: u8) -> Result<()> {
        self.append_attr(attr_type, &[value])
    }

    /// Append `tree` under `attr_type`, children included.
    pub fn append_tree(&mut self, attr_type: u16, tree: &AttrTree) -> Result<()> {
        tree.write_to(attr_type, &mut self.buf)
    }

    /// Patch the total length into the header and return the bytes.
    pub fn finish(mut self) -> Vec<u8> {
        let len = self.buf.len() as u32;
        self.buf[0..4].copy_from_slice(&len.to_ne_bytes());
        self.buf
    }
}

/// Stamp a sequence number into a finished message.
pub fn set_seq(msg: &mut [u8], seq: u32) {
    msg[8..12].copy_from_slice(&seq.to_ne_bytes());
}

/// Stamp a port id into a finished message.
pub fn set_pid(msg: &mut [u8], pid: u32) {
    msg[12..16].copy_from_slice(&pid.to_ne_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::attr::{AttrIter, NLA_HDRLEN};
    use crate::netlink::message::{NLM_F_ACK, NLM_F_REQUEST};

    #[test]
    fn test_header_only() {
        let msg = MessageBuilder::new(16, NLM_F_REQUEST).finish();
        assert_eq!(msg.len(), NLMSG_HDRLEN);

        let header = NlMsgHdr::from_bytes(&msg).unwrap();
        assert_eq!(header.nlmsg_len as usize, NLMSG_HDRLEN);
        assert_eq!(header.nlmsg_type, 16);
        assert_eq!(header.nlmsg_flags, NLM_F_REQUEST);
    }

    #[test]
    fn test_nfnetlink_header() {
        let msg = MessageBuilder::nfnetlink(6, 3, NLM_F_REQUEST | NLM_F_ACK, NfGenMsg::new(2))
            .finish();
        assert_eq!(msg.len(), NLMSG_HDRLEN + 4);

        let header = NlMsgHdr::from_bytes(&msg).unwrap();
        assert_eq!(header.nlmsg_type, 0x0603);
        assert_eq!(&msg[NLMSG_HDRLEN..], &[2, 0, 0, 0]);
    }

    #[test]
    fn test_attribute_padding() {
        let mut builder = MessageBuilder::new(16, NLM_F_REQUEST);
        builder.append_attr(2, b"set\0x").unwrap();
        let msg = builder.finish();
        assert_eq!(msg.len(), NLMSG_HDRLEN + NLA_HDRLEN + 8);
        assert_eq!(&msg[NLMSG_HDRLEN..NLMSG_HDRLEN + 2], &10u16.to_ne_bytes());
    }

    #[test]
    fn test_tree_attribute() {
        let mut builder = MessageBuilder::new(16, NLM_F_REQUEST);
        builder.append_attr_u8(1, 6).unwrap();
        builder
            .append_tree(7, &AttrTree::nested(vec![(3, AttrTree::u8(24))]))
            .unwrap();
        let msg = builder.finish();

        let attrs: Vec<_> = AttrIter::new(&msg[NLMSG_HDRLEN..])
            .map(|a| a.unwrap())
            .collect();
        assert_eq!(attrs.len(), 2);
        assert!(attrs[1].is_nested());
        assert_eq!(attrs[1].nested().next().unwrap().unwrap().u8().unwrap(), 24);
    }

    #[test]
    fn test_stamp_seq_and_pid() {
        let mut msg = MessageBuilder::new(16, NLM_F_REQUEST).finish();
        set_seq(&mut msg, 42);
        set_pid(&mut msg, 7);
        let header = NlMsgHdr::from_bytes(&msg).unwrap();
        assert_eq!(header.nlmsg_seq, 42);
        assert_eq!(header.nlmsg_pid, 7);
        assert_eq!(header.nlmsg_len as usize, NLMSG_HDRLEN);
    }

    #[test]
    fn test_oversized_attribute_leaves_message_intact() {
        let mut builder = MessageBuilder::new(16, NLM_F_REQUEST);
        assert!(builder.append_attr(2, &vec![0; 70_000]).is_err());
        let msg = builder.finish();
        assert_eq!(msg.len(), NLMSG_HDRLEN);
    }
}
