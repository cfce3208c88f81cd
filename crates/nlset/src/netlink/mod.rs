//! Netlink plumbing for the netfilter subsystem.
//!
//! Requests are built as attribute trees ([`tree::AttrTree`]) and framed by
//! [`builder::MessageBuilder`]; responses are walked with the borrowing
//! [`attr::AttrIter`] and [`message::MessageIter`]. [`socket::NetlinkSocket`]
//! moves the bytes.

pub mod attr;
pub mod builder;
mod error;
pub mod message;
pub mod nfgen;
pub mod order;
pub mod socket;
pub mod tree;

pub use error::{Error, Result};
pub use socket::NetlinkSocket;
