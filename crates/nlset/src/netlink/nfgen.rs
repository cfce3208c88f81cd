//! Netfilter generic message header (struct nfgenmsg).
//!
//! Every nfnetlink message, requests and responses alike, carries this 4-byte
//! header between the nlmsghdr and the attributes.

use winnow::binary::{be_u16, le_u8};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;

use super::error::{Error, Result};

/// Result type for winnow parsers.
pub type PResult<T> = core::result::Result<T, ErrMode<ContextError>>;

/// Size of the nfgenmsg header.
pub const NFGENMSG_LEN: usize = 4;

/// nfnetlink version carried in every header.
pub const NFNETLINK_V0: u8 = 0;

/// nfgenmsg header (4 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NfGenMsg {
    /// Address family (AF_*).
    pub family: u8,
    /// nfnetlink version.
    pub version: u8,
    /// Resource id, big endian on the wire.
    pub res_id: u16,
}

impl NfGenMsg {
    /// Create a version-0 header for `family`.
    pub const fn new(family: u8) -> Self {
        Self {
            family,
            version: NFNETLINK_V0,
            res_id: 0,
        }
    }

    /// Parse the header, advancing `input` past it.
    pub fn parse(input: &mut &[u8]) -> PResult<Self> {
        let family = le_u8.parse_next(input)?;
        let version = le_u8.parse_next(input)?;
        let res_id = be_u16.parse_next(input)?;
        Ok(Self {
            family,
            version,
            res_id,
        })
    }

    /// Split a message payload into its header and attribute area.
    pub fn split(data: &[u8]) -> Result<(Self, &[u8])> {
        let mut input = data;
        let header = Self::parse(&mut input).map_err(|_| Error::Truncated {
            expected: NFGENMSG_LEN,
            actual: data.len(),
        })?;
        Ok((header, input))
    }

    /// Wire representation.
    pub fn to_bytes(&self) -> [u8; NFGENMSG_LEN] {
        let res_id = self.res_id.to_be_bytes();
        [self.family, self.version, res_id[0], res_id[1]]
    }
}
