//! Netlink attribute (nlattr) handling.
//!
//! Attributes are parsed lazily: [`AttrIter`] walks a borrowed buffer and
//! yields [`Attr`] views over sub-slices of it, so descending into a nested
//! attribute never copies.

use super::error::{Error, Result};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Netlink attribute alignment.
pub const NLA_ALIGNTO: usize = 4;

/// Align a length to NLA_ALIGNTO boundary.
#[inline]
pub const fn nla_align(len: usize) -> usize {
    (len + NLA_ALIGNTO - 1) & !(NLA_ALIGNTO - 1)
}

/// Size of the attribute header.
pub const NLA_HDRLEN: usize = 4; // nla_align(size_of::<NlAttr>())

/// Netlink attribute header (mirrors struct nlattr).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NlAttr {
    /// Length including header.
    pub nla_len: u16,
    /// Attribute type, including flag bits.
    pub nla_type: u16,
}

/// Attribute type flags.
pub const NLA_F_NESTED: u16 = 1 << 15;
pub const NLA_F_NET_BYTEORDER: u16 = 1 << 14;
pub const NLA_TYPE_MASK: u16 = !(NLA_F_NESTED | NLA_F_NET_BYTEORDER);

impl NlAttr {
    /// Header for a payload of `data_len` bytes.
    ///
    /// `nla_len` is 16 bits wide; a payload that does not fit is an
    /// [`Error::InvalidAttribute`].
    pub fn new(attr_type: u16, data_len: usize) -> Result<Self> {
        let nla_len = u16::try_from(NLA_HDRLEN + data_len).map_err(|_| {
            Error::InvalidAttribute(format!(
                "attribute {} payload of {} bytes exceeds the netlink limit",
                attr_type & NLA_TYPE_MASK,
                data_len
            ))
        })?;
        Ok(Self {
            nla_len,
            nla_type: attr_type,
        })
    }

    /// Get the attribute type without flags.
    pub fn kind(&self) -> u16 {
        self.nla_type & NLA_TYPE_MASK
    }

    /// Check if this is a nested attribute.
    pub fn is_nested(&self) -> bool {
        self.nla_type & NLA_F_NESTED != 0
    }

    /// Check if integer payloads are in network byte order.
    pub fn is_net_byteorder(&self) -> bool {
        self.nla_type & NLA_F_NET_BYTEORDER != 0
    }

    /// Get the payload length (total length minus header).
    pub fn payload_len(&self) -> usize {
        (self.nla_len as usize).saturating_sub(NLA_HDRLEN)
    }

    /// Convert to bytes.
    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }

    /// Parse from bytes. The buffer need not be aligned.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::read_from_prefix(data)
            .map(|(r, _)| r)
            .map_err(|_| Error::Truncated {
                expected: std::mem::size_of::<Self>(),
                actual: data.len(),
            })
    }
}

/// A parsed attribute: its raw type code and a view of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attr<'a> {
    attr_type: u16,
    value: &'a [u8],
}

impl<'a> Attr<'a> {
    /// Wrap a type code and payload.
    pub fn new(attr_type: u16, value: &'a [u8]) -> Self {
        Self { attr_type, value }
    }

    /// The type code as sent, flag bits included.
    pub fn raw_type(&self) -> u16 {
        self.attr_type
    }

    /// The type code with flag bits stripped.
    pub fn kind(&self) -> u16 {
        self.attr_type & NLA_TYPE_MASK
    }

    pub fn is_nested(&self) -> bool {
        self.attr_type & NLA_F_NESTED != 0
    }

    pub fn is_net_byteorder(&self) -> bool {
        self.attr_type & NLA_F_NET_BYTEORDER != 0
    }

    /// The raw payload.
    pub fn value(&self) -> &'a [u8] {
        self.value
    }

    /// Iterate the attributes contained in this one.
    pub fn nested(&self) -> AttrIter<'a> {
        AttrIter::new(self.value)
    }

    pub fn u8(&self) -> Result<u8> {
        get::u8(self.value)
    }

    /// Read a u16, honouring the network-byte-order flag.
    pub fn u16(&self) -> Result<u16> {
        if self.is_net_byteorder() {
            get::u16_be(self.value)
        } else {
            get::u16_ne(self.value)
        }
    }

    /// Read a u32, honouring the network-byte-order flag.
    pub fn u32(&self) -> Result<u32> {
        if self.is_net_byteorder() {
            get::u32_be(self.value)
        } else {
            get::u32_ne(self.value)
        }
    }

    /// Read a u64, honouring the network-byte-order flag.
    pub fn u64(&self) -> Result<u64> {
        if self.is_net_byteorder() {
            get::u64_be(self.value)
        } else {
            get::u64_ne(self.value)
        }
    }

    /// Read an unsigned integer whose width is given by the payload length.
    pub fn uint(&self) -> Result<u64> {
        match self.value.len() {
            1 => self.u8().map(u64::from),
            2 => self.u16().map(u64::from),
            4 => self.u32().map(u64::from),
            8 => self.u64(),
            n => Err(Error::InvalidAttribute(format!(
                "attribute {} has no integer width ({} bytes)",
                self.kind(),
                n
            ))),
        }
    }

    /// Read a zero-terminated string.
    pub fn string(&self) -> Result<String> {
        get::string(self.value).map(str::to_owned)
    }
}

/// Iterator over netlink attributes in a buffer.
///
/// A length field that is shorter than the header or runs past the end of the
/// buffer yields an error and ends iteration; nothing is silently truncated.
pub struct AttrIter<'a> {
    data: &'a [u8],
}

impl<'a> AttrIter<'a> {
    /// Create a new attribute iterator.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Check if there are no more attributes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn fail(&mut self, err: Error) -> Option<Result<Attr<'a>>> {
        self.data = &[];
        Some(Err(err))
    }
}

impl<'a> Iterator for AttrIter<'a> {
    type Item = Result<Attr<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.is_empty() {
            return None;
        }

        let attr = match NlAttr::from_bytes(self.data) {
            Ok(a) => a,
            Err(e) => return self.fail(e),
        };

        let len = attr.nla_len as usize;
        if len < NLA_HDRLEN {
            return self.fail(Error::InvalidAttribute(format!(
                "attribute length {} shorter than header",
                len
            )));
        }
        if len > self.data.len() {
            return self.fail(Error::Truncated {
                expected: len,
                actual: self.data.len(),
            });
        }

        let payload = &self.data[NLA_HDRLEN..len];
        let aligned_len = nla_align(len);

        // Move to next attribute
        if aligned_len >= self.data.len() {
            self.data = &[];
        } else {
            self.data = &self.data[aligned_len..];
        }

        Some(Ok(Attr::new(attr.nla_type, payload)))
    }
}

/// Helper functions for extracting typed values from attribute payloads.
pub mod get {
    use super::*;

    /// Extract a u8 value.
    pub fn u8(data: &[u8]) -> Result<u8> {
        data.first()
            .copied()
            .ok_or_else(|| Error::InvalidAttribute("empty u8 attribute".into()))
    }

    fn array<const N: usize>(data: &[u8], what: &str) -> Result<[u8; N]> {
        data.get(..N)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| Error::InvalidAttribute(format!("truncated {} attribute", what)))
    }

    /// Extract a u16 value (native endian).
    pub fn u16_ne(data: &[u8]) -> Result<u16> {
        array(data, "u16").map(u16::from_ne_bytes)
    }

    /// Extract a u32 value (native endian).
    pub fn u32_ne(data: &[u8]) -> Result<u32> {
        array(data, "u32").map(u32::from_ne_bytes)
    }

    /// Extract a u64 value (native endian).
    pub fn u64_ne(data: &[u8]) -> Result<u64> {
        array(data, "u64").map(u64::from_ne_bytes)
    }

    /// Extract a u16 value (big endian / network order).
    pub fn u16_be(data: &[u8]) -> Result<u16> {
        array(data, "u16").map(u16::from_be_bytes)
    }

    /// Extract a u32 value (big endian / network order).
    pub fn u32_be(data: &[u8]) -> Result<u32> {
        array(data, "u32").map(u32::from_be_bytes)
    }

    /// Extract a u64 value (big endian / network order).
    pub fn u64_be(data: &[u8]) -> Result<u64> {
        array(data, "u64").map(u64::from_be_bytes)
    }

    /// Extract a null-terminated string.
    pub fn string(data: &[u8]) -> Result<&str> {
        // Find null terminator or use whole buffer
        let len = data.iter().position(|&b| b == 0).unwrap_or(data.len());
        std::str::from_utf8(&data[..len])
            .map_err(|e| Error::InvalidAttribute(format!("invalid UTF-8: {}", e)))
    }
}
