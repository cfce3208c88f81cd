//! Attribute trees for request bodies.
//!
//! A request body is an ordered list of `(type, AttrTree)` pairs. Scalars hold
//! their payload bytes verbatim; nested nodes hold an ordered list of children
//! and serialize as the concatenation of those children. Integer payloads
//! tagged with [`NLA_F_NET_BYTEORDER`](super::attr::NLA_F_NET_BYTEORDER) must
//! already be big endian, see [`order`](super::order).

use super::attr::{NLA_F_NESTED, NLA_HDRLEN, NLA_TYPE_MASK, NlAttr, nla_align};
use super::error::Result;

/// A node of an attribute tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrTree {
    /// Raw payload bytes.
    Scalar(Vec<u8>),
    /// Ordered child attributes.
    Nested(Vec<(u16, AttrTree)>),
}

impl AttrTree {
    /// A scalar holding `data` as-is.
    pub fn scalar(data: impl AsRef<[u8]>) -> Self {
        Self::Scalar(data.as_ref().to_vec())
    }

    /// A single-byte scalar.
    pub fn u8(value: u8) -> Self {
        Self::Scalar(vec![value])
    }

    /// A zero-terminated string.
    pub fn string(value: &str) -> Self {
        let mut data = Vec::with_capacity(value.len() + 1);
        data.extend_from_slice(value.as_bytes());
        data.push(0);
        Self::Scalar(data)
    }

    /// A nested node.
    pub fn nested(children: Vec<(u16, AttrTree)>) -> Self {
        Self::Nested(children)
    }

    /// Payload of a scalar node.
    pub fn as_scalar(&self) -> Option<&[u8]> {
        match self {
            Self::Scalar(data) => Some(data),
            Self::Nested(_) => None,
        }
    }

    /// Children of a nested node.
    pub fn children(&self) -> &[(u16, AttrTree)] {
        match self {
            Self::Scalar(_) => &[],
            Self::Nested(children) => children,
        }
    }

    /// First child whose type matches `kind` once flag bits are stripped.
    pub fn find(&self, kind: u16) -> Option<(u16, &AttrTree)> {
        find(self.children(), kind)
    }

    /// Encoded size including this node's header and trailing padding.
    pub fn encoded_len(&self) -> usize {
        nla_align(NLA_HDRLEN + self.payload_len())
    }

    fn payload_len(&self) -> usize {
        match self {
            Self::Scalar(data) => data.len(),
            Self::Nested(children) => children.iter().map(|(_, c)| c.encoded_len()).sum(),
        }
    }

    /// Append this node under `attr_type` to `buf`.
    ///
    /// Nested nodes always carry `NLA_F_NESTED`; all other flag bits are
    /// written exactly as given. A node whose encoded length does not fit
    /// `nla_len` fails with [`Error::InvalidAttribute`](crate::Error::InvalidAttribute).
    pub fn write_to(&self, attr_type: u16, buf: &mut Vec<u8>) -> Result<()> {
        match self {
            Self::Scalar(data) => {
                let header = NlAttr::new(attr_type, data.len())?;
                buf.extend_from_slice(header.as_bytes());
                buf.extend_from_slice(data);
            }
            Self::Nested(children) => {
                let header = NlAttr::new(attr_type | NLA_F_NESTED, self.payload_len())?;
                buf.extend_from_slice(header.as_bytes());
                for (child_type, child) in children {
                    child.write_to(*child_type, buf)?;
                }
            }
        }
        // Pad to alignment
        let aligned = nla_align(buf.len());
        buf.resize(aligned, 0);
        Ok(())
    }
}

/// First attribute in `attrs` whose type matches `kind` once flag bits are stripped.
pub fn find(attrs: &[(u16, AttrTree)], kind: u16) -> Option<(u16, &AttrTree)> {
    attrs
        .iter()
        .find(|(t, _)| t & NLA_TYPE_MASK == kind)
        .map(|(t, node)| (*t, node))
}

/// Serialize an attribute list.
pub fn encode(attrs: &[(u16, AttrTree)]) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(attrs.iter().map(|(_, a)| a.encoded_len()).sum());
    for (attr_type, attr) in attrs {
        attr.write_to(*attr_type, &mut buf)?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::attr::{AttrIter, NLA_F_NET_BYTEORDER};
    use crate::netlink::order::htonl;

    #[test]
    fn test_scalar_layout() {
        let buf = encode(&[(2, AttrTree::string("foo"))]).unwrap();
        // len=8 ("foo\0"), type=2
        assert_eq!(&buf[0..2], &8u16.to_ne_bytes());
        assert_eq!(&buf[2..4], &2u16.to_ne_bytes());
        assert_eq!(&buf[4..8], b"foo\0");
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn test_padding() {
        let buf = encode(&[(4, AttrTree::u8(6)), (1, AttrTree::u8(7))]).unwrap();
        assert_eq!(buf.len(), 16);
        let attrs: Vec<_> = AttrIter::new(&buf).map(|a| a.unwrap()).collect();
        assert_eq!(attrs[0].u8().unwrap(), 6);
        assert_eq!(attrs[1].u8().unwrap(), 7);
    }

    #[test]
    fn test_nested_has_no_own_value() {
        let tree = AttrTree::nested(vec![
            (6 | NLA_F_NET_BYTEORDER, AttrTree::scalar(htonl(3600))),
            (3, AttrTree::u8(24)),
        ]);
        let buf = encode(&[(7, tree.clone())]).unwrap();
        assert_eq!(buf.len(), tree.encoded_len());
        assert_eq!(buf.len(), 4 + 8 + 8);

        let outer = AttrIter::new(&buf).next().unwrap().unwrap();
        assert!(outer.is_nested());
        assert_eq!(outer.kind(), 7);
        assert_eq!(outer.value(), &encode(tree.children()).unwrap()[..]);
    }

    #[test]
    fn test_byteorder_roundtrip() {
        for value in [0u32, 1, 0x0102_0304, u32::MAX] {
            let buf = encode(&[(6 | NLA_F_NET_BYTEORDER, AttrTree::scalar(htonl(value)))]).unwrap();
            let attr = AttrIter::new(&buf).next().unwrap().unwrap();
            assert_eq!(attr.u32().unwrap(), value);
        }
    }

    #[test]
    fn test_find_ignores_flags() {
        let tree = AttrTree::nested(vec![(1 | NLA_F_NET_BYTEORDER, AttrTree::scalar([10, 0, 0, 1]))]);
        let (raw, node) = tree.find(1).unwrap();
        assert_eq!(raw, 1 | NLA_F_NET_BYTEORDER);
        assert_eq!(node.as_scalar(), Some(&[10u8, 0, 0, 1][..]));
        assert!(tree.find(2).is_none());
        assert!(AttrTree::u8(1).children().is_empty());
    }

    #[test]
    fn test_oversized_scalar_is_rejected() {
        let fits = AttrTree::scalar(vec![0x41; 65535 - NLA_HDRLEN]);
        let buf = encode(&[(26, fits)]).unwrap();
        assert_eq!(&buf[0..2], &u16::MAX.to_ne_bytes());

        let comment = format!("{}zzzz", "A".repeat(65532));
        let err = encode(&[(26, AttrTree::string(&comment))]).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidAttribute(_)));
    }

    #[test]
    fn test_oversized_nested_is_rejected() {
        // Each child fits on its own; the parent's length does not.
        let child = AttrTree::scalar(vec![0; 40_000]);
        let tree = AttrTree::nested(vec![(1, child.clone()), (2, child)]);
        assert!(matches!(
            encode(&[(7, tree)]),
            Err(crate::Error::InvalidAttribute(_))
        ));
    }
}
