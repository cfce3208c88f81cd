//! Network byte order conversions for `NLA_F_NET_BYTEORDER` attributes.
//!
//! The attribute builder only tags values; integers carried under the
//! network-byte-order flag must be converted with these before being wrapped.

use super::attr::get;
use super::error::Result;

/// Encode a u16 in network byte order.
#[inline]
pub fn htons(value: u16) -> [u8; 2] {
    value.to_be_bytes()
}

/// Encode a u32 in network byte order.
#[inline]
pub fn htonl(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Encode a u64 in network byte order.
#[inline]
pub fn htonll(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Decode a network byte order u16.
pub fn ntohs(data: &[u8]) -> Result<u16> {
    get::u16_be(data)
}

/// Decode a network byte order u32.
pub fn ntohl(data: &[u8]) -> Result<u32> {
    get::u32_be(data)
}

/// Decode a network byte order u64.
pub fn ntohll(data: &[u8]) -> Result<u64> {
    get::u64_be(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_regardless_of_host() {
        assert_eq!(htons(0x1234), [0x12, 0x34]);
        assert_eq!(htonl(3600), [0, 0, 0x0e, 0x10]);
        assert_eq!(htonll(1), [0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_decode() {
        assert_eq!(ntohs(&[0x01, 0xbb]).unwrap(), 443);
        assert_eq!(ntohl(&[0, 1, 0, 0]).unwrap(), 65536);
        assert_eq!(ntohll(&htonll(u64::MAX - 1)).unwrap(), u64::MAX - 1);
        assert!(ntohl(&[0, 1]).is_err());
    }
}
