//! Address parsing and formatting utilities.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Error type for address parsing.
#[derive(Debug, thiserror::Error)]
pub enum AddrError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid prefix length: {0}")]
    InvalidPrefix(String),

    #[error("invalid MAC address: {0}")]
    InvalidMac(String),
}

pub type Result<T> = std::result::Result<T, AddrError>;

/// Parse an address with an optional `/prefix` suffix.
///
/// A bare address yields prefix 0, the "whole address" convention of ipset
/// entries.
pub fn parse_prefix(s: &str) -> Result<(IpAddr, u8)> {
    let (addr_str, prefix) = match s.split_once('/') {
        Some((addr, prefix)) => {
            let prefix = prefix
                .parse::<u8>()
                .map_err(|_| AddrError::InvalidPrefix(prefix.to_string()))?;
            (addr, prefix)
        }
        None => (s, 0),
    };

    let addr: IpAddr = addr_str
        .parse()
        .map_err(|_| AddrError::InvalidAddress(addr_str.to_string()))?;

    let max = if addr.is_ipv4() { 32 } else { 128 };
    if prefix > max {
        return Err(AddrError::InvalidPrefix(format!(
            "{} exceeds maximum {} for {}",
            prefix, max, addr
        )));
    }

    Ok((addr, prefix))
}

/// Parse a MAC address in `aa:bb:cc:dd:ee:ff` form.
pub fn parse_mac(s: &str) -> Result<[u8; 6]> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 6 {
        return Err(AddrError::InvalidMac(s.to_string()));
    }

    let mut mac = [0u8; 6];
    for (byte, part) in mac.iter_mut().zip(&parts) {
        if part.is_empty() || part.len() > 2 {
            return Err(AddrError::InvalidMac(s.to_string()));
        }
        *byte = u8::from_str_radix(part, 16).map_err(|_| AddrError::InvalidMac(s.to_string()))?;
    }

    Ok(mac)
}

/// Format a MAC address as lowercase colon-separated hex.
pub fn format_mac(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(":")
}

/// Build an address from a raw 4- or 16-byte payload.
pub fn ip_from_bytes(bytes: &[u8]) -> Option<IpAddr> {
    match bytes.len() {
        4 => <[u8; 4]>::try_from(bytes).ok().map(|b| IpAddr::V4(Ipv4Addr::from(b))),
        16 => <[u8; 16]>::try_from(bytes).ok().map(|b| IpAddr::V6(Ipv6Addr::from(b))),
        _ => None,
    }
}

/// Raw wire bytes of an address: 4 for IPv4, 16 for IPv6.
pub fn ip_octets(addr: &IpAddr) -> Vec<u8> {
    match addr {
        IpAddr::V4(v4) => v4.octets().to_vec(),
        IpAddr::V6(v6) => v6.octets().to_vec(),
    }
}

/// Reduce an IPv4-mapped IPv6 address to its 4-byte form.
pub fn to_ipv4_form(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => IpAddr::V6(v6),
        },
        v4 => v4,
    }
}
