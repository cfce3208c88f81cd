//! Utility functions.

pub mod addr;

pub use addr::{format_mac, parse_mac, parse_prefix};
