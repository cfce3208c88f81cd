//! Async ipset control over netlink.
//!
//! This crate manages kernel ipsets (the named address, port and interface
//! sets used by iptables/nftables matches) by speaking the ipset nfnetlink
//! protocol directly, without shelling out to the `ipset` tool.
//!
//! # Features
//!
//! - `serde` - `Serialize` for sets, entries, options and error codes
//! - `integration` - tests against the running kernel (require root)
//!
//! # Example
//!
//! ```ignore
//! use nlset::ipset::{CreateOptions, Entry, Handle, SetType};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> nlset::Result<()> {
//!     let handle = Handle::new()?;
//!
//!     let opts = CreateOptions::new().timeout(Duration::from_secs(300));
//!     handle.create("banned", SetType::HashIp, opts).await?;
//!     handle.add("banned", &Entry::from_ip("203.0.113.7".parse().unwrap())).await?;
//!
//!     for set in handle.list_all().await? {
//!         println!("{} ({}): {} entries", set.name, set.type_name, set.entries.len());
//!     }
//!
//!     handle.destroy("banned").await
//! }
//! ```

pub mod ipset;
pub mod netlink;
pub mod util;

// Re-export common types at crate root for convenience
pub use ipset::{CreateOptions, Entry, ErrorCode, Handle, Set, SetType};
pub use netlink::{Error, Result};
