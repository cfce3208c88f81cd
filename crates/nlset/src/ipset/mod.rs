//! ipset: named IP/MAC/port sets in the kernel, over nfnetlink.
//!
//! [`Handle`] exposes the commands. Underneath, [`Request`] builds the
//! attribute tree for each command, [`Set`] and [`Entry`] decode replies, and
//! [`ErrorCode`] names the kernel's error numbers.
//!
//! # Example
//!
//! ```ignore
//! use nlset::ipset::{CreateOptions, Entry, ErrorCode, Handle, SetType};
//!
//! let handle = Handle::new()?;
//! match handle.create("web", SetType::HashIpPort, CreateOptions::new()).await {
//!     Err(e) if e == ErrorCode::SET_EXISTS => {}
//!     other => other?,
//! }
//! handle
//!     .add("web", &Entry::from_ip("192.0.2.10".parse()?).port(443))
//!     .await?;
//! ```

mod entry;
mod error;
mod handle;
mod options;
mod request;
mod set;
mod settype;
mod transport;
pub mod types;

pub use entry::Entry;
pub use error::ErrorCode;
pub use handle::{Handle, ProtocolVersion, TypeRevisions};
pub use options::{CreateOptions, Family};
pub use request::{Request, command_flags};
pub use set::Set;
pub use settype::{Method, Range, SetType, TypeInfo};
pub use transport::{NetlinkTransport, Transport};
