//! The ipset command surface.

use std::path::Path;

use tracing::debug;

use super::entry::Entry;
use super::error::ErrorCode;
use super::options::{CreateOptions, Family};
use super::request::Request;
use super::set::Set;
use super::settype::SetType;
use super::transport::{NetlinkTransport, Transport};
use crate::netlink::{Error, Result};

/// Protocol versions reported by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProtocolVersion {
    pub version: u8,
    /// Oldest version the kernel still accepts.
    pub min_version: u8,
}

/// Revision range of a set type supported by the running kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TypeRevisions {
    pub max: u8,
    pub min: u8,
}

/// Entry point for ipset operations.
///
/// Each method sends exactly one request and waits for its replies. Nothing is
/// cached between calls and nothing is retried.
///
/// # Example
///
/// ```ignore
/// use nlset::ipset::{CreateOptions, Entry, Handle, SetType};
///
/// let handle = Handle::new()?;
/// handle.create("blocked", SetType::HashIp, CreateOptions::new()).await?;
/// handle.add("blocked", &Entry::from_ip("10.0.0.1".parse()?)).await?;
///
/// let set = handle.list("blocked").await?;
/// for entry in &set.entries {
///     println!("{:?}", entry.ip);
/// }
/// ```
pub struct Handle<T = NetlinkTransport> {
    transport: T,
}

impl Handle<NetlinkTransport> {
    /// Create a handle on a netlink socket in the current namespace.
    pub fn new() -> Result<Self> {
        Ok(Self::with_transport(NetlinkTransport::new()?))
    }

    /// Create a handle on a netlink socket in the namespace at `ns_path`.
    pub fn new_in_namespace_path<P: AsRef<Path>>(ns_path: P) -> Result<Self> {
        Ok(Self::with_transport(NetlinkTransport::new_in_namespace_path(
            ns_path,
        )?))
    }
}

impl<T: Transport> Handle<T> {
    /// Create a handle on any transport.
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Get the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn execute(&self, request: Request) -> Result<Vec<Vec<u8>>> {
        self.transport.execute(request.encode()?).await
    }

    /// Query the protocol version spoken by the kernel.
    pub async fn query_protocol(&self) -> Result<ProtocolVersion> {
        let msgs = self
            .execute(Request::protocol())
            .await
            .map_err(|e| e.with_context("query protocol"))?;
        let set = Set::unserialize(&msgs)?;
        Ok(ProtocolVersion {
            version: set.protocol,
            min_version: set.protocol_min,
        })
    }

    /// Create a set.
    ///
    /// Without `replace`, an existing set of the same name is an error.
    pub async fn create(&self, name: &str, set_type: SetType, options: CreateOptions) -> Result<()> {
        debug!(name, set_type = %set_type, "creating ipset");
        self.execute(Request::create(name, set_type, &options))
            .await
            .map_err(|e| e.with_context(format!("create set {}", name)))?;
        Ok(())
    }

    /// Destroy a set.
    pub async fn destroy(&self, name: &str) -> Result<()> {
        self.execute(Request::destroy(name))
            .await
            .map_err(|e| e.with_context(format!("destroy set {}", name)))?;
        Ok(())
    }

    /// Destroy a set, succeeding when it does not exist.
    pub async fn force_destroy(&self, name: &str) -> Result<()> {
        match self.destroy(name).await {
            Err(e) if e == ErrorCode::SET_NOT_EXIST => {
                debug!(name, "set already absent");
                Ok(())
            }
            other => other,
        }
    }

    /// Remove every entry of a set.
    pub async fn flush(&self, name: &str) -> Result<()> {
        self.execute(Request::flush(name))
            .await
            .map_err(|e| e.with_context(format!("flush set {}", name)))?;
        Ok(())
    }

    /// Dump one set with its entries.
    pub async fn list(&self, name: &str) -> Result<Set> {
        let msgs = self
            .execute(Request::list(Some(name)))
            .await
            .map_err(|e| e.with_context(format!("list set {}", name)))?;
        if msgs.is_empty() {
            return Err(Error::InvalidMessage(format!(
                "no reply listing set {}",
                name
            )));
        }
        Set::unserialize(&msgs)
    }

    /// Dump every set, in kernel order.
    pub async fn list_all(&self) -> Result<Vec<Set>> {
        let msgs = self
            .execute(Request::list(None))
            .await
            .map_err(|e| e.with_context("list sets"))?;
        Set::unserialize_all(&msgs)
    }

    /// Fetch a set header without its entries.
    pub async fn header(&self, name: &str) -> Result<Set> {
        let msgs = self
            .execute(Request::header(name))
            .await
            .map_err(|e| e.with_context(format!("read header of set {}", name)))?;
        Set::unserialize(&msgs)
    }

    /// Ask which revisions of `set_type` the kernel supports.
    pub async fn type_revisions(&self, set_type: SetType, family: Family) -> Result<TypeRevisions> {
        let msgs = self
            .execute(Request::type_query(set_type, family))
            .await
            .map_err(|e| e.with_context(format!("query type {}", set_type)))?;
        let set = Set::unserialize(&msgs)?;
        Ok(TypeRevisions {
            max: set.revision,
            min: set.protocol_min,
        })
    }

    /// Add an entry.
    ///
    /// Without `entry.replace`, an existing element is an error.
    pub async fn add(&self, name: &str, entry: &Entry) -> Result<()> {
        self.execute(Request::add(name, entry))
            .await
            .map_err(|e| e.with_context(format!("add to set {}", name)))?;
        Ok(())
    }

    /// Delete an entry.
    pub async fn delete(&self, name: &str, entry: &Entry) -> Result<()> {
        self.execute(Request::delete(name, entry))
            .await
            .map_err(|e| e.with_context(format!("delete from set {}", name)))?;
        Ok(())
    }

    /// Check whether an entry is in a set.
    pub async fn test(&self, name: &str, entry: &Entry) -> Result<bool> {
        match self.execute(Request::test(name, entry)).await {
            Ok(_) => Ok(true),
            // The kernel answers "not a member" with IPSET_ERR_EXIST.
            Err(e) if e == ErrorCode::Exist => Ok(false),
            Err(e) => Err(e.with_context(format!("test set {}", name))),
        }
    }

    /// Rename a set; `to` must not exist.
    pub async fn rename(&self, from: &str, to: &str) -> Result<()> {
        self.execute(Request::rename(from, to))
            .await
            .map_err(|e| e.with_context(format!("rename set {} to {}", from, to)))?;
        Ok(())
    }

    /// Exchange the names of two sets of compatible type.
    pub async fn swap(&self, from: &str, to: &str) -> Result<()> {
        self.execute(Request::swap(from, to))
            .await
            .map_err(|e| e.with_context(format!("swap sets {} and {}", from, to)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::message::{NLMSG_HDRLEN, NlMsgHdr};
    use crate::netlink::nfgen::NfGenMsg;
    use crate::netlink::tree::{AttrTree, encode};
    use crate::ipset::types::{ipset_attr, ipset_cmd};
    use std::sync::Mutex;

    /// Records requests and answers each with a canned reply.
    struct Canned {
        reply: Mutex<Option<Result<Vec<Vec<u8>>>>>,
        seen: Mutex<Vec<Vec<u8>>>,
    }

    impl Canned {
        fn new(reply: Result<Vec<Vec<u8>>>) -> Self {
            Self {
                reply: Mutex::new(Some(reply)),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn last_cmd(&self) -> u8 {
            let seen = self.seen.lock().unwrap();
            let hdr = NlMsgHdr::from_bytes(seen.last().unwrap()).unwrap();
            (hdr.nlmsg_type & 0xff) as u8
        }
    }

    impl Transport for Canned {
        async fn execute(&self, request: Vec<u8>) -> Result<Vec<Vec<u8>>> {
            assert!(request.len() >= NLMSG_HDRLEN);
            self.seen.lock().unwrap().push(request);
            self.reply.lock().unwrap().take().unwrap_or(Ok(Vec::new()))
        }
    }

    fn reply(attrs: &[(u16, AttrTree)]) -> Vec<u8> {
        let mut msg = NfGenMsg::new(2).to_bytes().to_vec();
        msg.extend(encode(attrs).unwrap());
        msg
    }

    #[tokio::test]
    async fn test_query_protocol() {
        let handle = Handle::with_transport(Canned::new(Ok(vec![reply(&[
            (ipset_attr::PROTOCOL, AttrTree::u8(7)),
            (ipset_attr::PROTOCOL_MIN, AttrTree::u8(6)),
        ])])));
        let version = handle.query_protocol().await.unwrap();
        assert_eq!(version, ProtocolVersion { version: 7, min_version: 6 });
        assert_eq!(handle.transport().last_cmd(), ipset_cmd::PROTOCOL);
    }

    #[tokio::test]
    async fn test_force_destroy_ignores_missing() {
        let handle = Handle::with_transport(Canned::new(Err(Error::from_errno(-libc::ENOENT))));
        handle.force_destroy("gone").await.unwrap();
        assert_eq!(handle.transport().last_cmd(), ipset_cmd::DESTROY);

        let handle = Handle::with_transport(Canned::new(Err(Error::from_errno(4100))));
        let err = handle.force_destroy("busy").await.unwrap_err();
        assert!(err == ErrorCode::BUSY);
        assert!(err.to_string().contains("destroy set busy"));
    }

    #[tokio::test]
    async fn test_list_empty_reply() {
        let handle = Handle::with_transport(Canned::new(Ok(Vec::new())));
        assert!(matches!(
            handle.list("S").await,
            Err(Error::InvalidMessage(_))
        ));
    }

    #[tokio::test]
    async fn test_test_membership() {
        let handle = Handle::with_transport(Canned::new(Ok(Vec::new())));
        let entry = Entry::from_ip("10.0.0.1".parse().unwrap());
        assert!(handle.test("S", &entry).await.unwrap());

        let handle = Handle::with_transport(Canned::new(Err(Error::from_errno(4103))));
        assert!(!handle.test("S", &entry).await.unwrap());
        assert_eq!(handle.transport().last_cmd(), ipset_cmd::TEST);

        let handle = Handle::with_transport(Canned::new(Err(Error::from_errno(-libc::ENOENT))));
        assert!(handle.test("S", &entry).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_type_revisions() {
        let handle = Handle::with_transport(Canned::new(Ok(vec![reply(&[
            (ipset_attr::TYPENAME, AttrTree::string("hash:ip")),
            (ipset_attr::REVISION, AttrTree::u8(6)),
            (ipset_attr::REVISION_MIN, AttrTree::u8(0)),
        ])])));
        let revs = handle
            .type_revisions(SetType::HashIp, Family::Inet)
            .await
            .unwrap();
        assert_eq!(revs, TypeRevisions { max: 6, min: 0 });
    }
}
