//! Moving encoded requests to the kernel and collecting the replies.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, trace};

use crate::netlink::builder::{set_pid, set_seq};
use crate::netlink::message::{MessageIter, NLMSG_HDRLEN, NlMsgError};
use crate::netlink::{Error, NetlinkSocket, Result};

/// Carries one request to the kernel and returns its replies.
///
/// `request` is a complete netlink message whose sequence number and port id
/// are still zero. The result holds, in arrival order, the payload of every
/// data message that answered it, each starting at its nfgenmsg header. A
/// kernel error reply comes back as [`Error::from_errno`].
pub trait Transport {
    fn execute(&self, request: Vec<u8>) -> impl Future<Output = Result<Vec<Vec<u8>>>> + Send;
}

/// Transport over a NETLINK_NETFILTER socket.
pub struct NetlinkTransport {
    socket: NetlinkSocket,
    timeout: Option<Duration>,
}

impl NetlinkTransport {
    /// Open a transport in the current network namespace.
    pub fn new() -> Result<Self> {
        Ok(Self {
            socket: NetlinkSocket::new()?,
            timeout: None,
        })
    }

    /// Open a transport inside the network namespace at `ns_path`.
    pub fn new_in_namespace_path<P: AsRef<Path>>(ns_path: P) -> Result<Self> {
        Ok(Self {
            socket: NetlinkSocket::new_in_namespace_path(ns_path)?,
            timeout: None,
        })
    }

    /// Fail with [`Error::Timeout`] when the kernel has not finished
    /// answering within `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get the underlying socket.
    pub fn socket(&self) -> &NetlinkSocket {
        &self.socket
    }

    async fn collect(&self, seq: u32) -> Result<Vec<Vec<u8>>> {
        let mut responses = Vec::new();

        loop {
            let data = self.socket.recv_msg().await?;
            trace!(len = data.len(), seq, "received netlink datagram");

            for result in MessageIter::new(&data) {
                let (header, payload) = result?;

                if header.nlmsg_seq != seq {
                    continue;
                }

                if header.is_error() {
                    let err = NlMsgError::from_bytes(payload)?;
                    if !err.is_ack() {
                        debug!(errno = err.error, seq, "kernel rejected ipset request");
                        return Err(Error::from_errno(err.error));
                    }
                    return Ok(responses);
                }

                if header.is_done() {
                    return Ok(responses);
                }

                responses.push(payload.to_vec());

                if !header.is_multi() {
                    return Ok(responses);
                }
            }
        }
    }
}

impl Transport for NetlinkTransport {
    async fn execute(&self, mut request: Vec<u8>) -> Result<Vec<Vec<u8>>> {
        if request.len() < NLMSG_HDRLEN {
            return Err(Error::Truncated {
                expected: NLMSG_HDRLEN,
                actual: request.len(),
            });
        }

        let seq = self.socket.next_seq();
        set_seq(&mut request, seq);
        set_pid(&mut request, self.socket.pid());

        trace!(len = request.len(), seq, "sending ipset request");
        self.socket.send(&request).await?;

        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.collect(seq))
                .await
                .map_err(|_| Error::Timeout)?,
            None => self.collect(seq).await,
        }
    }
}
