//! Shared helpers for kernel-backed tests.
//!
//! Every test runs in its own network namespace so that sets never leak into
//! the host's ipset table.

use nlset::Handle;
use nlset::Result;
use std::io;
use std::process::Command;
use std::sync::atomic::{AtomicU32, Ordering};

/// Global counter for unique namespace names.
static NAMESPACE_COUNTER: AtomicU32 = AtomicU32::new(0);

fn unique_ns_name(prefix: &str) -> String {
    let id = NAMESPACE_COUNTER.fetch_add(1, Ordering::SeqCst);
    let pid = std::process::id();
    format!("nlset-test-{}-{}-{}", prefix, pid, id)
}

/// A named network namespace, deleted on drop.
pub struct TestNamespace {
    name: String,
}

impl TestNamespace {
    /// Create a namespace whose name starts with `prefix`.
    pub fn new(prefix: &str) -> Result<Self> {
        let name = unique_ns_name(prefix);

        let status = Command::new("ip")
            .args(["netns", "add", &name])
            .status()
            .map_err(|e| nlset::Error::Io(io::Error::from(e.kind())))?;

        if !status.success() {
            return Err(nlset::Error::InvalidMessage(format!(
                "failed to create namespace: {}",
                name
            )));
        }

        Ok(Self { name })
    }

    /// Get a handle bound to this namespace.
    pub fn handle(&self) -> Result<Handle> {
        Handle::new_in_namespace_path(format!("/var/run/netns/{}", self.name))
    }
}

impl Drop for TestNamespace {
    fn drop(&mut self) {
        let _ = Command::new("ip")
            .args(["netns", "del", &self.name])
            .status();
    }
}

/// Check if running as root.
pub fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

/// Skip the test if not running as root.
#[macro_export]
macro_rules! require_root {
    () => {
        if !crate::common::is_root() {
            eprintln!("Skipping test: requires root");
            return Ok(());
        }
    };
}

/// Skip the test when the kernel has no ipset support loaded.
#[macro_export]
macro_rules! require_ipset {
    ($handle:expr) => {
        if let Err(e) = $handle.query_protocol().await {
            eprintln!("Skipping test: ipset unavailable ({})", e);
            return Ok(());
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_ns_name() {
        let name1 = unique_ns_name("test");
        let name2 = unique_ns_name("test");
        assert_ne!(name1, name2);
        assert!(name1.starts_with("nlset-test-test-"));
    }
}
