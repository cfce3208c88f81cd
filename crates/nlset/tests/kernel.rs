//! Kernel-backed tests.
//!
//! Compiled only with the `integration` feature; each test skips itself
//! unless running as root on a kernel with ipset support.
//!
//! # Running Tests
//!
//! ```bash
//! sudo cargo test -p nlset --features integration --test kernel
//!
//! # Run a single test
//! sudo cargo test -p nlset --features integration --test kernel test_swap
//! ```
//!
//! # Test Organization
//!
//! - `sets.rs` - create, destroy, rename, swap, list
//! - `entries.rs` - add, delete, test, flush

#[macro_use]
#[path = "common/mod.rs"]
mod common;

#[path = "kernel/sets.rs"]
mod sets;

#[path = "kernel/entries.rs"]
mod entries;
