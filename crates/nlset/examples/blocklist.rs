//! Build a temporary blocklist and dump it as JSON.
//!
//! Addresses and networks go into a `hash:net` set, MAC addresses into a
//! `hash:mac` set. Both sets are destroyed before exiting.
//!
//! Run with (requires root):
//!   cargo run -p nlset --features serde --example blocklist -- 203.0.113.0/24 198.51.100.7 02:00:5e:00:53:01

use std::env;
use std::time::Duration;

use nlset::util::{parse_mac, parse_prefix};
use nlset::{CreateOptions, Entry, Handle, SetType};

const NET_SET: &str = "demo-blocklist";
const MAC_SET: &str = "demo-blocklist-mac";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let handle = Handle::new()?;

    let opts = CreateOptions::new()
        .timeout(Duration::from_secs(3600))
        .comments(true)
        .replace(true);
    handle.create(NET_SET, SetType::HashNet, opts.clone()).await?;
    handle.create(MAC_SET, SetType::HashMac, opts).await?;

    for arg in env::args().skip(1) {
        if let Ok(mac) = parse_mac(&arg) {
            handle
                .add(MAC_SET, &Entry::from_mac(mac).comment("demo").replace(true))
                .await?;
            continue;
        }

        let (addr, prefix) = parse_prefix(&arg)?;
        let entry = match prefix {
            0 => Entry::from_ip(addr),
            prefix => Entry::from_net(addr, prefix),
        };
        handle
            .add(NET_SET, &entry.comment("demo").replace(true))
            .await?;
    }

    for name in [NET_SET, MAC_SET] {
        let set = handle.list(name).await?;
        println!("{}", serde_json::to_string_pretty(&set)?);
    }

    handle.destroy(NET_SET).await?;
    handle.destroy(MAC_SET).await?;

    Ok(())
}
