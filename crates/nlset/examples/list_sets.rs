//! List every ipset with its entries, like `ipset list`.
//!
//! Run with: cargo run -p nlset --example list_sets
//!
//! Listing requires CAP_NET_ADMIN. Pass a set name to list only that set:
//!   cargo run -p nlset --example list_sets -- blocked

use std::env;

use nlset::util::format_mac;
use nlset::{Entry, Handle, Set};

#[tokio::main]
async fn main() -> nlset::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let handle = Handle::new()?;

    let sets = match env::args().nth(1) {
        Some(name) => vec![handle.list(&name).await?],
        None => handle.list_all().await?,
    };

    for set in &sets {
        print_set(set);
    }

    Ok(())
}

fn print_set(set: &Set) {
    println!("Name: {}", set.name);
    println!("Type: {}", set.type_name);
    println!("Revision: {}", set.revision);
    print!("Header: family {:?}", set.family());
    if set.hash_size > 0 {
        print!(" hashsize {}", set.hash_size);
    }
    if set.max_elements > 0 {
        print!(" maxelem {}", set.max_elements);
    }
    if let Some(timeout) = set.timeout {
        print!(" timeout {}", timeout);
    }
    println!();
    println!("Size in memory: {}", set.memsize);
    println!("References: {}", set.references);
    println!("Number of entries: {}", set.entries.len());
    println!("Members:");
    for entry in &set.entries {
        println!("{}", format_entry(entry));
    }
    println!();
}

fn format_entry(entry: &Entry) -> String {
    let mut parts = Vec::new();

    if let Some(ip) = entry.ip {
        match entry.cidr {
            0 => parts.push(ip.to_string()),
            cidr => parts.push(format!("{}/{}", ip, cidr)),
        }
    }
    if let Some(mac) = entry.mac {
        parts.push(format_mac(&mac));
    }
    if let Some(port) = entry.port {
        parts.push(port.to_string());
    }
    if let Some(ip2) = entry.ip2 {
        parts.push(format!("{}/{}", ip2, entry.cidr2));
    }
    if let Some(iface) = &entry.iface {
        parts.push(iface.clone());
    }
    if let Some(name) = &entry.name {
        parts.push(name.clone());
    }

    let mut line = parts.join(",");
    if let Some(timeout) = entry.timeout {
        line.push_str(&format!(" timeout {}", timeout));
    }
    if let (Some(packets), Some(bytes)) = (entry.packets, entry.bytes) {
        line.push_str(&format!(" packets {} bytes {}", packets, bytes));
    }
    if let Some(comment) = &entry.comment {
        line.push_str(&format!(" comment \"{}\"", comment));
    }
    if entry.nomatch {
        line.push_str(" nomatch");
    }
    line
}
