//! Entry management against the running kernel.

use nlset::ipset::{CreateOptions, Entry, ErrorCode, SetType};
use nlset::Result;
use std::net::IpAddr;

use crate::common::TestNamespace;

#[tokio::test]
async fn test_add_list_delete() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("adt")?;
    let handle = ns.handle()?;
    require_ipset!(handle);

    handle.create("s", SetType::HashIp, CreateOptions::new()).await?;

    let ip: IpAddr = "10.0.0.1".parse().unwrap();
    let entry = Entry::from_ip(ip);
    handle.add("s", &entry).await?;

    let set = handle.list("s").await?;
    assert_eq!(set.entries.len(), 1);
    assert_eq!(set.entries[0].ip, Some(ip));
    assert_eq!(set.entries[0].cidr, 0);

    let err = handle.add("s", &entry).await.unwrap_err();
    assert!(err == ErrorCode::ALREADY_EXISTS);

    handle.delete("s", &entry).await?;
    assert!(handle.list("s").await?.entries.is_empty());

    handle.destroy("s").await?;
    Ok(())
}

#[tokio::test]
async fn test_membership() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("test")?;
    let handle = ns.handle()?;
    require_ipset!(handle);

    handle
        .create("web", SetType::HashIpPort, CreateOptions::new())
        .await?;

    let https = Entry::from_ip("192.0.2.10".parse().unwrap()).port(443);
    handle.add("web", &https).await?;

    assert!(handle.test("web", &https).await?);
    assert!(!handle.test("web", &https.clone().port(80)).await?);

    Ok(())
}

#[tokio::test]
async fn test_comments_and_flush() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("flush")?;
    let handle = ns.handle()?;
    require_ipset!(handle);

    handle
        .create("nets", SetType::HashNet, CreateOptions::new().comments(true))
        .await?;

    for i in 0..64u8 {
        let entry = Entry::from_net(IpAddr::from([10, i, 0, 0]), 16).comment(format!("net {}", i));
        handle.add("nets", &entry).await?;
    }

    let set = handle.list("nets").await?;
    assert_eq!(set.entries.len(), 64);
    assert!(set.entries.iter().all(|e| e.cidr == 16));
    assert!(
        set.entries
            .iter()
            .any(|e| e.comment.as_deref() == Some("net 7"))
    );

    handle.flush("nets").await?;
    assert!(handle.list("nets").await?.entries.is_empty());

    Ok(())
}
