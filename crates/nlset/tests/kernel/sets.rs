//! Set lifecycle against the running kernel.

use nlset::ipset::{CreateOptions, ErrorCode, Family, SetType};
use nlset::Result;
use std::time::Duration;

use crate::common::TestNamespace;

#[tokio::test]
async fn test_query_protocol() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("proto")?;
    let handle = ns.handle()?;
    require_ipset!(handle);

    let version = handle.query_protocol().await?;
    assert!(version.version >= version.min_version);
    assert!(version.min_version <= nlset::ipset::types::IPSET_PROTOCOL);

    Ok(())
}

#[tokio::test]
async fn test_create_and_destroy() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("create")?;
    let handle = ns.handle()?;
    require_ipset!(handle);

    handle
        .create("blocked", SetType::HashIp, CreateOptions::new())
        .await?;

    let set = handle.list("blocked").await?;
    assert_eq!(set.name, "blocked");
    assert_eq!(set.type_name, "hash:ip");
    assert_eq!(set.family(), Family::Inet);
    assert!(set.entries.is_empty());

    let err = handle
        .create("blocked", SetType::HashIp, CreateOptions::new())
        .await
        .unwrap_err();
    assert!(err.is_already_exists());

    handle.destroy("blocked").await?;
    let err = handle.list("blocked").await.unwrap_err();
    assert!(err == ErrorCode::SET_NOT_EXIST);

    handle.force_destroy("blocked").await?;
    Ok(())
}

#[tokio::test]
async fn test_create_with_options() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("opts")?;
    let handle = ns.handle()?;
    require_ipset!(handle);

    let opts = CreateOptions::new()
        .timeout(Duration::from_secs(600))
        .counters(true)
        .comments(true)
        .max_elements(1024);
    handle.create("timed", SetType::HashNet, opts).await?;

    let header = handle.header("timed").await?;
    assert_eq!(header.timeout, Some(600));
    assert_eq!(header.max_elements, 1024);

    let opts = CreateOptions::new().port_range(1000, 2000);
    handle.create("ports", SetType::BitmapPort, opts).await?;

    let header = handle.header("ports").await?;
    assert_eq!(header.port_from, 1000);
    assert_eq!(header.port_to, 2000);

    Ok(())
}

#[tokio::test]
async fn test_swap() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("swap")?;
    let handle = ns.handle()?;
    require_ipset!(handle);

    handle.create("a", SetType::HashIp, CreateOptions::new()).await?;
    handle.create("b", SetType::HashIp, CreateOptions::new()).await?;
    handle.create("n", SetType::HashNet, CreateOptions::new()).await?;

    handle.swap("a", "b").await?;

    let err = handle.swap("a", "missing").await.unwrap_err();
    assert!(err == ErrorCode::SECOND_SET_NOT_EXIST);

    let err = handle.swap("a", "n").await.unwrap_err();
    assert!(err == ErrorCode::TYPE_MISMATCH);

    Ok(())
}

#[tokio::test]
async fn test_rename() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("rename")?;
    let handle = ns.handle()?;
    require_ipset!(handle);

    handle.create("x", SetType::HashIp, CreateOptions::new()).await?;
    handle.create("y", SetType::HashIp, CreateOptions::new()).await?;

    let err = handle.rename("x", "y").await.unwrap_err();
    assert!(err == ErrorCode::NEW_NAME_ALREADY_EXISTS);
    assert_eq!(handle.header("x").await?.name, "x");

    handle.rename("x", "z").await?;
    assert!(handle.header("x").await.unwrap_err().is_not_found());

    let names: Vec<String> = handle
        .list_all()
        .await?
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert!(names.contains(&"z".to_string()));
    assert!(names.contains(&"y".to_string()));

    Ok(())
}

#[tokio::test]
async fn test_type_revisions() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("types")?;
    let handle = ns.handle()?;
    require_ipset!(handle);

    let revs = handle
        .type_revisions(SetType::HashIp, Family::Inet)
        .await?;
    assert!(revs.min <= revs.max);

    Ok(())
}
