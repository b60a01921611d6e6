//! Connection handling, control events, and hardening.

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;

use padwatchd::ControlEvent;

use crate::*;

#[tokio::test]
async fn bad_messages_keep_connection_open() -> Result<()> {
    let mut daemon = TestDaemon::start().await?;
    let mut stream = daemon.connect().await?;

    send(&mut stream, "XX|1").await?;
    send(&mut stream, "BL|0").await?;
    send(&mut stream, "CC").await?;
    daemon.expect_quiet().await?;

    send(&mut stream, "CC|4").await?;
    daemon.expect("1").await?;
    send(&mut stream, "BL|0|9").await?;
    daemon.expect_quiet().await?;
    send(&mut stream, "BL|0|3").await?;
    daemon.expect("4 - FULL").await?;

    daemon.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn registry_survives_reconnect() -> Result<()> {
    let mut daemon = TestDaemon::start().await?;

    let mut first = daemon.connect().await?;
    send(&mut first, "CC|1").await?;
    daemon.expect("1").await?;
    drop(first);

    let mut second = daemon.connect().await?;
    send(&mut second, "CC|2").await?;
    daemon.expect("2").await?;

    daemon.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn second_connection_waits_for_first_to_close() -> Result<()> {
    let mut daemon = TestDaemon::start().await?;

    let mut first = daemon.connect().await?;
    send(&mut first, "CC|1").await?;
    daemon.expect("1").await?;

    let mut second = daemon.connect().await?;
    send(&mut second, "CC|2").await?;
    daemon.expect_quiet().await?;

    drop(first);
    daemon.expect("2").await?;

    drop(second);
    daemon.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn refresh_interrupts_idle_connection() -> Result<()> {
    let mut daemon = TestDaemon::start().await?;
    let mut stream = daemon.connect().await?;

    send(&mut stream, "CC|7").await?;
    daemon.expect("1").await?;

    daemon.signal(ControlEvent::Refresh)?;
    daemon.expect("7 - UNKNOWN").await?;
    daemon.signal(ControlEvent::Refresh)?;
    daemon.expect("1").await?;

    send(&mut stream, "CC|8").await?;
    daemon.expect("2").await?;
    daemon.signal(ControlEvent::Refresh)?;
    daemon.expect("7 - UNKNOWN / 8 - UNKNOWN").await?;

    daemon.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn refresh_while_accepting() -> Result<()> {
    let mut daemon = TestDaemon::start().await?;

    let mut stream = daemon.connect().await?;
    send(&mut stream, "CC|3").await?;
    daemon.expect("1").await?;
    drop(stream);
    tokio::time::sleep(WRITE_GAP).await;

    daemon.signal(ControlEvent::Refresh)?;
    daemon.expect("3 - UNKNOWN").await?;

    daemon.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn reserved_event_does_nothing() -> Result<()> {
    let mut daemon = TestDaemon::start().await?;
    let mut stream = daemon.connect().await?;

    send(&mut stream, "CC|1").await?;
    daemon.expect("1").await?;

    daemon.signal(ControlEvent::Reserved)?;
    daemon.expect_quiet().await?;

    // The reserved event must not have touched the refresh toggle.
    daemon.signal(ControlEvent::Refresh)?;
    daemon.expect("1 - UNKNOWN").await?;

    daemon.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn shutdown_closes_active_connection() -> Result<()> {
    let mut daemon = TestDaemon::start().await?;
    let mut stream = daemon.connect().await?;

    send(&mut stream, "CC|1").await?;
    daemon.expect("1").await?;

    let dispatcher = daemon.shutdown().await?;
    assert_eq!(dispatcher.registry().len(), 1);

    let mut buf = [0u8; 16];
    let n = tokio::time::timeout(STATUS_TIMEOUT, stream.read(&mut buf))
        .await
        .context("connection was not closed")??;
    assert_eq!(n, 0);
    Ok(())
}

#[tokio::test]
async fn shutdown_while_accepting() -> Result<()> {
    let daemon = TestDaemon::start().await?;
    let dispatcher = daemon.shutdown().await?;
    assert!(dispatcher.registry().is_empty());
    Ok(())
}

#[tokio::test]
async fn line_terminated_messages_are_accepted() -> Result<()> {
    let mut daemon = TestDaemon::start().await?;
    let mut stream = daemon.connect().await?;

    send(&mut stream, "DN|1\n").await?;
    daemon.expect("ON").await?;
    send(&mut stream, "CC|5\r\n").await?;
    daemon.expect("1").await?;

    daemon.shutdown().await?;
    Ok(())
}
