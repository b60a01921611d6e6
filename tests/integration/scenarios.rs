//! End-to-end message scenarios over a real socket.

use anyhow::Result;

use padwatch_core::BatteryLevel;
use padwatchd::ControlEvent;

use crate::*;

#[tokio::test]
async fn dongle_on_pairing_then_connect() -> Result<()> {
    let mut daemon = TestDaemon::start().await?;
    let mut stream = daemon.connect().await?;

    send(&mut stream, "DN|1").await?;
    daemon.expect("ON").await?;
    send(&mut stream, "PS|1").await?;
    daemon.expect("PAIRING").await?;
    send(&mut stream, "CC|7").await?;
    daemon.expect("1").await?;

    let dispatcher = daemon.shutdown().await?;
    let peers: Vec<_> = dispatcher.registry().iter().cloned().collect();
    assert_eq!(peers.len(), 1);
    assert_eq!(peers[0].peer_id, "7");
    assert_eq!(peers[0].battery_level, BatteryLevel::Unknown);
    Ok(())
}

#[tokio::test]
async fn battery_reading_prints_roll_call() -> Result<()> {
    let mut daemon = TestDaemon::start().await?;
    let mut stream = daemon.connect().await?;

    send(&mut stream, "CC|7").await?;
    daemon.expect("1").await?;
    send(&mut stream, "BL|0|2").await?;
    daemon.expect("7 - MEDIUM").await?;

    let dispatcher = daemon.shutdown().await?;
    assert_eq!(dispatcher.registry().roll_call(), "7 - MEDIUM");
    Ok(())
}

#[tokio::test]
async fn battery_reading_updates_latest_peer_only() -> Result<()> {
    let mut daemon = TestDaemon::start().await?;
    let mut stream = daemon.connect().await?;

    send(&mut stream, "CC|1").await?;
    daemon.expect("1").await?;
    send(&mut stream, "CC|2").await?;
    daemon.expect("2").await?;
    send(&mut stream, "BL|0|0").await?;
    daemon.expect("1 - UNKNOWN / 2 - EMPTY").await?;

    daemon.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn refresh_after_last_peer_leaves_is_silent() -> Result<()> {
    let mut daemon = TestDaemon::start().await?;
    let mut stream = daemon.connect().await?;

    send(&mut stream, "CC|1").await?;
    daemon.expect("1").await?;
    send(&mut stream, "CD|1").await?;
    daemon.expect("0").await?;

    daemon.signal(ControlEvent::Refresh)?;
    daemon.expect_quiet().await?;

    let dispatcher = daemon.shutdown().await?;
    assert!(dispatcher.registry().is_empty());
    Ok(())
}

#[tokio::test]
async fn full_demo_session() -> Result<()> {
    let mut daemon = TestDaemon::start().await?;
    let mut stream = daemon.connect().await?;

    for (message, status) in [
        ("DN|1", "ON"),
        ("PS|1", "PAIRING"),
        ("CC|1", "1"),
        ("BL|0|2", "1 - MEDIUM"),
        ("CD|1", "0"),
    ] {
        send(&mut stream, message).await?;
        daemon.expect(status).await?;
    }

    daemon.shutdown().await?;
    Ok(())
}
