use crate::*;

/// Shutting down a populated hub closes every sink and sends no quit notices.
#[tokio::test]
async fn test_shutdown_is_silent() {
    let hub = TestHub::start(HubConfig::default());

    let mut clients = Vec::new();
    for nick in ["a", "b", "c", "d", "e"] {
        clients.push(hub.join(nick, 10).await.unwrap());
    }

    hub.stop().await;

    for client in &mut clients {
        let mut quits = 0;
        while let Some(msg) = client.rx.recv().await {
            if msg.command() == Command::IQUI {
                quits += 1;
            }
        }
        assert_eq!(quits, 0, "{} saw a quit notice during shutdown", client.sid);
    }
}

/// Monotonic allocation never hands a departed session's SID to a newcomer.
#[tokio::test]
async fn test_monotonic_sids_are_not_reused() {
    let hub = TestHub::start(HubConfig::default());

    let result = async {
        let first = hub.join("first", 0).await?;
        hub.handle.disconnect(first.sid, QuitReason::Disconnected).await?;
        let second = hub.join("second", 0).await?;
        assert_eq!(first.sid.value(), 1);
        assert_eq!(second.sid.value(), 2);
        Ok::<_, anyhow::Error>(())
    }
    .await;

    hub.stop().await;
    result.unwrap();
}

/// Share updates move hub totals by the difference.
#[tokio::test]
async fn test_share_update_adjusts_totals() {
    let hub = TestHub::start(HubConfig::default());

    let result = async {
        let a = hub.join("a", 500).await?;
        let _b = hub.join("b", 250).await?;
        assert!(hub.handle.update_share(a.sid, 100, 1).await?);

        let snap = hub.handle.snapshot().await?;
        assert_eq!(snap.shared_size, 350);
        assert_eq!(snap.count_peak, 2);
        Ok::<_, anyhow::Error>(())
    }
    .await;

    hub.stop().await;
    result.unwrap();
}

/// The statistics tick follows the configured interval.
#[tokio::test(start_paused = true)]
async fn test_statistics_use_configured_interval() {
    let mut config = HubConfig::default();
    config.stats.interval_secs = 10;
    let hub = TestHub::start(config);

    hub.net.record_tx(1_000);
    hub.net.record_rx(20_480);
    tokio::time::sleep(std::time::Duration::from_secs(11)).await;

    let snap = hub.handle.snapshot().await.unwrap();
    assert_eq!(snap.stats.net_tx, 100);
    assert_eq!(snap.stats.net_rx, 2_048);
    assert_eq!(snap.stats.net_rx_total, 20_480);

    hub.stop().await;
}
