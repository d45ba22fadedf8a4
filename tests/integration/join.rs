use crate::*;

/// Every newcomer gets one presence payload per logged-in session, in join
/// order, followed by its own announcement.
#[tokio::test]
async fn test_presence_snapshot_in_join_order() {
    let hub = TestHub::start(HubConfig::default());

    let result = async {
        let mut alice = hub.join("alice", 100).await?;
        let mut bob = hub.join("bob", 200).await?;
        let mut carol = hub.join("carol", 300).await?;

        let seen = drain_sids(&mut carol.rx);
        assert_eq!(
            seen,
            [alice.sid.to_string(), bob.sid.to_string(), carol.sid.to_string()]
        );

        // Earlier sessions hear about everyone who came after them.
        assert_eq!(
            drain_sids(&mut alice.rx),
            [alice.sid.to_string(), bob.sid.to_string(), carol.sid.to_string()]
        );
        assert_eq!(
            drain_sids(&mut bob.rx),
            [alice.sid.to_string(), bob.sid.to_string(), carol.sid.to_string()]
        );

        let snap = hub.handle.snapshot().await?;
        assert_eq!(snap.count, 3);
        assert_eq!(snap.shared_size, 600);
        Ok::<_, anyhow::Error>(())
    }
    .await;

    hub.stop().await;
    result.unwrap();
}

/// A newcomer whose queue cannot hold the snapshot never enters the directory.
#[tokio::test]
async fn test_snapshot_overflow_rejects_login() {
    let mut config = HubConfig::default();
    config.sessions.send_queue_capacity = 1;
    let hub = TestHub::start(config);

    let result = async {
        let _a = hub.join("a", 0).await?;
        // b's single slot takes a's presence; its own announcement is dropped
        let _b = hub.join("b", 0).await?;

        assert!(hub.join("slow", 0).await.is_err());
        assert!(hub.handle.find(Lookup::Nick("slow".into())).await?.is_none());
        assert_eq!(hub.handle.snapshot().await?.count, 2);
        Ok::<_, anyhow::Error>(())
    }
    .await;

    hub.stop().await;
    result.unwrap();
}

/// Lookups by all three keys see joins and departures.
#[tokio::test]
async fn test_lookup_by_every_key() {
    let hub = TestHub::start(HubConfig::default());

    let result = async {
        let alice = hub.join("alice", 0).await?;

        let by_sid = hub.handle.find(Lookup::Sid(alice.sid)).await?.context("by sid")?;
        let by_cid = hub.handle.find(Lookup::Cid("CIDalice".into())).await?.context("by cid")?;
        let by_nick = hub.handle.find(Lookup::Nick("alice".into())).await?.context("by nick")?;
        assert_eq!(by_sid, by_cid);
        assert_eq!(by_cid, by_nick);
        assert_eq!(by_sid.state, SessionState::Normal);

        hub.handle.disconnect(alice.sid, QuitReason::Disconnected).await?;
        assert!(hub.handle.find(Lookup::Sid(alice.sid)).await?.is_none());
        assert!(hub.handle.find(Lookup::Cid("CIDalice".into())).await?.is_none());
        assert!(hub.handle.find(Lookup::Nick("alice".into())).await?.is_none());
        Ok::<_, anyhow::Error>(())
    }
    .await;

    hub.stop().await;
    result.unwrap();
}
