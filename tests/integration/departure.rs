use crate::*;

/// Kicked sessions are announced with the disconnect flag, normal quits without.
#[tokio::test]
async fn test_departure_notices() {
    let hub = TestHub::start(HubConfig::default());

    let result = async {
        let mut watcher = hub.join("watcher", 0).await?;
        let kicked = hub.join("kicked", 0).await?;
        let leaver = hub.join("leaver", 0).await?;
        drain(&mut watcher.rx);

        hub.handle.disconnect(kicked.sid, QuitReason::Kicked).await?;
        hub.handle.disconnect(leaver.sid, QuitReason::Disconnected).await?;

        let notices: Vec<Arc<Message>> = drain(&mut watcher.rx);
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].command(), Command::IQUI);
        assert_eq!(
            notices[0].arguments(),
            [kicked.sid.to_string().as_str(), QUIT_FLAG_DISCONNECT]
        );
        assert_eq!(notices[1].arguments(), [leaver.sid.to_string().as_str()]);
        assert_eq!(notices[1].to_string(), format!("IQUI {}\n", leaver.sid));
        Ok::<_, anyhow::Error>(())
    }
    .await;

    hub.stop().await;
    result.unwrap();
}

/// One dead recipient does not stop a broadcast reaching the rest.
#[tokio::test]
async fn test_broadcast_is_best_effort() {
    let hub = TestHub::start(HubConfig::default());

    let result = async {
        let mut a = hub.join("a", 0).await?;
        let b = hub.join("b", 0).await?;
        let mut c = hub.join("c", 0).await?;
        drain(&mut a.rx);
        drain(&mut c.rx);

        // b's connection task is gone but the session is still listed.
        drop(b.rx);

        let delivered = hub
            .handle
            .broadcast(Arc::new(Message::new(Command::ISTA)))
            .await?;
        assert_eq!(delivered, 2);
        assert_eq!(drain(&mut a.rx).len(), 1);
        assert_eq!(drain(&mut c.rx).len(), 1);
        Ok::<_, anyhow::Error>(())
    }
    .await;

    hub.stop().await;
    result.unwrap();
}
