use std::time::Duration;

use tetris_core::{GameState, Status};
use zenoh_duel::{
    DuelConfig, DuelLink, DuelServer, LinkEvent, PlayerId, RoomId, ServerCommand, ServerMessage, TransportState,
};

fn test_config(prefix: &str) -> DuelConfig {
    let mut zenoh_config = zenoh::Config::default();
    zenoh_config
        .insert_json5("scouting/multicast/enabled", "false")
        .unwrap();
    DuelConfig::default()
        .with_zenoh_config(zenoh_config)
        .with_keyexpr_prefix(prefix.to_string())
        .with_sample_interval(Duration::from_millis(50))
}

/// Next server message, skipping sampling ticks and transport changes
async fn next_message(link: &mut DuelLink) -> ServerMessage {
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), link.next_event())
            .await
            .expect("no server message in time")
            .expect("link failed");
        if let LinkEvent::Message(message) = event {
            return message;
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn duel_join_relay_and_start() {
    let config = test_config("test/duel/relay");
    let session = zenoh::open(config.zenoh_config.clone()).await.unwrap();

    let server = DuelServer::new(session.clone(), config.clone()).await.unwrap();
    let stop = server.sender();
    let server_handle = tokio::spawn(server.run());

    let room = RoomId::generate();
    let a = PlayerId::from_name("alice".to_string()).unwrap();
    let b = PlayerId::from_name("bob".to_string()).unwrap();
    let mut link_a = DuelLink::new(session.clone(), config.clone(), room.clone(), a);
    let mut link_b = DuelLink::new(session.clone(), config.clone(), room, b);

    // Join is answered with both (still unknown) boards
    link_a.listen().await.unwrap();
    assert_eq!(next_message(&mut link_a).await, ServerMessage::Update { own: None, other: None });
    link_b.listen().await.unwrap();
    assert_eq!(next_message(&mut link_b).await, ServerMessage::Update { own: None, other: None });

    // A's first sample reaches B as the opponent board
    let mut state = GameState::new(8, 16, 3);
    state.transition(Status::Starting).unwrap();
    assert!(link_a.send_sample(&state).await.unwrap());
    assert!(!link_a.send_sample(&state).await.unwrap());
    match next_message(&mut link_b).await {
        ServerMessage::Update { own: None, other: Some(snapshot) } => {
            assert_eq!(snapshot.status, Status::Starting);
            assert_eq!(snapshot.grid.len(), 4);
        }
        other => panic!("unexpected message {:?}", other),
    }

    // Start is only confirmed once both players asked for it
    link_a.start().await.unwrap();
    link_b.start().await.unwrap();
    assert_eq!(next_message(&mut link_a).await, ServerMessage::Start);
    assert_eq!(next_message(&mut link_b).await, ServerMessage::Start);

    link_a.pause().await.unwrap();
    assert_eq!(next_message(&mut link_a).await, ServerMessage::Pause);
    assert_eq!(next_message(&mut link_b).await, ServerMessage::Pause);

    link_a.stop().await.unwrap();
    assert!(!link_a.is_listening());
    link_b.stop().await.unwrap();

    stop.send(ServerCommand::Stop).unwrap();
    tokio::time::timeout(Duration::from_secs(5), server_handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    session.close().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn duel_link_sees_server_presence() {
    let config = test_config("test/duel/presence");
    let session = zenoh::open(config.zenoh_config.clone()).await.unwrap();

    let server = DuelServer::new(session.clone(), config.clone()).await.unwrap();
    let stop = server.sender();
    let server_handle = tokio::spawn(server.run());

    let mut link = DuelLink::new(
        session.clone(),
        config.clone(),
        RoomId::generate(),
        PlayerId::generate(),
    );
    link.listen().await.unwrap();

    let mut transport = Vec::new();
    while transport.len() < 2 {
        let event = tokio::time::timeout(Duration::from_secs(5), link.next_event())
            .await
            .expect("no transport event in time")
            .unwrap();
        if let LinkEvent::Transport(state) = event {
            transport.push(state);
            if state == TransportState::Connected {
                stop.send(ServerCommand::Stop).unwrap();
            }
        }
    }
    assert_eq!(transport, vec![TransportState::Connected, TransportState::Disconnected]);

    server_handle.await.unwrap().unwrap();
    link.stop().await.unwrap();
    session.close().await.unwrap();
}
