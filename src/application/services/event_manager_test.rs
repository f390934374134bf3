#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use parking_lot::Mutex;
    use serde_json::json;
    use tokio::sync::{mpsc, oneshot};
    use tokio_test::{assert_pending, assert_ready};

    use crate::application::Client;
    use crate::application::events::{
        Event, GuildMessageCreate, GuildVoiceJoin, GuildVoiceLeave, GuildVoiceMove, InteractionCreate,
        RawEvent,
    };
    use crate::application::services::event_manager::listener_fn;
    use crate::domain::entities::{
        ChannelId, GuildId, InteractionResponse, InteractionResponseType, UserId,
    };
    use crate::domain::errors::InteractionError;
    use crate::domain::intents::GatewayIntents;
    use crate::domain::ports::mocks::MockGateway;
    use crate::domain::ports::GatewayCommand;
    use crate::infrastructure::config::ClientConfig;

    fn sync_client() -> Client {
        Client::builder()
            .with_config(ClientConfig::default().with_async_events(false))
            .build()
    }

    fn recording(client: &Client) -> Arc<Mutex<Vec<&'static str>>> {
        let names = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&names);
        client.add_event_listeners([listener_fn(move |event: &Event| sink.lock().push(event.name()))]);
        names
    }

    fn bytes(value: &serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(value).unwrap()
    }

    fn user(id: u64, name: &str) -> serde_json::Value {
        json!({ "id": id.to_string(), "username": name })
    }

    fn message(id: u64, content: &str) -> Vec<u8> {
        bytes(&json!({
            "id": id.to_string(),
            "channel_id": "20",
            "guild_id": "10",
            "author": user(2, "bob"),
            "content": content,
        }))
    }

    fn voice_state(user_id: u64, channel_id: Option<u64>) -> Vec<u8> {
        bytes(&json!({
            "guild_id": "10",
            "channel_id": channel_id.map(|id| id.to_string()),
            "user_id": user_id.to_string(),
            "session_id": "s",
        }))
    }

    fn ready(guild_ids: &[u64]) -> Vec<u8> {
        let guilds: Vec<_> = guild_ids
            .iter()
            .map(|id| json!({ "id": id.to_string(), "unavailable": true }))
            .collect();
        bytes(&json!({
            "v": 10,
            "user": user(1, "me"),
            "guilds": guilds,
            "session_id": "session",
        }))
    }

    fn guild(id: u64) -> Vec<u8> {
        bytes(&json!({
            "id": id.to_string(),
            "name": "guild",
            "owner_id": "1",
            "channels": [
                { "id": "20", "type": 0, "name": "general" },
                { "id": "30", "type": 2, "name": "lounge" },
                { "id": "31", "type": 2, "name": "stage" },
            ],
            "members": [ { "user": user(1, "me"), "roles": [] } ],
        }))
    }

    #[tokio::test]
    async fn test_panicking_listener_is_isolated() {
        for async_events in [false, true] {
            let client = Client::builder()
                .with_config(ClientConfig::default().with_async_events(async_events))
                .build();
            let (tx, mut rx) = mpsc::unbounded_channel();
            client.add_event_listeners([
                listener_fn(|_| panic!("listener failure")),
                listener_fn(move |event: &Event| {
                    let _ = tx.send(event.name());
                }),
            ]);

            client.handle_gateway("RESUMED", 1, b"null").await;
            client.handle_gateway("RESUMED", 2, b"null").await;

            for _ in 0..2 {
                let name = tokio::time::timeout(Duration::from_secs(1), rx.recv())
                    .await
                    .unwrap();
                assert_eq!(name, Some("Resumed"));
            }
        }
    }

    #[tokio::test]
    async fn test_ping_collector_yields_once() {
        let client = Client::builder().build();
        let (tx, mut rx) = mpsc::unbounded_channel();
        client.add_event_listeners([listener_fn(move |event: &Event| {
            if let Some(created) = event.downcast::<GuildMessageCreate>() {
                let _ = tx.send(created.message.content().to_string());
            }
        })]);

        let mut collector = client
            .collector::<GuildMessageCreate, _>(|event| event.message.content().contains("ping"));
        {
            let mut next = tokio_test::task::spawn(collector.next());
            assert_pending!(next.poll());
        }

        client.handle_gateway("MESSAGE_CREATE", 1, &message(100, "hello")).await;
        client.handle_gateway("MESSAGE_CREATE", 2, &message(101, "ping!")).await;

        let collected = tokio::time::timeout(Duration::from_secs(1), collector.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(collected.message.id().as_u64(), 101);
        assert_eq!(collected.guild_id, GuildId(10));

        // the generic listener saw both while the collector was waiting
        for expected in ["hello", "ping!"] {
            let content = tokio::time::timeout(Duration::from_secs(1), rx.recv())
                .await
                .unwrap();
            assert_eq!(content.as_deref(), Some(expected));
        }

        collector.teardown();
        client.handle_gateway("MESSAGE_CREATE", 3, &message(102, "ping")).await;
        assert!(collector.next().await.is_none());
        assert_eq!(client.event_manager().listener_count(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_after_teardown_does_not_block() {
        let client = sync_client();
        let mut collector = client.collector::<GuildMessageCreate, _>(|_| true);
        collector.teardown();

        let frame = message(100, "ping");
        let dispatch = client.handle_gateway("MESSAGE_CREATE", 1, &frame);
        tokio::time::timeout(Duration::from_secs(1), dispatch)
            .await
            .unwrap();
        assert!(collector.next().await.is_none());
    }

    #[tokio::test]
    async fn test_wait_for_deregisters() {
        let client = Client::builder().build();
        let waiter = {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .wait_for::<GuildMessageCreate, _>(|event| event.message.content() == "ping")
                    .await
            })
        };
        while client.event_manager().listener_count() == 0 {
            tokio::task::yield_now().await;
        }

        client.handle_gateway("MESSAGE_CREATE", 1, &message(100, "ping")).await;
        let event = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();

        assert!(event.is_some());
        assert_eq!(client.event_manager().listener_count(), 0);
    }

    #[tokio::test]
    async fn test_raw_event_precedes_typed_events() {
        let client = Client::builder()
            .with_config(
                ClientConfig::default()
                    .with_async_events(false)
                    .with_raw_events(true),
            )
            .build();
        let names = recording(&client);
        let raw = Arc::new(Mutex::new(None));
        {
            let raw = Arc::clone(&raw);
            client.add_event_listeners([listener_fn(move |event: &Event| {
                if let Some(event) = event.downcast::<RawEvent>() {
                    *raw.lock() = Some(event.event_type);
                }
            })]);
        }

        client.handle_gateway("MESSAGE_CREATE", 1, &message(100, "hi")).await;
        client.handle_gateway("SOMETHING_NEW", 2, b"{}").await;

        assert_eq!(
            *names.lock(),
            vec!["RawEvent", "MessageCreate", "GuildMessageCreate", "RawEvent"]
        );
        assert_eq!(raw.lock().as_deref(), Some("SOMETHING_NEW"));
    }

    #[tokio::test]
    async fn test_undecodable_frame_is_dropped() {
        let client = sync_client();
        let names = recording(&client);

        client.handle_gateway("MESSAGE_CREATE", 1, b"{\"id\":").await;
        client.handle_gateway("UNKNOWN_EVENT", 2, b"{}").await;

        assert!(names.lock().is_empty());
    }

    #[tokio::test]
    async fn test_http_ping_is_answered_without_dispatch() {
        let client = sync_client();
        let names = recording(&client);
        let (reply, response) = oneshot::channel();

        let ping = bytes(&json!({ "id": "1", "application_id": "2", "type": 1 }));
        client.handle_http(reply, &ping).await;

        let response = response.await.unwrap();
        assert_eq!(response.kind, InteractionResponseType::Pong);
        assert!(names.lock().is_empty());
    }

    #[tokio::test]
    async fn test_http_interaction_carries_responder() {
        let client = sync_client();
        let replied = Arc::new(AtomicUsize::new(0));
        {
            let replied = Arc::clone(&replied);
            client.add_event_listeners([listener_fn(move |event: &Event| {
                if let Some(create) = event.downcast::<InteractionCreate>() {
                    let first = create.respond(InteractionResponse::message("hi"));
                    let second = create.respond(InteractionResponse::pong());
                    if first.is_ok() && second == Err(InteractionError::AlreadyReplied) {
                        replied.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })]);
        }
        let (reply, response) = oneshot::channel();
        let command = bytes(&json!({
            "id": "1",
            "application_id": "2",
            "type": 2,
            "user": user(5, "eve"),
            "data": { "name": "hello" },
        }));

        client.handle_http(reply, &command).await;

        assert_eq!(replied.load(Ordering::SeqCst), 1);
        assert_eq!(
            response.await.unwrap().kind,
            InteractionResponseType::ChannelMessageWithSource
        );
    }

    #[tokio::test]
    async fn test_guild_create_readiness() {
        let client = sync_client();
        let names = recording(&client);

        client.handle_gateway("READY", 1, &ready(&[10, 11])).await;
        client.handle_gateway("GUILD_CREATE", 2, &guild(10)).await;
        assert_eq!(client.caches().unready_guild_count(), 1);
        client.handle_gateway("GUILD_CREATE", 3, &guild(11)).await;
        client.handle_gateway("GUILD_CREATE", 4, &guild(12)).await;

        assert_eq!(
            *names.lock(),
            vec!["Ready", "GuildReady", "GuildReady", "GuildsReady", "GuildJoin"]
        );
        assert_eq!(client.self_user_id(), Some(UserId(1)));
        // the owner passes the default member policy
        assert!(client.caches().members().get(GuildId(10), UserId(1)).is_some());
    }

    #[tokio::test]
    async fn test_guild_unavailable_then_available() {
        let client = sync_client();
        let names = recording(&client);

        client.handle_gateway("GUILD_CREATE", 1, &guild(10)).await;
        let outage = bytes(&json!({ "id": "10", "unavailable": true }));
        client.handle_gateway("GUILD_DELETE", 2, &outage).await;
        assert!(client.caches().guilds().get(&GuildId(10)).is_none());

        client.handle_gateway("GUILD_CREATE", 3, &guild(10)).await;

        assert_eq!(
            *names.lock(),
            vec!["GuildJoin", "GuildUnavailable", "GuildAvailable"]
        );
    }

    #[tokio::test]
    async fn test_voice_join_move_leave() {
        let client = sync_client();
        client.handle_gateway("GUILD_CREATE", 1, &guild(10)).await;
        let names = recording(&client);

        let connected = |channel_id: u64| {
            client
                .caches()
                .channels()
                .get(&ChannelId(channel_id))
                .and_then(|channel| channel.as_audio_channel().map(|voice| voice.connected_member_ids().clone()))
                .unwrap_or_default()
        };

        client.handle_gateway("VOICE_STATE_UPDATE", 2, &voice_state(7, Some(30))).await;
        assert!(connected(30).contains(&UserId(7)));
        // a user in voice passes the default member policy
        assert!(client.caches().voice_states().get(GuildId(10), UserId(7)).is_some());

        client.handle_gateway("VOICE_STATE_UPDATE", 3, &voice_state(7, Some(31))).await;
        assert!(!connected(30).contains(&UserId(7)));
        assert!(connected(31).contains(&UserId(7)));

        client.handle_gateway("VOICE_STATE_UPDATE", 4, &voice_state(7, None)).await;
        assert!(connected(31).is_empty());
        assert!(client.caches().voice_states().get(GuildId(10), UserId(7)).is_none());

        assert_eq!(
            *names.lock(),
            vec![
                "GuildVoiceStateUpdate",
                "GuildVoiceJoin",
                "GuildVoiceStateUpdate",
                "GuildVoiceMove",
                "GuildVoiceStateUpdate",
                "GuildVoiceLeave",
            ]
        );
    }

    #[tokio::test]
    async fn test_voice_events_carry_old_state() {
        let client = sync_client();
        client.handle_gateway("GUILD_CREATE", 1, &guild(10)).await;
        let moves = Arc::new(Mutex::new(Vec::new()));
        {
            let moves = Arc::clone(&moves);
            client.add_event_listeners([listener_fn(move |event: &Event| {
                if let Some(join) = event.downcast::<GuildVoiceJoin>() {
                    moves.lock().push((None, join.voice_state.channel_id()));
                } else if let Some(moved) = event.downcast::<GuildVoiceMove>() {
                    moves
                        .lock()
                        .push((moved.old_voice_state.channel_id(), moved.voice_state.channel_id()));
                } else if let Some(left) = event.downcast::<GuildVoiceLeave>() {
                    moves
                        .lock()
                        .push((left.old_voice_state.channel_id(), left.voice_state.channel_id()));
                }
            })]);
        }

        client.handle_gateway("VOICE_STATE_UPDATE", 2, &voice_state(7, Some(30))).await;
        client.handle_gateway("VOICE_STATE_UPDATE", 3, &voice_state(7, Some(31))).await;
        client.handle_gateway("VOICE_STATE_UPDATE", 4, &voice_state(7, None)).await;

        assert_eq!(
            *moves.lock(),
            vec![
                (None, Some(ChannelId(30))),
                (Some(ChannelId(30)), Some(ChannelId(31))),
                (Some(ChannelId(31)), None),
            ]
        );
    }

    #[tokio::test]
    async fn test_members_chunk_completes_filtered_request() {
        let gateway = Arc::new(MockGateway::new(
            GatewayIntents::non_privileged().with_members(),
        ));
        let client = Client::builder()
            .with_config(ClientConfig::default().with_async_events(false))
            .with_gateway(gateway.clone())
            .build();

        let (mut receiver, cancel) = client
            .chunking()
            .request_members_with_filter_chan(&client, GuildId(10), |member| {
                member.user().username() != "skip"
            })
            .await
            .unwrap();
        assert!(matches!(
            gateway.sent().first(),
            Some(GatewayCommand::RequestGuildMembers(_))
        ));

        let chunk = |index: u32, members: serde_json::Value| {
            bytes(&json!({
                "guild_id": "10",
                "members": members,
                "chunk_index": index,
                "chunk_count": 2,
                "nonce": cancel.nonce(),
            }))
        };
        client
            .handle_gateway(
                "GUILD_MEMBERS_CHUNK",
                1,
                &chunk(0, json!([{ "user": user(3, "ann") }, { "user": user(4, "skip") }])),
            )
            .await;
        client
            .handle_gateway("GUILD_MEMBERS_CHUNK", 2, &chunk(1, json!([{ "user": user(5, "cid") }])))
            .await;

        let mut received = Vec::new();
        while let Some(member) = receiver.recv().await {
            received.push(member.user_id());
        }
        assert_eq!(received, vec![UserId(3), UserId(5)]);
        assert_eq!(client.chunking().pending_requests(), 0);
    }

    #[tokio::test]
    async fn test_collector_backpressure_is_local() {
        let client = Client::builder().build();
        let mut collector = client.collector::<GuildMessageCreate, _>(|_| true);
        let seen = Arc::new(AtomicUsize::new(0));
        {
            let seen = Arc::clone(&seen);
            client.add_event_listeners([listener_fn(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            })]);
        }

        // the collector buffers one event and never gets read
        for id in 0..3 {
            client.handle_gateway("MESSAGE_CREATE", id, &message(100 + id, "x")).await;
        }
        while seen.load(Ordering::SeqCst) < 6 {
            tokio::task::yield_now().await;
        }

        let mut next = tokio_test::task::spawn(collector.next());
        let first = assert_ready!(next.poll());
        assert_eq!(first.map(|event| event.guild_id), Some(GuildId(10)));
    }

    #[tokio::test]
    async fn test_unread_collector_does_not_block_sync_dispatch() {
        let client = sync_client();
        let names = recording(&client);
        let mut collector = client.collector::<GuildMessageCreate, _>(|_| true);

        for id in 0..3 {
            let frame = message(100 + id, "x");
            tokio::time::timeout(
                Duration::from_secs(1),
                client.handle_gateway("MESSAGE_CREATE", id, &frame),
            )
            .await
            .unwrap();
        }
        assert_eq!(names.lock().len(), 6);

        let mut ids = Vec::new();
        for _ in 0..3 {
            let event = tokio::time::timeout(Duration::from_secs(1), collector.next())
                .await
                .unwrap()
                .unwrap();
            ids.push(event.message.id().as_u64());
        }
        assert_eq!(ids, [100, 101, 102]);
    }
}
