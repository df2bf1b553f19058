//! Shared fixtures for use case tests.

use std::sync::Arc;

use codepair_shared::time::ManualClock;
use tokio::sync::mpsc;

use crate::{
    domain::{
        ConnectionId, ConnectionIdFactory, MessagePusher, PushFrame, RoomPolicy, SessionToken,
        SessionValidator,
    },
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryEndedLedger, InMemoryRoomRepository, InMemorySessionRepository},
    },
};

use super::{CreateRoomUseCase, JoinRoomUseCase, join_room::JoinRoomInput};

pub(crate) const T0: i64 = 1_700_000_000_000;

pub(crate) struct Fixture {
    pub repository: Arc<InMemoryRoomRepository>,
    pub pusher: Arc<WebSocketMessagePusher>,
    pub sessions: Arc<SessionValidator>,
    pub clock: Arc<ManualClock>,
    pub policy: RoomPolicy,
}

/// A registered connection and the frames queued for it.
pub(crate) struct TestClient {
    pub id: ConnectionId,
    pub rx: mpsc::UnboundedReceiver<PushFrame>,
}

impl TestClient {
    /// Every event queued so far, decoded as JSON.
    pub fn drain(&mut self) -> Vec<serde_json::Value> {
        let mut events = Vec::new();
        while let Ok(frame) = self.rx.try_recv() {
            if let PushFrame::Text(text) = frame {
                events.push(serde_json::from_str(&text).unwrap());
            }
        }
        events
    }

    /// `type` of every queued event.
    pub fn drain_types(&mut self) -> Vec<String> {
        self.drain()
            .into_iter()
            .map(|event| event["type"].as_str().unwrap().to_string())
            .collect()
    }

    /// Whether a Close frame is queued.
    pub fn closed(&mut self) -> bool {
        while let Ok(frame) = self.rx.try_recv() {
            if frame == PushFrame::Close {
                return true;
            }
        }
        false
    }
}

impl Fixture {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new(T0));
        Self {
            repository: Arc::new(InMemoryRoomRepository::new(Arc::new(
                InMemoryEndedLedger::new(),
            ))),
            pusher: Arc::new(WebSocketMessagePusher::new()),
            sessions: Arc::new(SessionValidator::new(
                Arc::new(InMemorySessionRepository::new()),
                clock.clone(),
            )),
            clock,
            policy: RoomPolicy::default(),
        }
    }

    pub async fn connect(&self) -> TestClient {
        let id = ConnectionIdFactory::generate();
        let (tx, rx) = mpsc::unbounded_channel();
        self.pusher.register_client(id.clone(), tx).await;
        TestClient { id, rx }
    }

    pub fn create_usecase(&self) -> CreateRoomUseCase {
        CreateRoomUseCase::new(
            self.repository.clone(),
            self.sessions.clone(),
            self.clock.clone(),
            self.policy.clone(),
        )
    }

    pub fn join_usecase(&self) -> JoinRoomUseCase {
        JoinRoomUseCase::new(
            self.repository.clone(),
            self.pusher.clone(),
            self.sessions.clone(),
            self.clock.clone(),
        )
    }

    /// Create a room and return the creator token.
    pub async fn create_room(&self) -> SessionToken {
        self.create_usecase()
            .execute("creator-identity".to_string())
            .await
            .unwrap()
    }

    /// Join `client` to the room `room` belongs to, with `token` or as a new guest.
    pub async fn join(
        &self,
        client: &TestClient,
        room: &SessionToken,
        token: Option<&SessionToken>,
        name: &str,
    ) -> SessionToken {
        let joined = self
            .join_usecase()
            .execute(JoinRoomInput {
                connection_id: client.id.clone(),
                room_id: room.room_id.as_str().to_string(),
                token: token.map(|t| t.token.as_str().to_string()),
                name: name.to_string(),
            })
            .await
            .unwrap();
        joined.session
    }
}
