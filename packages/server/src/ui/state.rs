//! Shared application state.

use std::sync::Arc;

use codepair_shared::time::{Clock, SystemClock};

use crate::{
    domain::{EndedRoomLedger, MessagePusher, RoomPolicy, RoomRepository, SessionValidator},
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryRoomRepository, InMemorySessionRepository},
    },
    usecase::{
        CreateRoomUseCase, EndRoomUseCase, ExpireRoomsUseCase, GetRoomUseCase, JoinRoomUseCase,
        LeaveRoomUseCase, PlaybackCommandUseCase, SendMessageUseCase, SyncRequestUseCase,
    },
};

/// Shared application state
pub struct AppState {
    pub policy: RoomPolicy,
    /// MessagePusher（メッセージ通知の抽象化）
    pub message_pusher: Arc<dyn MessagePusher>,
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    pub get_room_usecase: Arc<GetRoomUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    pub send_message_usecase: Arc<SendMessageUseCase>,
    pub playback_command_usecase: Arc<PlaybackCommandUseCase>,
    pub sync_request_usecase: Arc<SyncRequestUseCase>,
    pub end_room_usecase: Arc<EndRoomUseCase>,
    pub expire_rooms_usecase: Arc<ExpireRoomsUseCase>,
}

impl AppState {
    /// Wire every use case onto the given components.
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        sessions: Arc<SessionValidator>,
        clock: Arc<dyn Clock>,
        policy: RoomPolicy,
    ) -> Self {
        Self {
            create_room_usecase: Arc::new(CreateRoomUseCase::new(
                repository.clone(),
                sessions.clone(),
                clock.clone(),
                policy.clone(),
            )),
            get_room_usecase: Arc::new(GetRoomUseCase::new(repository.clone())),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                sessions.clone(),
                clock.clone(),
            )),
            leave_room_usecase: Arc::new(LeaveRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock.clone(),
                policy.clone(),
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            playback_command_usecase: Arc::new(PlaybackCommandUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            sync_request_usecase: Arc::new(SyncRequestUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            end_room_usecase: Arc::new(EndRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                sessions.clone(),
                clock.clone(),
            )),
            expire_rooms_usecase: Arc::new(ExpireRoomsUseCase::new(
                repository,
                message_pusher.clone(),
                sessions,
                clock,
                policy.clone(),
            )),
            message_pusher,
            policy,
        }
    }

    /// In-memory stores, WebSocket pusher and the system clock.
    pub fn in_memory(policy: RoomPolicy, ledger: Arc<dyn EndedRoomLedger>) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let repository = Arc::new(InMemoryRoomRepository::new(ledger));
        let sessions = Arc::new(SessionValidator::new(
            Arc::new(InMemorySessionRepository::new()),
            clock.clone(),
        ));
        Self::new(
            repository,
            Arc::new(WebSocketMessagePusher::new()),
            sessions,
            clock,
            policy,
        )
    }
}
