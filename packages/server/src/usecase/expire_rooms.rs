//! UseCase: 期限切れルームの終了（バックグラウンドの reaper）

use std::{sync::Arc, time::Duration};

use codepair_shared::time::Clock;

use crate::domain::{
    MessagePusher, RoomId, RoomPolicy, RoomRepository, SessionValidator, Timestamp,
    policy::duration_millis,
};

use super::end_room::{EndedBy, terminate_room};

pub struct ExpireRoomsUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    sessions: Arc<SessionValidator>,
    clock: Arc<dyn Clock>,
    policy: RoomPolicy,
}

impl ExpireRoomsUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        sessions: Arc<SessionValidator>,
        clock: Arc<dyn Clock>,
        policy: RoomPolicy,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            sessions,
            clock,
            policy,
        }
    }

    /// End every room older than the room TTL. Returns the ended ids.
    pub async fn execute(&self) -> Vec<RoomId> {
        let now = Timestamp::new(self.clock.now_millis());
        let ttl = duration_millis(self.policy.room_ttl);
        let mut ended = Vec::new();

        for handle in self.repository.list().await {
            let room_id = {
                let room = handle.lock().await;
                if room.ended || !room.is_expired(now, ttl) {
                    continue;
                }
                room.id.clone()
            };

            match terminate_room(
                &handle,
                self.repository.as_ref(),
                self.message_pusher.as_ref(),
                &self.sessions,
                EndedBy::System,
                now,
            )
            .await
            {
                Ok(_) => ended.push(room_id),
                Err(e) => tracing::error!("Failed to record expiry of room '{}': {}", room_id, e),
            }
        }

        if !ended.is_empty() {
            tracing::info!("Reaper ended {} expired room(s)", ended.len());
        }
        ended
    }

    /// Run [`ExpireRoomsUseCase::execute`] every `interval` until the task is aborted.
    pub fn spawn_reaper(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.execute().await;
            }
        })
    }
}
