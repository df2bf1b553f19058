//! UseCase: ルーム詳細取得（外部連携からのルーム検証用）

use std::sync::Arc;

use crate::domain::{RoomId, RoomRepository, RoomSnapshot};

use super::error::GetRoomError;

pub struct GetRoomUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, room_id: String) -> Result<RoomSnapshot, GetRoomError> {
        let room_id = RoomId::new(room_id).map_err(|_| GetRoomError::NotFound)?;

        match self.repository.find(&room_id).await {
            Some(handle) => {
                let room = handle.lock().await;
                if room.ended {
                    return Err(GetRoomError::Ended);
                }
                Ok(room.snapshot())
            }
            None if self.repository.is_ended(&room_id).await => Err(GetRoomError::Ended),
            None => Err(GetRoomError::NotFound),
        }
    }
}
