//! 終了済みルーム ID の記録
//!
//! - `InMemoryEndedLedger`: プロセス内のみで保持
//! - `JsonFileEndedLedger`: JSON ファイルに永続化し、再起動後も終了状態を維持

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::domain::{EndedRoomLedger, RepositoryError, RoomId};

#[derive(Default)]
pub struct InMemoryEndedLedger {
    ended: RwLock<HashSet<RoomId>>,
}

impl InMemoryEndedLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EndedRoomLedger for InMemoryEndedLedger {
    async fn record(&self, room_id: &RoomId) -> Result<(), RepositoryError> {
        let mut ended = self.ended.write().await;
        ended.insert(room_id.clone());
        Ok(())
    }

    async fn contains(&self, room_id: &RoomId) -> bool {
        let ended = self.ended.read().await;
        ended.contains(room_id)
    }
}

/// ファイル上の表現
#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    ended_rooms: Vec<RoomId>,
}

/// JSON ファイルに永続化する EndedRoomLedger
///
/// 記録のたびにファイル全体を一時ファイルへ書き出し、rename で置き換えます。
pub struct JsonFileEndedLedger {
    path: PathBuf,
    ended: RwLock<HashSet<RoomId>>,
}

impl JsonFileEndedLedger {
    /// ファイルを読み込んで開く（存在しなければ空の記録から始める）
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let path = path.as_ref().to_path_buf();
        let ended = match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let file: LedgerFile = serde_json::from_str(&content)
                    .map_err(|e| RepositoryError::Persistence(e.to_string()))?;
                file.ended_rooms.into_iter().collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(RepositoryError::Persistence(e.to_string())),
        };

        tracing::info!(
            "Loaded {} ended room(s) from '{}'",
            ended.len(),
            path.display()
        );
        Ok(Self {
            path,
            ended: RwLock::new(ended),
        })
    }

    async fn flush(&self, ended: &HashSet<RoomId>) -> Result<(), RepositoryError> {
        let mut ended_rooms: Vec<RoomId> = ended.iter().cloned().collect();
        ended_rooms.sort();
        let content = serde_json::to_string_pretty(&LedgerFile { ended_rooms })
            .map_err(|e| RepositoryError::Persistence(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| RepositoryError::Persistence(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| RepositoryError::Persistence(e.to_string()))
    }
}

#[async_trait]
impl EndedRoomLedger for JsonFileEndedLedger {
    async fn record(&self, room_id: &RoomId) -> Result<(), RepositoryError> {
        let mut ended = self.ended.write().await;
        if !ended.insert(room_id.clone()) {
            return Ok(());
        }
        self.flush(&ended).await
    }

    async fn contains(&self, room_id: &RoomId) -> bool {
        let ended = self.ended.read().await;
        ended.contains(room_id)
    }
}
