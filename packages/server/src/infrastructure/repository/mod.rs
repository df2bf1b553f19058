//! Repository 実装
//!
//! - `inmemory`: HashMap をインメモリ DB として使う実装
//! - `ledger`: 終了済みルーム ID の記録（インメモリ / JSON ファイル）

pub mod inmemory;
pub mod ledger;

pub use inmemory::{InMemoryRoomRepository, InMemorySessionRepository};
pub use ledger::{InMemoryEndedLedger, JsonFileEndedLedger};
