//! UseCase 層
//!
//! ドメインモデルと Repository / MessagePusher を組み合わせ、アプリケーションの操作を実装します。
//! 同じルームへの操作はルームのロック内で完結し、イベントはロックを保持したまま送信キューへ積まれます。

pub mod create_room;
pub mod end_room;
pub mod error;
pub mod expire_rooms;
pub mod get_room;
pub mod join_room;
pub mod leave_room;
mod notify;
pub mod playback_command;
pub mod send_message;
pub mod sync_request;
pub mod validate_access;

#[cfg(test)]
mod test_support;

pub use create_room::CreateRoomUseCase;
pub use end_room::{EndRoomUseCase, EndedBy, SYSTEM_ENDER};
pub use error::{
    CreateRoomError, EndRoomError, GetRoomError, JoinRoomError, LeaveRoomError,
    PlaybackCommandError, SendMessageError, SyncRequestError,
};
pub use expire_rooms::ExpireRoomsUseCase;
pub use get_room::GetRoomUseCase;
pub use join_room::{JoinRoomInput, JoinRoomUseCase, JoinedRoom};
pub use leave_room::{LeaveOutcome, LeaveReason, LeaveRoomUseCase};
pub use playback_command::{PlaybackCommandUseCase, PlaybackOutcome};
pub use send_message::{SendMessageUseCase, SendOutcome};
pub use sync_request::SyncRequestUseCase;
pub use validate_access::{Admission, ValidateAccessUseCase};
