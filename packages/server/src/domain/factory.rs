//! Identifier factories.

use uuid::Uuid;

use super::value_object::{ConnectionId, Identity, RoomId, TokenValue};

pub struct RoomIdFactory;

impl RoomIdFactory {
    pub fn generate() -> RoomId {
        RoomId::from(Uuid::new_v4())
    }
}

pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    pub fn generate() -> ConnectionId {
        ConnectionId::from(Uuid::new_v4())
    }
}

/// Identities for guests who join without a token.
pub struct GuestIdentityFactory;

impl GuestIdentityFactory {
    pub fn generate() -> Identity {
        Identity::from(Uuid::new_v4())
    }
}

pub struct TokenFactory;

impl TokenFactory {
    pub fn generate() -> TokenValue {
        TokenValue::from(Uuid::new_v4())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        // テスト項目: 生成される ID は毎回異なる
        // given (前提条件) / when (操作):
        let first = RoomIdFactory::generate();
        let second = RoomIdFactory::generate();

        // then (期待する結果):
        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 36);
    }
}
