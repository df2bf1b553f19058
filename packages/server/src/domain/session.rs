//! Session tokens and the session validator.
//!
//! A token binds a holder identity to one room with a role. It is issued once
//! per client per room (on create for the creator, on a token-less join for a
//! guest) and checked on every reconnect and on protected operations.

use std::sync::Arc;

use codepair_shared::time::Clock;

use super::{
    error::{AccessError, RepositoryError},
    factory::TokenFactory,
    repository::SessionRepository,
    value_object::{Identity, Role, RoomId, Timestamp, TokenValue},
};

/// Fixed token lifetime: 24 hours.
pub const SESSION_TTL_MILLIS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub token: TokenValue,
    pub room_id: RoomId,
    pub holder: Identity,
    pub role: Role,
    pub issued_at: Timestamp,
}

impl SessionToken {
    pub fn new(
        token: TokenValue,
        room_id: RoomId,
        holder: Identity,
        role: Role,
        issued_at: Timestamp,
    ) -> Self {
        Self {
            token,
            room_id,
            holder,
            role,
            issued_at,
        }
    }

    pub fn expires_at(&self) -> Timestamp {
        Timestamp::new(self.issued_at.value().saturating_add(SESSION_TTL_MILLIS))
    }

    /// A token is valid while `now - issued_at <= TTL`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now.millis_since(self.issued_at) > SESSION_TTL_MILLIS
    }

    /// Check this token against the room a connection asks for.
    ///
    /// Checks run in order: ended room, room mismatch, expiry.
    pub fn check(
        &self,
        requested: &RoomId,
        room_ended: bool,
        now: Timestamp,
    ) -> Result<Role, AccessError> {
        if room_ended {
            return Err(AccessError::RoomEnded);
        }
        if &self.room_id != requested {
            return Err(AccessError::RoomMismatch);
        }
        if self.is_expired(now) {
            return Err(AccessError::Expired);
        }
        Ok(self.role)
    }
}

/// Issues and validates session tokens.
pub struct SessionValidator {
    sessions: Arc<dyn SessionRepository>,
    clock: Arc<dyn Clock>,
}

impl SessionValidator {
    pub fn new(sessions: Arc<dyn SessionRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { sessions, clock }
    }

    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }

    pub async fn issue(
        &self,
        room_id: RoomId,
        holder: Identity,
        role: Role,
    ) -> Result<SessionToken, RepositoryError> {
        let token = SessionToken::new(TokenFactory::generate(), room_id, holder, role, self.now());
        self.sessions.save(token.clone()).await?;
        tracing::debug!(
            "Issued {} token for room '{}' to '{}'",
            token.role.as_str(),
            token.room_id,
            token.holder
        );
        Ok(token)
    }

    /// Validate a presented token string for `requested`.
    pub async fn validate(
        &self,
        token: &str,
        requested: &RoomId,
        room_ended: bool,
    ) -> Result<SessionToken, AccessError> {
        let session = match self.sessions.find(token).await {
            Some(session) => session,
            // An ended room's tokens are revoked, so the room state decides first.
            None if room_ended => return Err(AccessError::RoomEnded),
            None => return Err(AccessError::InvalidToken),
        };
        session.check(requested, room_ended, self.now())?;
        Ok(session)
    }

    /// Revoke every token of an ended room.
    pub async fn revoke_room(&self, room_id: &RoomId) {
        let revoked = self.sessions.remove_room(room_id).await;
        tracing::debug!("Revoked {} token(s) of room '{}'", revoked, room_id);
    }
}
