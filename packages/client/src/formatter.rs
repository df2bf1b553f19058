//! Message formatting utilities for client display.

use codepair_server::infrastructure::dto::websocket::{
    ChatMessageDto, ParticipantInfo, PlaybackStateDto, PlaybackStatusDto, RejectReasonDto,
    RoleDto,
};
use codepair_shared::time::timestamp_to_jst_rfc3339;

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";

fn format_time(timestamp_millis: i64) -> String {
    timestamp_to_jst_rfc3339(timestamp_millis).unwrap_or_else(|| timestamp_millis.to_string())
}

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the participant list
    ///
    /// # Arguments
    ///
    /// * `participants` - Participants in join order
    /// * `my_connection_id` - This client's connection id (to mark as "me"), if known
    pub fn format_participants(
        participants: &[ParticipantInfo],
        my_connection_id: Option<&str>,
    ) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\n", RULE));
        output.push_str("Participants:\n");

        if participants.is_empty() {
            output.push_str("(No participants)\n");
        } else {
            for participant in participants {
                let me_suffix = if Some(participant.connection_id.as_str()) == my_connection_id {
                    " (me)"
                } else {
                    ""
                };
                let role_suffix = match participant.role {
                    RoleDto::Creator => " [creator]",
                    RoleDto::Guest => "",
                };
                let away_suffix = if participant.connected {
                    ""
                } else {
                    " (reconnecting)"
                };
                output.push_str(&format!(
                    "{}{}{}{} - entered at {}\n",
                    participant.name,
                    role_suffix,
                    me_suffix,
                    away_suffix,
                    format_time(participant.joined_at)
                ));
            }
        }

        output.push_str(&format!("{}\n", RULE));
        output
    }

    /// Format a chat message
    pub fn format_chat_message(message: &ChatMessageDto) -> String {
        format!(
            "\n\n{rule}\n@{}: {}\nsent at {}\n{rule}\n",
            message.sender_name,
            message.text,
            format_time(message.timestamp),
            rule = THIN_RULE
        )
    }

    /// Format replayed history, oldest first
    pub fn format_history(messages: &[ChatMessageDto]) -> String {
        let mut output = format!("\n-- {} recent message(s) --\n", messages.len());
        for message in messages {
            output.push_str(&format!(
                "[{}] @{}: {}\n",
                format_time(message.timestamp),
                message.sender_name,
                message.text
            ));
        }
        output
    }

    pub fn format_acked(message_id: &str) -> String {
        format!("sent ({})\n", message_id)
    }

    /// Format a playback state change
    ///
    /// # Arguments
    ///
    /// * `state` - The received playback state
    /// * `authoritative` - `false` for a relayed command of a non-leader
    /// * `issued_by` - Display name of the issuer, if any
    pub fn format_playback(
        state: &PlaybackStateDto,
        authoritative: bool,
        issued_by: Option<&str>,
    ) -> String {
        let status = match state.status {
            PlaybackStatusDto::Stopped => "stopped",
            PlaybackStatusDto::Playing => "playing",
            PlaybackStatusDto::Paused => "paused",
        };
        let video = state.video_id.as_deref().unwrap_or("(no video)");
        let kind = if authoritative { "" } else { " (advisory)" };
        let by = issued_by
            .map(|name| format!(" by {}", name))
            .unwrap_or_default();
        format!(
            "\n▶ {} {} at {:.1}s{}{} [v{}]\n",
            video, status, state.time, by, kind, state.version
        )
    }

    pub fn format_session_issued(role: RoleDto, expires_at: i64) -> String {
        let role = match role {
            RoleDto::Creator => "creator",
            RoleDto::Guest => "guest",
        };
        format!(
            "\nJoined as {} (session valid until {})\n",
            role,
            format_time(expires_at)
        )
    }

    pub fn format_room_ended(ended_by_name: &str) -> String {
        format!("\n{}\nThe room was ended by {}.\n{}\n", RULE, ended_by_name, RULE)
    }

    pub fn format_access_rejected(reason: RejectReasonDto, detail: &str) -> String {
        let note = if reason.is_permanent() {
            " This room cannot be joined again."
        } else {
            ""
        };
        format!("\n✗ Access rejected: {}.{}\n", detail, note)
    }

    pub fn format_error(message: &str) -> String {
        format!("\n! {}\n", message)
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }
}
