//! Value Object 定義
//!
//! ドメインで扱う識別子・文字列値をラップし、生成時にバリデーションを行います。
//! 一度生成された Value Object は常に妥当な値を保持します。

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// 文字列ベースの Value Object を定義する
///
/// 前後の空白を除去した上で、空文字と最大長超過を拒否します。
macro_rules! string_value_object {
    ($(#[$meta:meta])* $name:ident, $field:literal, $max_len:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Maximum length in characters.
            pub const MAX_LEN: usize = $max_len;

            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(ValueObjectError::Empty($field));
                }
                if trimmed.chars().count() > Self::MAX_LEN {
                    return Err(ValueObjectError::TooLong {
                        field: $field,
                        max: Self::MAX_LEN,
                    });
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_value_object!(
    /// ルーム ID（不透明な文字列、生成時は UUID v4）
    RoomId,
    "room_id",
    64
);

string_value_object!(
    /// WebSocket 接続ごとに払い出される接続 ID
    ConnectionId,
    "connection_id",
    64
);

string_value_object!(
    /// 外部から与えられるユーザー識別子（認証はスコープ外）
    Identity,
    "identity",
    128
);

string_value_object!(
    /// 参加者の表示名
    DisplayName,
    "name",
    50
);

string_value_object!(
    /// 送信者が採番するメッセージ ID（送信者の接続内で一意）
    MessageId,
    "message_id",
    64
);

string_value_object!(
    /// チャットメッセージ本文
    MessageContent,
    "text",
    2000
);

string_value_object!(
    /// 外部ホスティングされている動画の ID
    VideoId,
    "video_id",
    256
);

string_value_object!(
    /// セッショントークンの文字列表現
    TokenValue,
    "token",
    128
);

/// UUID 文字列は常に各 Value Object の制約を満たす
macro_rules! from_uuid {
    ($($name:ident),*) => {
        $(
            impl From<Uuid> for $name {
                fn from(value: Uuid) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

from_uuid!(RoomId, ConnectionId, Identity, MessageId, TokenValue);

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Milliseconds elapsed from `earlier` to `self` (negative if `earlier` is later).
    pub fn millis_since(&self, earlier: Timestamp) -> i64 {
        self.0 - earlier.0
    }
}

/// ルーム内でのロール
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Creator,
    Guest,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Creator => "creator",
            Role::Guest => "guest",
        }
    }
}
