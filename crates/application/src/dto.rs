//! 对外数据形状。
//!
//! 与存储协作者持久化布局保持一致：参与者带毫秒级 `lastStatus`，
//! 消息带 `type` 字段和 `HH:MM:SS` 格式的时间。

use domain::{Message, Participant};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub name: String,
    /// epoch 毫秒
    pub last_status: i64,
}

impl From<&Participant> for ParticipantDto {
    fn from(participant: &Participant) -> Self {
        Self {
            name: participant.name.to_string(),
            last_status: participant.last_seen.timestamp_millis(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: String,
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub time: String,
}

impl From<&Message> for MessageDto {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.to_string(),
            from: message.from.to_string(),
            to: message.to.to_string(),
            text: message.text.to_string(),
            kind: message.kind.to_string(),
            time: message.time.format("%H:%M:%S").to_string(),
        }
    }
}
