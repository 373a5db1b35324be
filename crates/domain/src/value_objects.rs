use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// 统一的时间戳类型。
pub type Timestamp = DateTime<Utc>;

const MAX_NAME_LEN: usize = 64;
const MAX_TEXT_LEN: usize = 1000;

/// 经过验证的参与者名称。大小写敏感，修剪后非空。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantName(String);

impl ParticipantName {
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_owned();
        if value.is_empty() {
            return Err(DomainError::invalid_argument("name", "cannot be empty"));
        }
        if value.len() > MAX_NAME_LEN {
            return Err(DomainError::invalid_argument("name", "too long"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 消息收件人：参与者名称或广播哨兵（来自配置，不在领域内枚举）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecipientName(String);

impl RecipientName {
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_owned();
        if value.is_empty() {
            return Err(DomainError::invalid_argument("to", "cannot be empty"));
        }
        if value.len() > MAX_NAME_LEN {
            return Err(DomainError::invalid_argument("to", "too long"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecipientName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ParticipantName> for RecipientName {
    fn from(value: ParticipantName) -> Self {
        Self(value.0)
    }
}

/// 消息正文内容。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageText(String);

impl MessageText {
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::invalid_argument("text", "cannot be empty"));
        }
        if value.len() > MAX_TEXT_LEN {
            return Err(DomainError::invalid_argument("text", "too long"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 消息类别。`Status` 仅由系统生成（进入/离开房间的公告）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Message,
    PrivateMessage,
    Status,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Message => "message",
            MessageKind::PrivateMessage => "private_message",
            MessageKind::Status => "status",
        }
    }
}

impl FromStr for MessageKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "message" => Ok(MessageKind::Message),
            "private_message" => Ok(MessageKind::PrivateMessage),
            "status" => Ok(MessageKind::Status),
            other => Err(DomainError::invalid_argument(
                "type",
                format!("unknown message kind: {other}"),
            )),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static PROCESS_RANDOM: OnceLock<[u8; 5]> = OnceLock::new();
static ID_COUNTER: OnceLock<AtomicU32> = OnceLock::new();

/// 消息唯一标识。
///
/// 12 字节，展示为 24 个十六进制字符，与存储方签发的标识格式往返兼容：
/// 4 字节大端秒级时间戳 + 5 字节进程随机值 + 3 字节自增计数器。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId([u8; 12]);

impl MessageId {
    pub fn generate(at: Timestamp) -> Self {
        let seconds = at.timestamp().clamp(0, u32::MAX as i64) as u32;
        let process = PROCESS_RANDOM.get_or_init(rand::random);
        let counter = ID_COUNTER
            .get_or_init(|| AtomicU32::new(rand::random()))
            .fetch_add(1, Ordering::Relaxed)
            & 0x00FF_FFFF;

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(process);
        bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);
        Self(bytes)
    }

    pub fn parse(value: &str) -> Result<Self, DomainError> {
        if value.len() != 24 {
            return Err(DomainError::invalid_argument(
                "id",
                "must be 24 hex characters",
            ));
        }
        let decoded = data_encoding::HEXLOWER_PERMISSIVE
            .decode(value.as_bytes())
            .map_err(|_| DomainError::invalid_argument("id", "must be 24 hex characters"))?;
        let mut bytes = [0u8; 12];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&data_encoding::HEXLOWER.encode(&self.0))
    }
}

impl FromStr for MessageId {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Serialize for MessageId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(serde::de::Error::custom)
    }
}
