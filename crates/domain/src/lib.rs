//! 聊天中继核心领域模型
//!
//! 参与者、消息与可见性规则，以及相关的校验逻辑。

pub mod errors;
pub mod message;
pub mod participant;
pub mod value_objects;
pub mod visibility;

pub use errors::{DomainError, DomainResult};
pub use message::Message;
pub use participant::Participant;
pub use value_objects::{
    MessageId, MessageKind, MessageText, ParticipantName, RecipientName, Timestamp,
};
