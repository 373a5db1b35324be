use async_trait::async_trait;
use domain::{Message, MessageId, MessageText, Participant, ParticipantName, Timestamp};
use thiserror::Error;

/// 存储协作者错误。内存实现不会产生，真实存储实现可以。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage unavailable: {message}")]
    Unavailable { message: String },
}

/// 原子查重插入的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    NameTaken,
}

/// 带所有权检查的消息变更结果。检查与写入必须在同一个临界区内完成。
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    Applied(Message),
    NotFound,
    NotAuthor,
}

/// 参与者注册表：每个名称至多一个会话。
#[async_trait]
pub trait ParticipantRegistry: Send + Sync {
    /// 不存在则插入。查重和插入不可拆分为两个独立可见的步骤。
    async fn insert_if_absent(
        &self,
        participant: Participant,
    ) -> Result<InsertOutcome, StorageError>;

    /// 刷新存活时间。返回 false 表示该参与者不存在。
    async fn touch(&self, name: &ParticipantName, at: Timestamp) -> Result<bool, StorageError>;

    async fn remove(&self, name: &ParticipantName) -> Result<Option<Participant>, StorageError>;

    /// 仅当 `last_seen` 早于 `deadline` 时移除，在锁内复查，
    /// 保证清扫不会与刚刷新过的心跳竞争。
    async fn remove_if_expired(
        &self,
        name: &ParticipantName,
        deadline: Timestamp,
    ) -> Result<Option<Participant>, StorageError>;

    /// 按插入顺序枚举全部参与者。
    async fn list(&self) -> Result<Vec<Participant>, StorageError>;

    async fn contains(&self, name: &ParticipantName) -> Result<bool, StorageError>;
}

/// 追加式消息日志。
#[async_trait]
pub trait MessageLog: Send + Sync {
    async fn append(&self, message: Message) -> Result<MessageId, StorageError>;

    async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, StorageError>;

    /// 仅作者可编辑，只替换正文。
    async fn edit_text(
        &self,
        id: MessageId,
        requester: &ParticipantName,
        new_text: MessageText,
        at: Timestamp,
    ) -> Result<MutationOutcome, StorageError>;

    /// 仅作者可删除。
    async fn remove(
        &self,
        id: MessageId,
        requester: &ParticipantName,
    ) -> Result<MutationOutcome, StorageError>;

    /// 按追加顺序返回全部消息。
    async fn list_all(&self) -> Result<Vec<Message>, StorageError>;
}
