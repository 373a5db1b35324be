//! 内存存储实现。
//!
//! 长生命周期的值，启动时构造一次注入，不做每次命令的获取/释放。

use async_trait::async_trait;
use domain::{Message, MessageId, MessageText, Participant, ParticipantName, Timestamp};
use tokio::sync::RwLock;

use crate::repository::{
    InsertOutcome, MessageLog, MutationOutcome, ParticipantRegistry, StorageError,
};

/// 内存参与者注册表。插入顺序即枚举顺序。
#[derive(Default)]
pub struct InMemoryParticipantRegistry {
    participants: RwLock<Vec<Participant>>,
}

impl InMemoryParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ParticipantRegistry for InMemoryParticipantRegistry {
    async fn insert_if_absent(
        &self,
        participant: Participant,
    ) -> Result<InsertOutcome, StorageError> {
        // 查重和插入持同一把写锁：并发 join 同名时恰有一个成功
        let mut participants = self.participants.write().await;
        if participants.iter().any(|p| p.name == participant.name) {
            return Ok(InsertOutcome::NameTaken);
        }
        participants.push(participant);
        Ok(InsertOutcome::Inserted)
    }

    async fn touch(&self, name: &ParticipantName, at: Timestamp) -> Result<bool, StorageError> {
        let mut participants = self.participants.write().await;
        match participants.iter_mut().find(|p| p.name == *name) {
            Some(participant) => {
                participant.touch(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, name: &ParticipantName) -> Result<Option<Participant>, StorageError> {
        let mut participants = self.participants.write().await;
        let index = participants.iter().position(|p| p.name == *name);
        Ok(index.map(|i| participants.remove(i)))
    }

    async fn remove_if_expired(
        &self,
        name: &ParticipantName,
        deadline: Timestamp,
    ) -> Result<Option<Participant>, StorageError> {
        // 在写锁内复查存活条件，心跳刚刷新过的参与者不会被移除
        let mut participants = self.participants.write().await;
        let index = participants
            .iter()
            .position(|p| p.name == *name && p.expired_by(deadline));
        Ok(index.map(|i| participants.remove(i)))
    }

    async fn list(&self) -> Result<Vec<Participant>, StorageError> {
        Ok(self.participants.read().await.clone())
    }

    async fn contains(&self, name: &ParticipantName) -> Result<bool, StorageError> {
        Ok(self
            .participants
            .read()
            .await
            .iter()
            .any(|p| p.name == *name))
    }
}

/// 内存消息日志，按追加顺序保存。
#[derive(Default)]
pub struct InMemoryMessageLog {
    messages: RwLock<Vec<Message>>,
}

impl InMemoryMessageLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageLog for InMemoryMessageLog {
    async fn append(&self, message: Message) -> Result<MessageId, StorageError> {
        let id = message.id;
        self.messages.write().await.push(message);
        Ok(id)
    }

    async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, StorageError> {
        Ok(self
            .messages
            .read()
            .await
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn edit_text(
        &self,
        id: MessageId,
        requester: &ParticipantName,
        new_text: MessageText,
        at: Timestamp,
    ) -> Result<MutationOutcome, StorageError> {
        // 所有权检查与写入共用一把写锁，并发编辑不会丢失更新
        let mut messages = self.messages.write().await;
        let Some(message) = messages.iter_mut().find(|m| m.id == id) else {
            return Ok(MutationOutcome::NotFound);
        };
        if message.from != *requester {
            return Ok(MutationOutcome::NotAuthor);
        }
        message.edit(new_text, at);
        Ok(MutationOutcome::Applied(message.clone()))
    }

    async fn remove(
        &self,
        id: MessageId,
        requester: &ParticipantName,
    ) -> Result<MutationOutcome, StorageError> {
        let mut messages = self.messages.write().await;
        let Some(index) = messages.iter().position(|m| m.id == id) else {
            return Ok(MutationOutcome::NotFound);
        };
        if messages[index].from != *requester {
            return Ok(MutationOutcome::NotAuthor);
        }
        Ok(MutationOutcome::Applied(messages.remove(index)))
    }

    async fn list_all(&self) -> Result<Vec<Message>, StorageError> {
        Ok(self.messages.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use domain::MessageKind;

    use super::*;

    fn name(value: &str) -> ParticipantName {
        ParticipantName::parse(value).unwrap()
    }

    fn chat(from: &str, to: &str, text: &str) -> Message {
        Message::new(
            name(from),
            domain::RecipientName::parse(to).unwrap(),
            MessageText::parse(text).unwrap(),
            MessageKind::Message,
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn insert_if_absent_reports_name_taken() {
        let registry = InMemoryParticipantRegistry::new();
        let now = Utc::now();

        let first = registry
            .insert_if_absent(Participant::new(name("Alice"), now))
            .await
            .unwrap();
        let second = registry
            .insert_if_absent(Participant::new(name("Alice"), now))
            .await
            .unwrap();

        assert_eq!(first, InsertOutcome::Inserted);
        assert_eq!(second, InsertOutcome::NameTaken);
        assert_eq!(registry.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn touch_returns_false_for_unknown_name() {
        let registry = InMemoryParticipantRegistry::new();
        assert!(!registry.touch(&name("Ghost"), Utc::now()).await.unwrap());
    }

    #[tokio::test]
    async fn remove_if_expired_spares_fresh_participants() {
        let registry = InMemoryParticipantRegistry::new();
        let now = Utc::now();
        registry
            .insert_if_absent(Participant::new(name("Alice"), now))
            .await
            .unwrap();

        // 截止线早于 last_seen：复查失败，不得移除
        let removed = registry
            .remove_if_expired(&name("Alice"), now - Duration::seconds(1))
            .await
            .unwrap();
        assert!(removed.is_none());
        assert!(registry.contains(&name("Alice")).await.unwrap());

        let removed = registry
            .remove_if_expired(&name("Alice"), now + Duration::seconds(1))
            .await
            .unwrap();
        assert!(removed.is_some());
        assert!(!registry.contains(&name("Alice")).await.unwrap());
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let registry = InMemoryParticipantRegistry::new();
        let now = Utc::now();
        for n in ["Alice", "Bob", "Carol"] {
            registry
                .insert_if_absent(Participant::new(name(n), now))
                .await
                .unwrap();
        }

        let names: Vec<_> = registry
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name.to_string())
            .collect();
        assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
    }

    #[tokio::test]
    async fn edit_text_enforces_authorship() {
        let log = InMemoryMessageLog::new();
        let message = chat("Alice", "Todos", "oi");
        let id = log.append(message).await.unwrap();

        let outcome = log
            .edit_text(
                id,
                &name("Bob"),
                MessageText::parse("hacked").unwrap(),
                Utc::now(),
            )
            .await
            .unwrap();
        assert_eq!(outcome, MutationOutcome::NotAuthor);

        // 被拒绝的编辑不得留下痕迹
        let stored = log.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.text.as_str(), "oi");
        assert!(stored.edited_at.is_none());
    }

    #[tokio::test]
    async fn remove_enforces_authorship_and_reports_missing_ids() {
        let log = InMemoryMessageLog::new();
        let message = chat("Alice", "Todos", "oi");
        let id = log.append(message).await.unwrap();

        let outcome = log.remove(id, &name("Bob")).await.unwrap();
        assert_eq!(outcome, MutationOutcome::NotAuthor);
        assert!(log.find_by_id(id).await.unwrap().is_some());

        assert!(matches!(
            log.remove(id, &name("Alice")).await.unwrap(),
            MutationOutcome::Applied(_)
        ));
        assert!(log.find_by_id(id).await.unwrap().is_none());

        let outcome = log.remove(id, &name("Alice")).await.unwrap();
        assert_eq!(outcome, MutationOutcome::NotFound);
    }

    #[tokio::test]
    async fn list_all_preserves_append_order() {
        let log = InMemoryMessageLog::new();
        for text in ["um", "dois", "tres"] {
            log.append(chat("Alice", "Todos", text)).await.unwrap();
        }

        let texts: Vec<_> = log
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.text.to_string())
            .collect();
        assert_eq!(texts, vec!["um", "dois", "tres"]);
    }
}
