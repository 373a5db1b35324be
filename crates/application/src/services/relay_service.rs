//! 会话命令处理。
//!
//! 传输层把请求解码成这里的调用；本层校验输入并组合注册表与消息日志。

use std::sync::Arc;

use domain::{
    visibility, DomainError, Message, MessageId, MessageKind, MessageText, Participant,
    ParticipantName, RecipientName,
};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::{ApplicationError, ApplicationResult};
use crate::repository::{InsertOutcome, MessageLog, MutationOutcome, ParticipantRegistry};

/// 进入房间的状态公告正文。
pub const ARRIVAL_TEXT: &str = "joined the room";
/// 离开房间的状态公告正文，主动离开与被清扫使用同一条。
pub const DEPARTURE_TEXT: &str = "left the room";

pub struct RelayDependencies {
    pub registry: Arc<dyn ParticipantRegistry>,
    pub log: Arc<dyn MessageLog>,
    pub clock: Arc<dyn Clock>,
    /// 广播哨兵名称（来自配置，如 "Todos"）
    pub sentinel: RecipientName,
}

pub struct RelayService {
    deps: RelayDependencies,
}

impl RelayService {
    pub fn new(deps: RelayDependencies) -> Self {
        Self { deps }
    }

    /// 注册一个在线会话并广播到场公告。重名返回 `Conflict`。
    pub async fn join(&self, name: &str) -> ApplicationResult<Participant> {
        let name = ParticipantName::parse(name)?;
        let now = self.deps.clock.now();
        let participant = Participant::new(name.clone(), now);

        match self
            .deps
            .registry
            .insert_if_absent(participant.clone())
            .await?
        {
            InsertOutcome::Inserted => {}
            InsertOutcome::NameTaken => {
                return Err(ApplicationError::Conflict(format!(
                    "name already taken: {name}"
                )));
            }
        }

        let status = Message::status(
            name.clone(),
            self.deps.sentinel.clone(),
            MessageText::parse(ARRIVAL_TEXT)?,
            now,
        );
        self.deps.log.append(status).await?;

        info!(name = %name, "participant joined");
        Ok(participant)
    }

    /// 刷新会话存活时间。`NotFound` 表示调用方需要重新 join。
    pub async fn heartbeat(&self, name: &str) -> ApplicationResult<()> {
        let name = ParticipantName::parse(name)?;
        let now = self.deps.clock.now();

        if self.deps.registry.touch(&name, now).await? {
            Ok(())
        } else {
            Err(ApplicationError::NotFound(format!(
                "participant not found: {name}"
            )))
        }
    }

    /// 注销会话并广播离开公告。对调用方幂等：移除不存在的名称不算错误，
    /// 与清扫任务自身的行为一致。
    pub async fn leave(&self, name: &str) -> ApplicationResult<()> {
        let name = ParticipantName::parse(name)?;
        let now = self.deps.clock.now();

        if self.deps.registry.remove(&name).await?.is_some() {
            let status = Message::status(
                name.clone(),
                self.deps.sentinel.clone(),
                MessageText::parse(DEPARTURE_TEXT)?,
                now,
            );
            self.deps.log.append(status).await?;
            info!(name = %name, "participant left");
        }
        Ok(())
    }

    /// 发送广播或私聊消息。发送者必须是当前成员；`status` 类别只允许
    /// 系统生成，走这里会被拒绝。
    pub async fn post_message(
        &self,
        from: &str,
        to: &str,
        text: &str,
        kind: &str,
    ) -> ApplicationResult<Message> {
        let kind: MessageKind = kind.parse()?;
        if kind == MessageKind::Status {
            return Err(DomainError::invalid_argument(
                "type",
                "status messages are system generated",
            )
            .into());
        }

        let from = ParticipantName::parse(from)?;
        let to = RecipientName::parse(to)?;
        let text = MessageText::parse(text)?;
        let now = self.deps.clock.now();

        // 成员校验与存活刷新是同一个注册表原子操作
        if !self.deps.registry.touch(&from, now).await? {
            return Err(ApplicationError::Forbidden(format!(
                "not in the room: {from}"
            )));
        }

        let message = Message::new(from, to, text, kind, now);
        self.deps.log.append(message.clone()).await?;

        debug!(id = %message.id, kind = %message.kind, "message stored");
        Ok(message)
    }

    /// 编辑消息正文，仅限原作者。
    pub async fn edit_message(
        &self,
        id: &str,
        requester: &str,
        new_text: &str,
    ) -> ApplicationResult<Message> {
        let id = MessageId::parse(id)?;
        let requester = ParticipantName::parse(requester)?;
        let new_text = MessageText::parse(new_text)?;
        let now = self.deps.clock.now();

        match self
            .deps
            .log
            .edit_text(id, &requester, new_text, now)
            .await?
        {
            MutationOutcome::Applied(message) => Ok(message),
            MutationOutcome::NotFound => Err(ApplicationError::NotFound(format!(
                "message not found: {id}"
            ))),
            MutationOutcome::NotAuthor => Err(ApplicationError::Forbidden(
                "only the author can edit a message".into(),
            )),
        }
    }

    /// 删除消息，仅限原作者。
    pub async fn delete_message(&self, id: &str, requester: &str) -> ApplicationResult<()> {
        let id = MessageId::parse(id)?;
        let requester = ParticipantName::parse(requester)?;

        match self.deps.log.remove(id, &requester).await? {
            MutationOutcome::Applied(_) => Ok(()),
            MutationOutcome::NotFound => Err(ApplicationError::NotFound(format!(
                "message not found: {id}"
            ))),
            MutationOutcome::NotAuthor => Err(ApplicationError::Forbidden(
                "only the author can delete a message".into(),
            )),
        }
    }

    pub async fn list_participants(&self) -> ApplicationResult<Vec<Participant>> {
        Ok(self.deps.registry.list().await?)
    }

    /// 返回 `identity` 可见的消息。身份不必是当前成员，
    /// 公共消息和状态公告对任何身份都可见。
    pub async fn list_messages(
        &self,
        identity: &str,
        limit: Option<i64>,
    ) -> ApplicationResult<Vec<Message>> {
        let identity = ParticipantName::parse(identity)?;
        let log = self.deps.log.list_all().await?;
        Ok(visibility::visible_tail(&identity, &log, limit))
    }
}
