use serde::{Deserialize, Serialize};

use crate::value_objects::{
    MessageId, MessageKind, MessageText, ParticipantName, RecipientName, Timestamp,
};

/// 聊天事件。`from`/`to` 按值引用参与者名称，参与者被移除后消息仍然保留。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub from: ParticipantName,
    pub to: RecipientName,
    pub text: MessageText,
    pub kind: MessageKind,
    pub time: Timestamp,
    pub edited_at: Option<Timestamp>,
}

impl Message {
    pub fn new(
        from: ParticipantName,
        to: RecipientName,
        text: MessageText,
        kind: MessageKind,
        at: Timestamp,
    ) -> Self {
        Self {
            id: MessageId::generate(at),
            from,
            to,
            text,
            kind,
            time: at,
            edited_at: None,
        }
    }

    /// 系统生成的状态公告（进入/离开房间），收件人固定为广播哨兵。
    pub fn status(
        from: ParticipantName,
        sentinel: RecipientName,
        text: MessageText,
        at: Timestamp,
    ) -> Self {
        Self::new(from, sentinel, text, MessageKind::Status, at)
    }

    /// 仅替换正文。`id`、`from`、`to`、`kind` 与原始 `time` 保持不变，
    /// 编辑时刻记录在 `edited_at`。
    pub fn edit(&mut self, new_text: MessageText, at: Timestamp) {
        self.text = new_text;
        self.edited_at = Some(at);
    }
}
