use serde::{Deserialize, Serialize};

use crate::value_objects::{ParticipantName, Timestamp};

/// 在线会话参与者。同名参与者任一时刻至多存在一个（由注册表保证）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: ParticipantName,
    pub last_seen: Timestamp,
}

impl Participant {
    pub fn new(name: ParticipantName, at: Timestamp) -> Self {
        Self {
            name,
            last_seen: at,
        }
    }

    /// 刷新存活时间。心跳或任何已认证动作都会触发。
    pub fn touch(&mut self, at: Timestamp) {
        self.last_seen = at;
    }

    /// 判断在 `deadline` 之前是否已失联。
    pub fn expired_by(&self, deadline: Timestamp) -> bool {
        self.last_seen < deadline
    }
}
