//! 消息可见性规则。
//!
//! 这是系统里语义最关键的算法：带 limit 与不带 limit 的查询必须走同一个
//! 过滤器，私聊消息绝不能泄露给发送者和收件人之外的第三方。

use crate::message::Message;
use crate::value_objects::{MessageKind, ParticipantName};

/// 判断单条消息对 `identity` 是否可见。
///
/// 公共消息与状态公告对所有人可见（包括未加入的身份）；
/// 私聊仅对发送者和收件人可见；发送者总能看到自己发出的消息。
pub fn is_visible(identity: &ParticipantName, message: &Message) -> bool {
    matches!(message.kind, MessageKind::Message | MessageKind::Status)
        || message.to.as_str() == identity.as_str()
        || message.from == *identity
}

/// 过滤出 `identity` 可见的消息，保持日志中的追加顺序。
pub fn visible_to(identity: &ParticipantName, messages: &[Message]) -> Vec<Message> {
    messages
        .iter()
        .filter(|message| is_visible(identity, message))
        .cloned()
        .collect()
}

/// 同一过滤器再做尾部截断：`limit = Some(k)` 且 `k > 0` 时仅保留过滤结果
/// 的最后 `k` 条；`None` 或非正值返回完整的过滤序列。
pub fn visible_tail(
    identity: &ParticipantName,
    messages: &[Message],
    limit: Option<i64>,
) -> Vec<Message> {
    let mut filtered = visible_to(identity, messages);
    if let Some(limit) = limit {
        if limit > 0 && (limit as usize) < filtered.len() {
            filtered.drain(..filtered.len() - limit as usize);
        }
    }
    filtered
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::value_objects::{MessageText, RecipientName};

    fn name(value: &str) -> ParticipantName {
        ParticipantName::parse(value).unwrap()
    }

    fn chat(from: &str, to: &str, text: &str, kind: MessageKind) -> Message {
        Message::new(
            name(from),
            RecipientName::parse(to).unwrap(),
            MessageText::parse(text).unwrap(),
            kind,
            Utc::now(),
        )
    }

    fn sample_log() -> Vec<Message> {
        vec![
            chat("Alice", "Todos", "joined the room", MessageKind::Status),
            chat("Alice", "Todos", "oi galera", MessageKind::Message),
            chat("Alice", "Bob", "segredo", MessageKind::PrivateMessage),
            chat("Bob", "Alice", "resposta", MessageKind::PrivateMessage),
            chat("Carol", "Todos", "boa noite", MessageKind::Message),
        ]
    }

    #[test]
    fn public_and_status_visible_to_everyone() {
        let log = sample_log();
        let seen = visible_to(&name("Zoe"), &log);

        let texts: Vec<_> = seen.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["joined the room", "oi galera", "boa noite"]);
    }

    #[test]
    fn private_message_hidden_from_third_parties() {
        let log = sample_log();

        for identity in ["Carol", "Zoe", "Todos"] {
            let seen = visible_to(&name(identity), &log);
            assert!(
                seen.iter().all(|m| m.text.as_str() != "segredo"),
                "'segredo' leaked to {identity}"
            );
        }
    }

    #[test]
    fn sender_and_recipient_see_private_messages() {
        let log = sample_log();

        for identity in ["Alice", "Bob"] {
            let seen = visible_to(&name(identity), &log);
            assert!(seen.iter().any(|m| m.text.as_str() == "segredo"));
            assert!(seen.iter().any(|m| m.text.as_str() == "resposta"));
        }
    }

    #[test]
    fn order_follows_the_log() {
        let log = sample_log();
        let seen = visible_to(&name("Bob"), &log);

        let texts: Vec<_> = seen.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["joined the room", "oi galera", "segredo", "resposta", "boa noite"]
        );
    }

    #[test]
    fn limit_keeps_the_tail_of_the_filtered_sequence() {
        let log = sample_log();
        let bob = name("Bob");

        let tail = visible_tail(&bob, &log, Some(2));
        let texts: Vec<_> = tail.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["resposta", "boa noite"]);

        // limit 与全量查询必须共享同一个过滤器
        let full = visible_to(&bob, &log);
        assert_eq!(tail, full[full.len() - 2..].to_vec());
    }

    #[test]
    fn limit_at_or_beyond_length_returns_everything() {
        let log = sample_log();
        let bob = name("Bob");
        let full = visible_to(&bob, &log);

        assert_eq!(visible_tail(&bob, &log, Some(full.len() as i64)), full);
        assert_eq!(visible_tail(&bob, &log, Some(100)), full);
    }

    #[test]
    fn non_positive_or_absent_limit_is_ignored() {
        let log = sample_log();
        let bob = name("Bob");
        let full = visible_to(&bob, &log);

        assert_eq!(visible_tail(&bob, &log, None), full);
        assert_eq!(visible_tail(&bob, &log, Some(0)), full);
        assert_eq!(visible_tail(&bob, &log, Some(-3)), full);
    }
}
