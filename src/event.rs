//! 输入的 bridge 事件 - 解码后的 mesh 数据包和房间消息

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// 回复 uptime 报告的聊天命令
pub const UPTIME_COMMAND: &str = "!uptime";

/// bridge 事件流中的一行
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeEvent {
    /// 解码后的 mesh 数据包
    Packet { packet: Value },
    /// 聊天房间里的消息
    RoomMessage { room_id: String, body: String },
}

impl BridgeEvent {
    /// 解析一行 JSON，空行返回 `None`
    pub fn parse_line(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let event = serde_json::from_str(line).context("invalid bridge event")?;
        Ok(Some(event))
    }
}

/// mesh 数据包的发送者 id (必须是字符串)
pub fn sender_id(packet: &Value) -> Option<&str> {
    packet.get("fromId").and_then(Value::as_str)
}

/// 房间消息是否请求 uptime 报告
pub fn is_uptime_command(body: &str) -> bool {
    body.contains(UPTIME_COMMAND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sender_id() {
        assert_eq!(sender_id(&json!({"fromId": "!a1b2c3d4"})), Some("!a1b2c3d4"));
        assert_eq!(sender_id(&json!({"fromId": 12345})), None);
        assert_eq!(sender_id(&json!({"from": 12345})), None);
        assert_eq!(sender_id(&json!("not an object")), None);
    }

    #[test]
    fn test_is_uptime_command() {
        assert!(is_uptime_command("!uptime"));
        assert!(is_uptime_command("hey bot !uptime please"));
        assert!(!is_uptime_command("uptime"));
        assert!(!is_uptime_command("!help"));
    }

    #[test]
    fn test_parse_packet_line() {
        let event = BridgeEvent::parse_line(r#"{"type":"packet","packet":{"fromId":"!a"}}"#)
            .unwrap()
            .unwrap();
        assert_eq!(event, BridgeEvent::Packet { packet: json!({"fromId": "!a"}) });
    }

    #[test]
    fn test_parse_room_message_line() {
        let event = BridgeEvent::parse_line(
            r#"{"type":"room_message","room_id":"!r:example.org","body":"!uptime"}"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            event,
            BridgeEvent::RoomMessage {
                room_id: "!r:example.org".to_string(),
                body: "!uptime".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_blank_and_invalid_lines() {
        assert_eq!(BridgeEvent::parse_line("   ").unwrap(), None);
        assert!(BridgeEvent::parse_line("{not json").is_err());
        assert!(BridgeEvent::parse_line(r#"{"type":"unknown"}"#).is_err());
    }
}
