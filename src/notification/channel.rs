//! 聊天渠道 trait 定义

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

/// 发出消息的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// 定期检查发出的离线告警
    Alert,
    /// 对 uptime 命令的回复
    Report,
}

/// 发出的聊天消息
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// 目标房间
    pub room_id: String,
    /// 纯文本内容
    pub content: String,
    pub kind: MessageKind,
    /// 消息涉及的节点 (仅告警)
    pub node_id: Option<String>,
}

impl ChatMessage {
    /// 节点离线告警
    pub fn alert(room_id: impl Into<String>, node_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            content: content.into(),
            kind: MessageKind::Alert,
            node_id: Some(node_id.into()),
        }
    }

    /// uptime 报告回复
    pub fn report(room_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            content: content.into(),
            kind: MessageKind::Report,
            node_id: None,
        }
    }
}

/// 发送结果
#[derive(Debug, Clone, PartialEq)]
pub enum SendResult {
    /// 已发送
    Sent,
    /// 有意不发送 (dry-run 等)
    Skipped(String),
    /// 后端拒绝了消息
    Failed(String),
}

/// 发送告警和报告的聊天后端
#[async_trait]
pub trait ChatChannel: Send + Sync {
    /// 渠道名称 (用于日志)
    fn name(&self) -> &str;

    /// 发送消息到 `message.room_id`
    async fn send(&self, message: &ChatMessage) -> Result<SendResult>;

    /// 尽力加入房间，失败不影响后续发送
    async fn ensure_joined(&self, room_id: &str) -> Result<()>;
}
