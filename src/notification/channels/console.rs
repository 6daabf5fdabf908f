//! Console 渠道 - 打印消息而不是真正发送

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::notification::channel::{ChatChannel, ChatMessage, SendResult};

/// Console 渠道，用于 dry-run 或未配置聊天后端时
pub struct ConsoleChannel {
    /// 以 JSON 行而不是纯文本打印消息
    json: bool,
}

impl ConsoleChannel {
    pub fn new() -> Self {
        Self { json: false }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    fn render(&self, message: &ChatMessage) -> Result<String> {
        if self.json {
            Ok(serde_json::to_string(message)?)
        } else {
            Ok(format!("[{}] {}", message.room_id, message.content))
        }
    }
}

impl Default for ConsoleChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatChannel for ConsoleChannel {
    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, message: &ChatMessage) -> Result<SendResult> {
        println!("{}", self.render(message)?);
        Ok(SendResult::Sent)
    }

    async fn ensure_joined(&self, room_id: &str) -> Result<()> {
        debug!(channel = "console", room_id = %room_id, "Join skipped");
        Ok(())
    }
}
