//! 聊天消息发送层
//!
//! monitor 只通过 [`ChatChannel`] 发送消息，告警和 uptime 报告
//! 都是发往某个房间的纯文本消息。
//!
//! # Example
//! ```ignore
//! use mesh_uptime::notification::{ChatMessage, ConsoleChannel, ChatChannel};
//!
//! let channel = ConsoleChannel::new();
//! channel.send(&ChatMessage::report("!room:example.org", "Node A: Never seen")).await?;
//! ```

pub mod channel;
pub mod channels;

pub use channel::{ChatChannel, ChatMessage, MessageKind, SendResult};
pub use channels::{ConsoleChannel, MatrixChannel, MatrixConfig};
