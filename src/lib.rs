//! Mesh Uptime - 跟踪 mesh 节点在线状态，节点静默时向聊天房间告警

pub mod cli;
pub mod config;
pub mod event;
pub mod liveness;
pub mod notification;

pub use config::{BridgeConfig, UptimeConfig};
pub use event::{BridgeEvent, UPTIME_COMMAND};
pub use liveness::{Activity, LivenessTracker, MonitorHandle, NodeStatus, UptimeMonitor};
pub use notification::{ChatChannel, ChatMessage, ConsoleChannel, MatrixChannel, SendResult};
