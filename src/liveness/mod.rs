//! 节点存活模块 - 状态跟踪、定期检查和状态报告

mod monitor;
mod report;
mod tracker;

pub use monitor::{now_secs, MonitorHandle, UptimeMonitor, CHECK_INTERVAL};
pub use report::{offline_alert, uptime_report, NodeStatus};
pub use tracker::{Activity, LivenessTracker, DEFAULT_OFFLINE_THRESHOLD};
