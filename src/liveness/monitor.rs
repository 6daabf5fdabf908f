//! Uptime 监控 - 定期离线检查、告警和 uptime 报告

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::report::{offline_alert, uptime_report};
use super::tracker::{Activity, LivenessTracker};
use crate::config::UptimeConfig;
use crate::event::{is_uptime_command, sender_id};
use crate::notification::{ChatChannel, ChatMessage, SendResult};

/// 离线检查间隔
pub const CHECK_INTERVAL: Duration = Duration::from_secs(10);

/// 当前时间（Unix 秒）
pub fn now_secs() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// 监控被跟踪节点，并通过聊天渠道发送告警和报告
pub struct UptimeMonitor {
    tracker: Mutex<LivenessTracker>,
    alert_room_id: Option<String>,
    channel: Arc<dyn ChatChannel>,
    check_interval: Duration,
}

impl UptimeMonitor {
    pub fn new(config: &UptimeConfig, channel: Arc<dyn ChatChannel>) -> Self {
        let alert_room_id = config.alert_room().map(str::to_string);
        if alert_room_id.is_none() {
            warn!("No alert_room_id configured, offline alerts will not be sent");
        }

        Self {
            tracker: Mutex::new(LivenessTracker::new(
                config.tracked_nodes.clone(),
                config.offline_threshold,
            )),
            alert_room_id,
            channel,
            check_interval: CHECK_INTERVAL,
        }
    }

    /// 覆盖检查间隔（测试用）
    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval = interval;
        self
    }

    pub fn alert_room_id(&self) -> Option<&str> {
        self.alert_room_id.as_deref()
    }

    fn tracker(&self) -> MutexGuard<'_, LivenessTracker> {
        // 每次更新都是单次 insert/remove，锁中毒后状态仍然一致
        self.tracker.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 记录 `node_id` 在 `now` 时刻的活动
    pub fn record_activity(&self, node_id: &str, now: f64) -> Activity {
        let activity = self.tracker().record_activity(node_id, now);
        match activity {
            Activity::Recovered => info!(node_id = %node_id, "Node back online"),
            Activity::Recorded => debug!(node_id = %node_id, "Node activity recorded"),
            Activity::Ignored => {}
        }
        activity
    }

    /// 从已解码的 mesh 数据包记录活动，`fromId` 缺失或不是字符串时忽略
    pub fn handle_packet(&self, packet: &Value, now: f64) -> bool {
        match sender_id(packet) {
            Some(node_id) => self.record_activity(node_id, now) != Activity::Ignored,
            None => false,
        }
    }

    pub fn is_offline(&self, node_id: &str, now: f64) -> bool {
        self.tracker().is_offline(node_id, now)
    }

    pub fn is_alerted(&self, node_id: &str) -> bool {
        self.tracker().is_alerted(node_id)
    }

    pub fn downtime(&self, node_id: &str, now: f64) -> Option<f64> {
        self.tracker().downtime(node_id, now)
    }

    /// 执行一次离线检查
    ///
    /// 每段离线最多告警一次，发送失败也不重试。返回本次告警的节点 ID。
    pub async fn tick(&self, now: f64) -> Vec<String> {
        let Some(room_id) = self.alert_room_id.as_deref() else {
            return Vec::new();
        };

        let newly_offline = self.tracker().take_newly_offline(now);

        let mut alerted = Vec::with_capacity(newly_offline.len());
        for (node_id, downtime) in newly_offline {
            warn!(node_id = %node_id, downtime = downtime, "Node offline, sending alert");
            let message = ChatMessage::alert(room_id, &node_id, offline_alert(&node_id, downtime));
            match self.deliver(&message).await {
                SendResult::Sent => {}
                SendResult::Skipped(reason) => {
                    debug!(node_id = %node_id, reason = %reason, "Offline alert skipped");
                }
                SendResult::Failed(e) => {
                    error!(node_id = %node_id, room_id = %room_id, error = %e, "Failed sending offline alert");
                }
            }
            alerted.push(node_id);
        }
        alerted
    }

    /// 生成 `now` 时刻所有被跟踪节点的 uptime 报告
    pub fn generate_report(&self, now: f64) -> String {
        uptime_report(&self.tracker(), now)
    }

    /// 在 `room_id` 中回复 `!uptime`，其他消息返回 false
    pub async fn handle_room_message(&self, room_id: &str, body: &str) -> bool {
        self.handle_room_message_at(room_id, body, now_secs()).await
    }

    /// 带显式时间的 [`handle_room_message`](Self::handle_room_message)
    pub async fn handle_room_message_at(&self, room_id: &str, body: &str, now: f64) -> bool {
        if !is_uptime_command(body) {
            return false;
        }

        let report = self.generate_report(now);
        match self.deliver(&ChatMessage::report(room_id, report)).await {
            SendResult::Sent => {}
            SendResult::Skipped(reason) => {
                debug!(room_id = %room_id, reason = %reason, "Uptime report skipped");
            }
            SendResult::Failed(e) => {
                error!(room_id = %room_id, error = %e, "Failed sending uptime report");
            }
        }
        true
    }

    /// 发送消息，渠道返回的错误统一转成 `SendResult::Failed`
    async fn deliver(&self, message: &ChatMessage) -> SendResult {
        match self.channel.send(message).await {
            Ok(result) => result,
            Err(e) => SendResult::Failed(format!("{}: {}", self.channel.name(), e)),
        }
    }

    /// 启动定期检查，第一次检查立即执行
    ///
    /// 没有被跟踪节点时不启动任何任务，返回 `None`。
    pub fn start(self: &Arc<Self>) -> Option<MonitorHandle> {
        if self.tracker().tracked_nodes().is_empty() {
            debug!("No tracked nodes, uptime monitor not started");
            return None;
        }

        if let Some(room_id) = self.alert_room_id.clone() {
            let channel = Arc::clone(&self.channel);
            tokio::spawn(async move {
                if let Err(e) = channel.ensure_joined(&room_id).await {
                    warn!(room_id = %room_id, error = %e, "Failed to join alert room");
                }
            });
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let monitor = Arc::clone(self);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(monitor.check_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        monitor.tick(now_secs()).await;
                    }
                }
            }
            debug!("Uptime monitor stopped");
        });

        info!(interval_secs = self.check_interval.as_secs_f64(), "Uptime monitor started");
        Some(MonitorHandle { cancel, task })
    }
}

/// 运行中监控循环的句柄
pub struct MonitorHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// 停止调度并等待当前检查完成
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "Uptime monitor task ended abnormally");
        }
    }

    /// 循环任务是否已退出
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
