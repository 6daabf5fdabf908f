//! 状态报告和告警文案

use super::tracker::LivenessTracker;

/// 单个被跟踪节点的报告状态
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeStatus {
    /// 启动以来没有任何活动
    NeverSeen,
    /// 阈值内有活动，`since` 秒前
    Online { since: f64 },
    /// 静默时间超过阈值
    Offline { downtime: f64 },
}

impl NodeStatus {
    /// `node_id` 的一行报告
    pub fn report_line(&self, node_id: &str) -> String {
        match self {
            NodeStatus::NeverSeen => format!("Node {}: Never seen", node_id),
            NodeStatus::Offline { downtime } => {
                format!("Node {}: OFFLINE for {:.2} seconds", node_id, downtime)
            }
            NodeStatus::Online { since } => {
                format!("Node {}: ONLINE, last seen {:.2} seconds ago", node_id, since)
            }
        }
    }
}

/// 节点首次超过离线阈值时发送的告警
pub fn offline_alert(node_id: &str, downtime: f64) -> String {
    format!("Alert: Node {} is OFFLINE for {:.2} seconds!", node_id, downtime)
}

/// 生成多行 uptime 报告，按配置顺序每个节点一行，只读状态
pub fn uptime_report(tracker: &LivenessTracker, now: f64) -> String {
    tracker
        .tracked_nodes()
        .iter()
        .map(|node_id| tracker.status(node_id, now).report_line(node_id))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_lines() {
        assert_eq!(NodeStatus::NeverSeen.report_line("B"), "Node B: Never seen");
        assert_eq!(
            NodeStatus::Online { since: 50.0 }.report_line("A"),
            "Node A: ONLINE, last seen 50.00 seconds ago"
        );
        assert_eq!(
            NodeStatus::Offline { downtime: 1234.567 }.report_line("A"),
            "Node A: OFFLINE for 1234.57 seconds"
        );
    }

    #[test]
    fn test_offline_alert_text() {
        assert_eq!(
            offline_alert("!a1b2c3d4", 150.0),
            "Alert: Node !a1b2c3d4 is OFFLINE for 150.00 seconds!"
        );
    }

    #[test]
    fn test_uptime_report_preserves_order_and_duplicates() {
        let mut tracker = LivenessTracker::new(
            vec!["B".to_string(), "A".to_string(), "B".to_string()],
            100.0,
        );
        tracker.record_activity("A", 0.0);

        let report = uptime_report(&tracker, 50.0);
        assert_eq!(
            report,
            "Node B: Never seen\nNode A: ONLINE, last seen 50.00 seconds ago\nNode B: Never seen"
        );
    }

    #[test]
    fn test_empty_tracker_gives_empty_report() {
        let tracker = LivenessTracker::new(Vec::new(), 100.0);
        assert_eq!(uptime_report(&tracker, 0.0), "");
    }
}
