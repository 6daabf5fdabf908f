//! 节点存活跟踪 - 记录最后活跃时间和告警标记

use std::collections::{HashMap, HashSet};

use super::report::NodeStatus;

/// 默认离线阈值（秒）
pub const DEFAULT_OFFLINE_THRESHOLD: f64 = 1800.0;

/// 记录活动事件的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    /// 节点不在跟踪列表中，未做任何修改
    Ignored,
    /// 已更新最后活跃时间
    Recorded,
    /// 已更新最后活跃时间，并清除了未恢复的离线告警
    Recovered,
}

/// 节点存活状态
///
/// 保存每个被跟踪节点的最后活跃时间，以及本次离线是否已经发送过告警。
#[derive(Debug, Clone)]
pub struct LivenessTracker {
    /// 按配置顺序排列的节点 ID（可能有重复）
    tracked: Vec<String>,
    /// `tracked` 的查找集合
    tracked_set: HashSet<String>,
    /// 离线阈值（秒）
    threshold: f64,
    /// 每个节点最近一次活动时间
    last_seen: HashMap<String, f64>,
    /// 已发送离线告警、尚未恢复的节点
    alerted: HashSet<String>,
}

impl LivenessTracker {
    pub fn new(tracked_nodes: Vec<String>, offline_threshold: f64) -> Self {
        let tracked_set = tracked_nodes.iter().cloned().collect();
        Self {
            tracked: tracked_nodes,
            tracked_set,
            threshold: offline_threshold,
            last_seen: HashMap::new(),
            alerted: HashSet::new(),
        }
    }

    /// 按配置顺序返回被跟踪节点
    pub fn tracked_nodes(&self) -> &[String] {
        &self.tracked
    }

    pub fn is_tracked(&self, node_id: &str) -> bool {
        self.tracked_set.contains(node_id)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// 记录 `node_id` 在 `now` 时刻有活动
    ///
    /// 未跟踪的节点直接忽略。即使 `now` 比之前的时间更早也会覆盖。
    pub fn record_activity(&mut self, node_id: &str, now: f64) -> Activity {
        if !self.is_tracked(node_id) {
            return Activity::Ignored;
        }

        self.last_seen.insert(node_id.to_string(), now);
        if self.clear_alert(node_id) {
            Activity::Recovered
        } else {
            Activity::Recorded
        }
    }

    /// 距最后活跃的秒数，从未出现过则为 `None`
    pub fn downtime(&self, node_id: &str, now: f64) -> Option<f64> {
        self.last_seen.get(node_id).map(|last| now - last)
    }

    /// 静默时间是否超过阈值
    ///
    /// 从未出现过的节点没有基准时间，不算离线。
    pub fn is_offline(&self, node_id: &str, now: f64) -> bool {
        self.downtime(node_id, now)
            .is_some_and(|downtime| downtime > self.threshold)
    }

    pub fn is_alerted(&self, node_id: &str) -> bool {
        self.alerted.contains(node_id)
    }

    /// 标记为已告警，已标记过则返回 false
    pub fn mark_alerted(&mut self, node_id: &str) -> bool {
        self.alerted.insert(node_id.to_string())
    }

    /// 清除告警标记，原本未告警则返回 false
    pub fn clear_alert(&mut self, node_id: &str) -> bool {
        self.alerted.remove(node_id)
    }

    /// 状态报告用的节点分类
    pub fn status(&self, node_id: &str, now: f64) -> NodeStatus {
        match self.downtime(node_id, now) {
            None => NodeStatus::NeverSeen,
            Some(downtime) if downtime > self.threshold => NodeStatus::Offline { downtime },
            Some(downtime) => NodeStatus::Online { since: downtime },
        }
    }

    /// 找出已离线且尚未告警的节点并逐个标记为已告警
    ///
    /// 按配置顺序返回 `(node_id, downtime)`。
    pub fn take_newly_offline(&mut self, now: f64) -> Vec<(String, f64)> {
        let tracked = self.tracked.clone();
        let mut newly_offline = Vec::new();

        for node_id in tracked {
            if self.is_alerted(&node_id) || !self.is_offline(&node_id, now) {
                continue;
            }
            let Some(downtime) = self.downtime(&node_id, now) else {
                continue;
            };
            self.mark_alerted(&node_id);
            newly_offline.push((node_id, downtime));
        }

        newly_offline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(threshold: f64) -> LivenessTracker {
        LivenessTracker::new(vec!["A".to_string(), "B".to_string()], threshold)
    }

    #[test]
    fn test_untracked_node_is_ignored() {
        let mut t = tracker(100.0);

        assert_eq!(t.record_activity("Z", 10.0), Activity::Ignored);
        assert_eq!(t.downtime("Z", 20.0), None);
        assert!(!t.is_offline("Z", 1000.0));
        assert!(t.take_newly_offline(1000.0).is_empty());
    }

    #[test]
    fn test_offline_boundary() {
        let mut t = tracker(100.0);
        t.record_activity("A", 0.0);

        assert!(!t.is_offline("A", 0.0));
        assert!(!t.is_offline("A", 100.0)); // 恰好等于阈值仍算在线
        assert!(t.is_offline("A", 100.5));
    }

    #[test]
    fn test_never_seen_is_not_offline() {
        let t = tracker(100.0);
        assert_eq!(t.downtime("B", 5000.0), None);
        assert!(!t.is_offline("B", 5000.0));
        assert_eq!(t.status("B", 5000.0), NodeStatus::NeverSeen);
    }

    #[test]
    fn test_older_timestamp_still_overwrites() {
        let mut t = tracker(100.0);
        t.record_activity("A", 50.0);
        t.record_activity("A", 10.0);

        assert_eq!(t.downtime("A", 60.0), Some(50.0));
    }

    #[test]
    fn test_activity_clears_alert() {
        let mut t = tracker(100.0);
        t.record_activity("A", 0.0);
        assert!(t.mark_alerted("A"));
        assert!(!t.mark_alerted("A"));

        assert_eq!(t.record_activity("A", 5.0), Activity::Recovered);
        assert!(!t.is_alerted("A"));
        assert_eq!(t.record_activity("A", 6.0), Activity::Recorded);
    }

    #[test]
    fn test_clear_alert() {
        let mut t = tracker(100.0);
        assert!(!t.clear_alert("A"));

        t.mark_alerted("A");
        assert!(t.clear_alert("A"));
        assert!(!t.is_alerted("A"));
        assert!(!t.clear_alert("A"));
    }

    #[test]
    fn test_cleared_alert_can_fire_again() {
        let mut t = tracker(100.0);
        t.record_activity("A", 0.0);
        assert_eq!(t.take_newly_offline(150.0).len(), 1);

        // 手动清除后同一段离线会再次告警
        t.clear_alert("A");
        assert_eq!(t.take_newly_offline(160.0), vec![("A".to_string(), 160.0)]);
        assert!(t.is_alerted("A"));
    }

    #[test]
    fn test_take_newly_offline_once_per_episode() {
        let mut t = tracker(100.0);
        t.record_activity("A", 0.0);

        assert_eq!(t.take_newly_offline(150.0), vec![("A".to_string(), 150.0)]);
        assert!(t.take_newly_offline(200.0).is_empty());

        t.record_activity("A", 160.0);
        assert!(t.take_newly_offline(200.0).is_empty());
        assert_eq!(t.take_newly_offline(300.0), vec![("A".to_string(), 140.0)]);
    }

    #[test]
    fn test_duplicate_tracked_ids_alert_once() {
        let mut t = LivenessTracker::new(
            vec!["A".to_string(), "A".to_string()],
            10.0,
        );
        t.record_activity("A", 0.0);

        assert_eq!(t.take_newly_offline(20.0).len(), 1);
    }

    #[test]
    fn test_status_classification() {
        let mut t = tracker(100.0);
        t.record_activity("A", 0.0);

        assert_eq!(t.status("A", 50.0), NodeStatus::Online { since: 50.0 });
        assert_eq!(t.status("A", 150.0), NodeStatus::Offline { downtime: 150.0 });
    }
}
