// src/cli/check_config.rs
//! Check-config 命令 - 打印生效的配置

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::config::BridgeConfig;

/// Check-config 命令参数
#[derive(Args)]
pub struct CheckConfigArgs {
    /// 配置文件 (默认: ~/.config/mesh-uptime/config.json)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// 输出 JSON 格式
    #[arg(long)]
    pub json: bool,
}

/// 生效配置摘要
#[derive(Debug, Serialize)]
pub struct ConfigSummary {
    pub tracked_nodes: Vec<String>,
    pub offline_threshold: f64,
    pub alert_room_id: Option<String>,
    /// "matrix" 或 "console"
    pub channel: String,
    pub homeserver: Option<String>,
}

impl ConfigSummary {
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self {
            tracked_nodes: config.uptime.tracked_nodes.clone(),
            offline_threshold: config.uptime.offline_threshold,
            alert_room_id: config.uptime.alert_room().map(str::to_string),
            channel: if config.matrix.is_some() { "matrix" } else { "console" }.to_string(),
            homeserver: config.matrix.as_ref().map(|m| m.homeserver.clone()),
        }
    }

    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("Tracked nodes: {}", self.tracked_nodes.len()),
        ];
        for node_id in &self.tracked_nodes {
            lines.push(format!("  - {}", node_id));
        }
        lines.push(format!("Offline threshold: {} seconds", self.offline_threshold));
        lines.push(format!(
            "Alert room: {}",
            self.alert_room_id.as_deref().unwrap_or("(disabled)")
        ));
        match &self.homeserver {
            Some(homeserver) => lines.push(format!("Channel: {} ({})", self.channel, homeserver)),
            None => lines.push(format!("Channel: {}", self.channel)),
        }
        lines.join("\n")
    }
}

/// 处理 check-config 命令
pub fn handle_check_config(args: CheckConfigArgs) -> Result<()> {
    let config = BridgeConfig::load_or_default(args.config.as_deref())?;
    let summary = ConfigSummary::from_config(&config);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.render());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UptimeConfig;

    #[test]
    fn test_summary_render() {
        let config = BridgeConfig {
            matrix: None,
            uptime: UptimeConfig {
                tracked_nodes: vec!["!a1b2c3d4".to_string()],
                offline_threshold: 600.0,
                alert_room_id: None,
            },
        };
        let rendered = ConfigSummary::from_config(&config).render();

        assert!(rendered.contains("Tracked nodes: 1"));
        assert!(rendered.contains("  - !a1b2c3d4"));
        assert!(rendered.contains("Offline threshold: 600 seconds"));
        assert!(rendered.contains("Alert room: (disabled)"));
        assert!(rendered.ends_with("Channel: console"));
    }
}
