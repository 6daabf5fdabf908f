// src/cli/run.rs
//! Run 命令 - 从 stdin 读取 bridge 事件并驱动 uptime monitor

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::event::BridgeEvent;
use crate::liveness::{now_secs, UptimeMonitor};
use crate::notification::{ChatChannel, ConsoleChannel, MatrixChannel};

/// Run 命令参数
#[derive(Args)]
pub struct RunArgs {
    /// 配置文件 (默认: ~/.config/mesh-uptime/config.json)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// 只打印消息，不发送到 Matrix
    #[arg(long)]
    pub dry_run: bool,

    /// dry-run 时以 JSON 行输出
    #[arg(long)]
    pub json: bool,
}

/// 选择本次运行使用的发送渠道
pub fn build_channel(config: &BridgeConfig, dry_run: bool, json: bool) -> Result<Arc<dyn ChatChannel>> {
    match (&config.matrix, dry_run) {
        (Some(matrix), false) => {
            let channel = MatrixChannel::new(matrix.clone()).context("invalid matrix config")?;
            info!(channel = "matrix", homeserver = %matrix.homeserver, "Using Matrix channel");
            Ok(Arc::new(channel))
        }
        _ => {
            info!(channel = "console", "Using console channel");
            Ok(Arc::new(ConsoleChannel::new().with_json(json)))
        }
    }
}

/// 把一条 bridge 事件交给 monitor 处理
pub async fn dispatch_event(monitor: &UptimeMonitor, event: BridgeEvent) {
    match event {
        BridgeEvent::Packet { packet } => {
            monitor.handle_packet(&packet, now_secs());
        }
        BridgeEvent::RoomMessage { room_id, body } => {
            if monitor.handle_room_message(&room_id, &body).await {
                debug!(room_id = %room_id, "Uptime command handled");
            }
        }
    }
}

/// 处理 run 命令
pub async fn handle_run(args: RunArgs) -> Result<()> {
    let config = BridgeConfig::load_or_default(args.config.as_deref())?;
    let channel = build_channel(&config, args.dry_run, args.json)?;

    let monitor = Arc::new(UptimeMonitor::new(&config.uptime, channel));
    let handle = monitor.start();

    info!(
        tracked = config.uptime.tracked_nodes.len(),
        threshold = config.uptime.offline_threshold,
        "Reading bridge events from stdin"
    );

    // 只创建一次，避免两次循环之间丢失信号
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Interrupted, shutting down");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    info!("Event stream closed, shutting down");
                    break;
                };
                match BridgeEvent::parse_line(&line) {
                    Ok(Some(event)) => dispatch_event(&monitor, event).await,
                    Ok(None) => {}
                    Err(e) => debug!(error = %e, "Skipping unparseable event line"),
                }
            }
        }
    }

    if let Some(handle) = handle {
        handle.stop().await;
    } else {
        warn!("No tracked_nodes configured, nothing was monitored");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UptimeConfig;
    use crate::notification::MatrixConfig;

    #[test]
    fn test_build_channel_defaults_to_console() {
        let channel = build_channel(&BridgeConfig::default(), false, false).unwrap();
        assert_eq!(channel.name(), "console");
    }

    #[test]
    fn test_build_channel_dry_run_overrides_matrix() {
        let config = BridgeConfig {
            matrix: Some(MatrixConfig {
                access_token: "token".to_string(),
                ..Default::default()
            }),
            uptime: UptimeConfig::default(),
        };
        assert_eq!(build_channel(&config, true, false).unwrap().name(), "console");
        assert_eq!(build_channel(&config, false, false).unwrap().name(), "matrix");
    }

    #[test]
    fn test_build_channel_rejects_missing_token() {
        let config = BridgeConfig {
            matrix: Some(MatrixConfig::default()),
            uptime: UptimeConfig::default(),
        };
        assert!(build_channel(&config, false, false).is_err());
    }
}
