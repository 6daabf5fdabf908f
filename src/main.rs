//! Mesh Uptime CLI
//!
//! 跟踪 mesh 节点在线状态，离线时向 Matrix 房间发送告警

use anyhow::Result;
use clap::{Parser, Subcommand};
use mesh_uptime::cli::{handle_check_config, handle_run, CheckConfigArgs, RunArgs};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "mesh-uptime")]
#[command(about = "Mesh Uptime - 监控 mesh 节点在线状态并发送离线告警")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 从 stdin 读取 bridge 事件，监控节点并回复 !uptime 命令
    Run(RunArgs),
    /// 打印生效的配置
    CheckConfig(CheckConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // 通过 RUST_LOG 环境变量控制日志级别，默认为 info
    // 例如: RUST_LOG=debug mesh-uptime run
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mesh_uptime=info,mesh-uptime=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => handle_run(args).await?,
        Commands::CheckConfig(args) => handle_check_config(args)?,
    }

    Ok(())
}
