//! Rundown - 活动流程管控引擎
//!
//! 入口：初始化日志、加载配置、从存档（或种子数据）建立引擎，启动 1 秒
//! 节拍循环，收到 Ctrl+C 后收口节拍任务退出。存档本身随每次变更写穿，
//! 关闭时无需额外落盘。

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rundown::config::load_config;
use rundown::persist::DocumentPersistence;
use rundown::{spawn_clock_loop, Engine};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志：默认 info，可通过 RUST_LOG 覆盖
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .with(fmt::layer())
        .init();

    let config = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {}", e);
        Default::default()
    });

    let persistence = DocumentPersistence::new(&config.storage.state_path);
    let engine = Engine::with_persistence(&config, persistence).into_shared();

    {
        let guard = engine.read().await;
        tracing::info!(
            "Rundown ready: event '{}', {} agenda items",
            guard.document().event_name,
            guard.sorted_items().len()
        );
    }

    // 节拍循环：推进当前时间、维护进行中条目的已用秒数
    let token = CancellationToken::new();
    let clock_task = spawn_clock_loop(engine.clone(), token.clone(), config.clock.tick_interval_secs);

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;
    tracing::info!("Received Ctrl+C, shutting down...");

    token.cancel();
    clock_task.await.context("Clock task panicked")?;

    Ok(())
}
