//! 主应用程序入口
//!
//! 组装中继核心：内存存储、会话命令服务与存活清扫任务。
//! HTTP 传输层是外部协作者，由它把请求解码成 `RelayService` 的调用。

use std::sync::Arc;

use application::{
    EvictionSweeper, InMemoryMessageLog, InMemoryParticipantRegistry, RelayDependencies,
    RelayService, SweeperConfig, SystemClock,
};
use config::AppConfig;
use domain::RecipientName;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let app_config = AppConfig::from_env();
    let sentinel = RecipientName::parse(&app_config.relay.broadcast_sentinel)?;

    // 存储协作者：启动时构造一次，进程存续期间持有
    let registry: Arc<dyn application::ParticipantRegistry> =
        Arc::new(InMemoryParticipantRegistry::new());
    let log: Arc<dyn application::MessageLog> = Arc::new(InMemoryMessageLog::new());
    let clock: Arc<dyn application::Clock> = Arc::new(SystemClock);

    let service = Arc::new(RelayService::new(RelayDependencies {
        registry: registry.clone(),
        log: log.clone(),
        clock: clock.clone(),
        sentinel: sentinel.clone(),
    }));

    let sweeper = EvictionSweeper::new(
        registry,
        log,
        clock,
        SweeperConfig {
            sweep_interval: app_config.relay.sweep_interval(),
            liveness_timeout: app_config.relay.liveness_timeout(),
            sentinel,
        },
    );
    sweeper.start().await;

    tracing::info!(
        host = %app_config.server.host,
        port = app_config.server.port,
        "relay core ready, waiting for transport layer"
    );

    // 传输层在这里接管 `service`；核心自身只需要守住进程生命周期
    let _service = service;
    tokio::signal::ctrl_c().await?;

    tracing::info!("shutdown requested, stopping sweeper");
    sweeper.stop().await;

    Ok(())
}
