//! 存活清扫任务。
//!
//! 周期性扫描注册表，移除超过存活超时的会话并广播离开公告。
//! 单个参与者的失败只记录日志，不中断同一轮清扫。

use std::sync::Arc;
use std::time::Duration;

use domain::{Message, MessageText, RecipientName, Timestamp};
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::error::ApplicationResult;
use crate::repository::{MessageLog, ParticipantRegistry};
use crate::services::DEPARTURE_TEXT;

#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// 清扫周期（缺省 15 秒），固定不退避
    pub sweep_interval: Duration,
    /// 无心跳的最大静默时长（缺省 10 秒）
    pub liveness_timeout: Duration,
    /// 广播哨兵名称
    pub sentinel: RecipientName,
}

pub struct EvictionSweeper {
    registry: Arc<dyn ParticipantRegistry>,
    log: Arc<dyn MessageLog>,
    clock: Arc<dyn Clock>,
    config: SweeperConfig,
    is_running: Arc<RwLock<bool>>,
}

impl EvictionSweeper {
    pub fn new(
        registry: Arc<dyn ParticipantRegistry>,
        log: Arc<dyn MessageLog>,
        clock: Arc<dyn Clock>,
        config: SweeperConfig,
    ) -> Self {
        Self {
            registry,
            log,
            clock,
            config,
            is_running: Arc::new(RwLock::new(false)),
        }
    }

    /// 启动后台清扫循环。重复调用是空操作。
    pub async fn start(&self) {
        {
            let mut running = self.is_running.write().await;
            if *running {
                return;
            }
            *running = true;
        }

        let registry = Arc::clone(&self.registry);
        let log = Arc::clone(&self.log);
        let clock = Arc::clone(&self.clock);
        let config = self.config.clone();
        let running = Arc::clone(&self.is_running);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(config.sweep_interval);

            while *running.read().await {
                interval.tick().await;

                match Self::sweep(&registry, &log, &clock, &config).await {
                    Ok(0) => {}
                    Ok(evicted) => info!(evicted, "sweep evicted idle participants"),
                    Err(err) => error!(error = %err, "sweep pass failed"),
                }
            }

            info!("eviction sweeper stopped");
        });

        info!(
            interval_ms = self.config.sweep_interval.as_millis() as u64,
            timeout_ms = self.config.liveness_timeout.as_millis() as u64,
            "eviction sweeper started"
        );
    }

    /// 停止调度后续清扫。进程关闭之外唯一需要的收尾动作。
    pub async fn stop(&self) {
        let mut running = self.is_running.write().await;
        *running = false;
    }

    /// 执行一轮扫描并返回被移除的参与者数量。测试可直接调用。
    pub async fn sweep_once(&self) -> ApplicationResult<usize> {
        Self::sweep(&self.registry, &self.log, &self.clock, &self.config).await
    }

    async fn sweep(
        registry: &Arc<dyn ParticipantRegistry>,
        log: &Arc<dyn MessageLog>,
        clock: &Arc<dyn Clock>,
        config: &SweeperConfig,
    ) -> ApplicationResult<usize> {
        let now = clock.now();
        let deadline = deadline_for(now, config.liveness_timeout);
        let departure = MessageText::parse(DEPARTURE_TEXT)?;

        let participants = registry.list().await?;
        let mut evicted = 0;

        for participant in participants {
            if !participant.expired_by(deadline) {
                continue;
            }

            // 移除时在存储锁内复查截止线，不会清掉刚刷新过心跳的会话
            let removed = match registry
                .remove_if_expired(&participant.name, deadline)
                .await
            {
                Ok(removed) => removed,
                Err(err) => {
                    warn!(
                        name = %participant.name,
                        error = %err,
                        "failed to evict participant, continuing sweep"
                    );
                    continue;
                }
            };
            let Some(removed) = removed else {
                continue;
            };
            evicted += 1;

            let status = Message::status(
                removed.name.clone(),
                config.sentinel.clone(),
                departure.clone(),
                now,
            );
            if let Err(err) = log.append(status).await {
                // 移除已经发生；公告失败必须留下痕迹而不是让清扫崩溃
                error!(
                    name = %removed.name,
                    error = %err,
                    "participant evicted but departure status could not be appended"
                );
            } else {
                info!(name = %removed.name, "participant evicted");
            }
        }

        Ok(evicted)
    }
}

fn deadline_for(now: Timestamp, liveness_timeout: Duration) -> Timestamp {
    now - chrono::Duration::milliseconds(liveness_timeout.as_millis() as i64)
}
