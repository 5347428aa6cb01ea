//! 活动时钟：1 秒节拍、模拟时间模式
//!
//! 节拍是引擎唯一的后台活动：推进「当前时间」（真实时钟或模拟步进），并为
//! 正在进行的条目重算已用秒数（用 当前时间 - 实际开始 求差，不做自增累加，
//! 避免漂移）。节拍任务用 CancellationToken 收口，关闭时不留悬挂任务。

use chrono::{DateTime, Duration, Utc};
use tokio_util::sync::CancellationToken;

use crate::core::controller::SharedEngine;

/// 当前时间源：真实时钟，或可暂停的模拟时钟
#[derive(Debug, Clone)]
pub struct EventClock {
    current: DateTime<Utc>,
    simulated: bool,
    paused: bool,
    /// 模拟模式下每个节拍前进的秒数
    step_secs: i64,
}

impl EventClock {
    pub fn new(step_secs: i64) -> Self {
        Self {
            current: Utc::now(),
            simulated: false,
            paused: false,
            step_secs: step_secs.max(1),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.current
    }

    pub fn is_simulated(&self) -> bool {
        self.simulated
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// 一个节拍：模拟模式未暂停时步进固定秒数，否则对齐真实时钟
    pub fn tick(&mut self) {
        if self.simulated {
            if !self.paused {
                self.current += Duration::seconds(self.step_secs);
            }
        } else {
            self.current = Utc::now();
        }
    }

    /// 切换模拟模式；退出模拟时同时解除暂停
    pub fn toggle_simulation(&mut self) {
        self.simulated = !self.simulated;
        if !self.simulated {
            self.paused = false;
        }
    }

    /// 跳到指定时刻并进入模拟模式
    pub fn set_simulation_time(&mut self, time: DateTime<Utc>) {
        self.simulated = true;
        self.current = time;
    }

    /// 暂停 / 恢复模拟时钟（真实时钟模式下无效果，tick 仍会对齐）
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }
}

impl Default for EventClock {
    fn default() -> Self {
        Self::new(1)
    }
}

/// 启动节拍循环：每 `interval_secs` 秒驱动一次 [`Engine::tick`]，token 取消即退出
///
/// 返回任务句柄，调用方可在关闭流程里 await 它确保循环已停。
pub fn spawn_clock_loop(
    engine: SharedEngine,
    token: CancellationToken,
    interval_secs: u64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs.max(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!("Clock loop stopped");
                    break;
                }
                _ = ticker.tick() => {
                    engine.write().await.tick();
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_simulated_tick_steps_forward() {
        let mut clock = EventClock::new(1);
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        clock.set_simulation_time(t);
        clock.tick();
        clock.tick();
        assert_eq!(clock.now(), t + Duration::seconds(2));
    }

    #[test]
    fn test_paused_simulation_holds_still() {
        let mut clock = EventClock::new(1);
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        clock.set_simulation_time(t);
        clock.toggle_pause();
        clock.tick();
        assert_eq!(clock.now(), t);
    }

    #[test]
    fn test_leaving_simulation_unpauses() {
        let mut clock = EventClock::new(1);
        clock.set_simulation_time(Utc::now());
        clock.toggle_pause();
        assert!(clock.is_paused());
        clock.toggle_simulation();
        assert!(!clock.is_simulated());
        assert!(!clock.is_paused());
    }
}
