//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `RUNDOWN__*` 覆盖（双下划线表示嵌套，
//! 如 `RUNDOWN__STORAGE__STATE_PATH=/var/lib/rundown/state.json`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub history: HistorySection,
    #[serde(default)]
    pub clock: ClockSection,
}

/// [app] 段：活动名称
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    /// 活动名称，显示层与导出文件名会用到
    #[serde(default = "default_event_name")]
    pub event_name: String,
}

fn default_event_name() -> String {
    "Untitled Event".to_string()
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            event_name: default_event_name(),
        }
    }
}

/// [storage] 段：持久化文件位置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSection {
    /// 文档快照写入路径，未设置时用 ./data/rundown.json
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
}

fn default_state_path() -> PathBuf {
    PathBuf::from("data/rundown.json")
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            state_path: default_state_path(),
        }
    }
}

/// [history] 段：撤销栈容量
#[derive(Debug, Clone, Deserialize)]
pub struct HistorySection {
    /// 撤销栈最多保留多少帧，超出后淘汰最旧的
    #[serde(default = "default_undo_capacity")]
    pub undo_capacity: usize,
}

fn default_undo_capacity() -> usize {
    50
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            undo_capacity: default_undo_capacity(),
        }
    }
}

/// [clock] 段：时钟节拍与模拟步长
#[derive(Debug, Clone, Deserialize)]
pub struct ClockSection {
    /// 节拍周期（秒）
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
    /// 模拟时间模式下每个节拍前进多少秒
    #[serde(default = "default_simulation_step_secs")]
    pub simulation_step_secs: i64,
}

fn default_tick_interval_secs() -> u64 {
    1
}

fn default_simulation_step_secs() -> i64 {
    1
}

impl Default for ClockSection {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
            simulation_step_secs: default_simulation_step_secs(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSection::default(),
            storage: StorageSection::default(),
            history: HistorySection::default(),
            clock: ClockSection::default(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 RUNDOWN__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 RUNDOWN__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("RUNDOWN")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.history.undo_capacity, 50);
        assert_eq!(cfg.clock.tick_interval_secs, 1);
        assert_eq!(cfg.clock.simulation_step_secs, 1);
        assert_eq!(cfg.storage.state_path, PathBuf::from("data/rundown.json"));
    }
}
