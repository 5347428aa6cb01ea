//! Rundown - 活动流程管控引擎
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **model**: 数据模型（议程条目、提醒、变更日志）
//! - **core**: 存储、排期计算、生命周期控制、撤销历史、时钟
//! - **persist**: 文档持久化与种子数据
//! - **exchange**: CSV 导入 / 导出（报表与可编辑流程单）
//!
//! UI / 展示层不在本 crate 内：外部协作方通过 [`Engine`] 的查询与命令
//! 接口驱动引擎，引擎本身不感知渲染方式。

pub mod config;
pub mod core;
pub mod exchange;
pub mod model;
pub mod persist;

pub use crate::core::clock::{spawn_clock_loop, EventClock};
pub use crate::core::controller::{Engine, ImportMode, SharedEngine};
pub use crate::core::error::EngineError;
pub use crate::core::history::HistoryManager;
pub use crate::core::schedule::{estimated_start_times, replan_start_times};
pub use crate::core::store::{AgendaStore, Document, StoreEvent};
pub use crate::model::{AgendaItem, AgendaStatus, ChangeKind, ChangeLogEntry, Reminder};
