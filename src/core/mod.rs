//! 核心层：存储、排期计算、生命周期控制、撤销历史、时钟

pub mod clock;
pub mod controller;
pub mod error;
pub mod history;
pub mod schedule;
pub mod store;

pub use clock::{spawn_clock_loop, EventClock};
pub use controller::{Engine, ImportMode, SharedEngine};
pub use error::EngineError;
pub use history::HistoryManager;
pub use store::{AgendaStore, Document, StoreEvent};
