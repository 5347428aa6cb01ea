//! 引擎错误类型
//!
//! 错误分层：未知 ID 的操作静默 no-op（不产生错误）；校验拒绝用 bool 返回值
//! 表达；存储失败在 persist 层被捕获并记日志。这里只定义需要向调用方传递
//! 细节的错误（导入格式、损坏的历史帧）。

use thiserror::Error;

/// 引擎运行过程中可能出现的错误
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Import format error at line {line}: {message}")]
    ImportFormat { line: usize, message: String },

    #[error("Corrupt history frame: {0}")]
    CorruptFrame(String),
}
