//! 撤销 / 重做历史
//!
//! 两个序列化快照栈：撤销栈有容量上限（超出淘汰最旧帧），重做栈不设上限、
//! 在任何新快照产生时清空。恢复进行中 `snapshot()` 为 no-op，避免把一次
//! 恢复又记成新历史。帧是条目列表的 serde_json 文本，时间戳按 schema 走
//! chrono 的 RFC 3339 serde，序列化往返必还原同一瞬间。

use crate::core::error::EngineError;
use crate::model::AgendaItem;

/// 撤销 / 重做管理器
pub struct HistoryManager {
    undo_stack: Vec<String>,
    redo_stack: Vec<String>,
    capacity: usize,
    restoring: bool,
}

impl HistoryManager {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            capacity: capacity.max(1),
            restoring: false,
        }
    }

    /// 把当前条目列表压入撤销栈并清空重做栈；恢复进行中则 no-op
    pub fn snapshot(&mut self, items: &[AgendaItem]) {
        if self.restoring {
            return;
        }
        match serde_json::to_string(items) {
            Ok(frame) => {
                self.undo_stack.push(frame);
                if self.undo_stack.len() > self.capacity {
                    self.undo_stack.remove(0);
                }
                self.redo_stack.clear();
            }
            Err(e) => {
                tracing::warn!("Failed to serialize history frame: {}", e);
            }
        }
    }

    /// 弹出撤销帧并解码；当前状态被压入重做栈
    ///
    /// 损坏的帧解码失败时被丢弃（记 warn 日志），当前状态不动、重做栈不变。
    pub fn undo(&mut self, current: &[AgendaItem]) -> Option<Vec<AgendaItem>> {
        let frame = self.undo_stack.pop()?;
        match decode_frame(&frame) {
            Ok(items) => {
                if let Ok(now) = serde_json::to_string(current) {
                    self.redo_stack.push(now);
                }
                Some(items)
            }
            Err(e) => {
                tracing::warn!("Dropping corrupt undo frame: {}", e);
                None
            }
        }
    }

    /// [`HistoryManager::undo`] 的对称操作
    pub fn redo(&mut self, current: &[AgendaItem]) -> Option<Vec<AgendaItem>> {
        let frame = self.redo_stack.pop()?;
        match decode_frame(&frame) {
            Ok(items) => {
                if let Ok(now) = serde_json::to_string(current) {
                    self.undo_stack.push(now);
                }
                Some(items)
            }
            Err(e) => {
                tracing::warn!("Dropping corrupt redo frame: {}", e);
                None
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// 标记恢复开始（期间 snapshot 为 no-op）
    pub fn begin_restore(&mut self) {
        self.restoring = true;
    }

    pub fn end_restore(&mut self) {
        self.restoring = false;
    }

    /// 清空双栈（重置数据用）
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    #[cfg(test)]
    fn push_raw_undo(&mut self, frame: String) {
        self.undo_stack.push(frame);
    }
}

fn decode_frame(frame: &str) -> Result<Vec<AgendaItem>, EngineError> {
    serde_json::from_str(frame).map_err(|e| EngineError::CorruptFrame(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn items(n: usize) -> Vec<AgendaItem> {
        (0..n)
            .map(|i| AgendaItem::new(format!("Item {}", i), "-", Utc::now(), 10).with_order(i))
            .collect()
    }

    #[test]
    fn test_undo_restores_previous_state() {
        let mut history = HistoryManager::new(50);
        let before = items(2);
        history.snapshot(&before);

        let mut after = before.clone();
        after[0].title = "Changed".into();

        let restored = history.undo(&after).unwrap();
        assert_eq!(restored, before);
        assert!(history.can_redo());

        let redone = history.redo(&restored).unwrap();
        assert_eq!(redone, after);
    }

    #[test]
    fn test_snapshot_clears_redo() {
        let mut history = HistoryManager::new(50);
        let a = items(1);
        history.snapshot(&a);
        let _ = history.undo(&a).unwrap();
        assert!(history.can_redo());

        history.snapshot(&a);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = HistoryManager::new(3);
        for i in 0..5 {
            history.snapshot(&items(i + 1));
        }
        // 最旧的两帧被淘汰，留下 3/4/5 个条目的帧
        let current = items(0);
        assert_eq!(history.undo(&current).unwrap().len(), 5);
        assert_eq!(history.undo(&current).unwrap().len(), 4);
        assert_eq!(history.undo(&current).unwrap().len(), 3);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_snapshot_blocked_while_restoring() {
        let mut history = HistoryManager::new(50);
        history.begin_restore();
        history.snapshot(&items(1));
        history.end_restore();
        assert!(!history.can_undo());
    }

    #[test]
    fn test_corrupt_frame_dropped_not_fatal() {
        let mut history = HistoryManager::new(50);
        history.snapshot(&items(1));
        history.push_raw_undo("not json {{".into());

        let current = items(2);
        // 损坏帧被丢弃，重做栈不被污染
        assert!(history.undo(&current).is_none());
        assert!(!history.can_redo());
        // 下面那帧完好
        assert_eq!(history.undo(&current).unwrap().len(), 1);
    }
}
