//! 生命周期控制：引擎的命令与查询面
//!
//! [`Engine`] 持有存储、撤销历史与时钟，是唯一的变更入口。除提醒与笔记
//! 编辑外，每个变更操作都在改动前先做历史快照；未知 ID 静默 no-op（不快
//! 照、不记日志）；校验拒绝返回 false 并记 warn。每次变更结束后写穿持久化
//! （尽力而为，失败只记日志）。
//!
//! 并发模型：单一逻辑操作者，方法全部 `&mut self`；跨任务共享（命令侧 +
//! 时钟节拍）时包一层 [`SharedEngine`]。

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::core::clock::EventClock;
use crate::core::history::HistoryManager;
use crate::core::schedule;
use crate::core::store::{AgendaStore, Document};
use crate::model::{
    format_clock, AgendaDraft, AgendaId, AgendaItem, AgendaPatch, AgendaStatus, ChangeKind,
    ChangeLogEntry, Reminder, ReminderPatch,
};
use crate::persist::{seed, DocumentPersistence};

/// 跨任务共享的引擎句柄
pub type SharedEngine = Arc<RwLock<Engine>>;

/// 批量导入模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// 整体替换现有条目
    Replace,
    /// 追加到末尾
    Append,
}

/// 流程引擎
pub struct Engine {
    store: AgendaStore,
    history: HistoryManager,
    clock: EventClock,
    /// 进行中条目的已用秒数（节拍里按 当前时间 - 实际开始 推导）
    elapsed_seconds: i64,
    persistence: Option<DocumentPersistence>,
}

impl Engine {
    /// 以种子数据启动（不挂持久化）
    pub fn new(config: &AppConfig) -> Self {
        let clock = EventClock::new(config.clock.simulation_step_secs);
        let base = seed::seed_base_time(clock.now());
        Self::with_items_and_clock(config, seed::seed_items(base), clock)
    }

    /// 以给定条目启动（测试与嵌入方用）
    pub fn with_items(config: &AppConfig, items: Vec<AgendaItem>) -> Self {
        let clock = EventClock::new(config.clock.simulation_step_secs);
        Self::with_items_and_clock(config, items, clock)
    }

    /// 从持久化存档启动；存档缺失或损坏时回退种子数据
    pub fn with_persistence(config: &AppConfig, persistence: DocumentPersistence) -> Self {
        let clock = EventClock::new(config.clock.simulation_step_secs);
        let base = seed::seed_base_time(clock.now());
        let items = persistence.load_or_seed(base);
        let mut engine = Self::with_items_and_clock(config, items, clock);
        engine.persistence = Some(persistence);
        // 存档可能来自更早的时刻，恢复后把计划时间重排自洽
        engine.replan();
        engine
    }

    fn with_items_and_clock(config: &AppConfig, items: Vec<AgendaItem>, clock: EventClock) -> Self {
        Self {
            store: AgendaStore::new(config.app.event_name.clone(), items),
            history: HistoryManager::new(config.history.undo_capacity),
            clock,
            elapsed_seconds: 0,
            persistence: None,
        }
    }

    /// 包成跨任务共享句柄
    pub fn into_shared(self) -> SharedEngine {
        Arc::new(RwLock::new(self))
    }

    // ===== 查询面 =====

    pub fn document(&self) -> &Document {
        self.store.document()
    }

    pub fn store(&self) -> &AgendaStore {
        &self.store
    }

    pub fn item(&self, id: &str) -> Option<&AgendaItem> {
        self.store.item(id)
    }

    pub fn sorted_items(&self) -> Vec<&AgendaItem> {
        self.store.sorted_items()
    }

    pub fn running_item(&self) -> Option<&AgendaItem> {
        self.store.running_item()
    }

    pub fn selected_item(&self) -> Option<&AgendaItem> {
        self.store.selected_item()
    }

    pub fn change_log(&self) -> &[ChangeLogEntry] {
        self.store.change_log()
    }

    /// 条目 ID -> 预计开始时间，每次调用全量重算
    pub fn estimated_start_times(&self) -> HashMap<AgendaId, DateTime<Utc>> {
        schedule::estimated_start_times(self.store.items())
    }

    pub fn estimated_start_time(&self, id: &str) -> Option<DateTime<Utc>> {
        self.estimated_start_times().get(id).copied()
    }

    pub fn elapsed_seconds(&self) -> i64 {
        self.elapsed_seconds
    }

    pub fn current_time(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn is_simulated(&self) -> bool {
        self.clock.is_simulated()
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ===== 命令面：状态机 =====

    pub fn select(&mut self, id: &str) {
        if self.store.item(id).is_some() {
            self.store.set_selected(Some(id.to_string()));
        }
    }

    /// 开始条目；已终态（done / cancelled）或未知 ID 时 no-op
    ///
    /// 若另一条目正在进行，先同步把它停下（标记为 done，但不记日志、不推进
    /// 选中项），再启动新条目 —— 先停后启，任一时刻至多一个 running。
    pub fn start(&mut self, id: &str) {
        let Some(item) = self.store.item(id) else {
            return;
        };
        if item.status.is_terminal() {
            return;
        }
        self.history.snapshot(self.store.items());

        if let Some(prev_id) = self.store.running_item().map(|a| a.id.clone()) {
            if prev_id != id {
                self.record_stop(&prev_id);
                if let Some(prev) = self.store.item_mut(&prev_id) {
                    prev.status = AgendaStatus::Done;
                }
                tracing::info!("Preempted running item {}", prev_id);
            }
        }

        let now = self.clock.now();
        let title = {
            let Some(item) = self.store.item_mut(id) else {
                return;
            };
            item.status = AgendaStatus::Running;
            item.actual_start_time = Some(now);
            item.title.clone()
        };
        self.elapsed_seconds = 0;

        self.log(ChangeKind::Start, format!("Started at {}", format_clock(now)), id, &title);
        self.store.touch_items();
        self.persist();
    }

    /// 停止条目；`mark_done` 时标记完成、记日志并把选中项推进到下一个
    /// 非取消条目。无论如何都落定实际结束时间与用时，并清零已用秒数。
    pub fn stop(&mut self, id: &str, mark_done: bool) {
        if self.store.item(id).is_none() {
            return;
        }
        self.history.snapshot(self.store.items());
        self.record_stop(id);

        if mark_done {
            let now = self.clock.now();
            let title = {
                let Some(item) = self.store.item_mut(id) else {
                    return;
                };
                item.status = AgendaStatus::Done;
                item.title.clone()
            };
            self.log(ChangeKind::Done, format!("Finished at {}", format_clock(now)), id, &title);
            self.advance_selection(id, |a| a.status != AgendaStatus::Cancelled);
        }

        self.store.touch_items();
        self.persist();
    }

    /// 取消条目；只对 waiting / running 有意义
    pub fn cancel(&mut self, id: &str) {
        let Some(item) = self.store.item(id) else {
            return;
        };
        if item.status.is_terminal() {
            return;
        }
        self.history.snapshot(self.store.items());

        let title = {
            let Some(item) = self.store.item_mut(id) else {
                return;
            };
            if item.status == AgendaStatus::Running {
                self.elapsed_seconds = 0;
            }
            item.status = AgendaStatus::Cancelled;
            item.title.clone()
        };

        self.log(ChangeKind::Cancel, "Cancelled", id, &title);
        self.advance_selection(id, |a| a.status == AgendaStatus::Waiting);
        self.replan();
        self.persist();
    }

    /// 调整计划时长；会把时长压到 1 分钟以下的负增量被拒绝（返回 false、
    /// 不快照、不记日志）
    pub fn adjust_duration(&mut self, id: &str, delta_minutes: i64) -> bool {
        let Some(item) = self.store.item(id) else {
            return false;
        };
        if delta_minutes < 0 && item.planned_duration_minutes + delta_minutes < 1 {
            tracing::warn!("Rejected duration adjustment: minimum is 1 minute");
            return false;
        }
        self.history.snapshot(self.store.items());

        let title = {
            let Some(item) = self.store.item_mut(id) else {
                return false;
            };
            item.planned_duration_minutes = (item.planned_duration_minutes + delta_minutes).max(1);
            item.title.clone()
        };

        let signed = if delta_minutes > 0 {
            format!("+{}", delta_minutes)
        } else {
            delta_minutes.to_string()
        };
        self.log(ChangeKind::Adjust, format!("Duration adjusted {} min", signed), id, &title);
        self.replan();
        self.persist();
        true
    }

    // ===== 命令面：结构编辑 =====

    /// 新建条目；`insert_after` 指定时插在该条目之后（后续 order 顺移）
    pub fn add_item(&mut self, draft: AgendaDraft, insert_after: Option<&str>) -> AgendaId {
        self.history.snapshot(self.store.items());

        let count = self.store.items().len();
        let mut new_order = count;
        let mut start_time = self.clock.now();

        if let Some(after_id) = insert_after {
            let position = {
                let sorted = self.store.sorted_items();
                sorted.iter().position(|a| a.id == after_id)
            };
            if let Some(index) = position {
                new_order = index + 1;
                for item in self.store.items_mut() {
                    if item.order >= new_order {
                        item.order += 1;
                    }
                }
            }
        } else if count == 0 {
            if let Some(planned) = draft.planned_start_time {
                start_time = planned;
            }
        }

        let item = AgendaItem::new(
            draft.title.unwrap_or_else(|| "New agenda".to_string()),
            draft.pic.unwrap_or_else(|| "-".to_string()),
            start_time,
            draft.planned_duration_minutes.unwrap_or(15),
        )
        .with_description(draft.description.unwrap_or_default())
        .with_order(new_order);

        let id = item.id.clone();
        self.store.insert_item(item);
        self.replan();
        self.persist();
        id
    }

    /// 逐字段更新条目；patch 自身校验失败（时长 < 1 分钟）整体拒绝
    pub fn update_item(&mut self, id: &str, patch: AgendaPatch) -> bool {
        if self.store.item(id).is_none() {
            return false;
        }
        if !patch.is_valid() {
            tracing::warn!("Rejected item update: minimum duration is 1 minute");
            return false;
        }
        self.history.snapshot(self.store.items());
        if let Some(item) = self.store.item_mut(id) {
            patch.apply(item);
        }
        self.replan();
        self.persist();
        true
    }

    /// 更新现场笔记（无快照、无日志）
    pub fn update_notes(&mut self, id: &str, notes: impl Into<String>) {
        let Some(item) = self.store.item_mut(id) else {
            return;
        };
        item.notes = notes.into();
        self.store.touch_items();
        self.persist();
    }

    /// 删除条目；存活条目 order 重排稠密，被删条目若是选中项则清空选中
    pub fn delete_item(&mut self, id: &str) {
        if self.store.item(id).is_none() {
            return;
        }
        self.history.snapshot(self.store.items());
        self.store.remove_item(id);
        self.replan();
        self.persist();
    }

    /// 在排序序列内把 `from_index` 的条目移到 `to_index`，并重排全部 order
    pub fn reorder(&mut self, from_index: usize, to_index: usize) {
        let mut ids = self.store.sorted_ids();
        if from_index >= ids.len() {
            return;
        }
        self.history.snapshot(self.store.items());

        let moved = ids.remove(from_index);
        let to = to_index.min(ids.len());
        ids.insert(to, moved.clone());

        for (index, id) in ids.iter().enumerate() {
            if let Some(item) = self.store.item_mut(id) {
                item.order = index;
            }
        }

        let title = self.store.item(&moved).map(|a| a.title.clone()).unwrap_or_default();
        self.log(ChangeKind::Swap, format!("Moved to position {}", to + 1), &moved, &title);
        self.replan();
        self.persist();
    }

    /// 批量导入：替换（order 重排 0..N-1、选中首条）或追加到末尾
    pub fn import_items(&mut self, mut items: Vec<AgendaItem>, mode: ImportMode) {
        if items.is_empty() {
            return;
        }
        self.history.snapshot(self.store.items());
        let count = items.len();

        match mode {
            ImportMode::Replace => {
                for (index, item) in items.iter_mut().enumerate() {
                    item.order = index;
                }
                self.store.replace_items(items);
                self.store.select_first();
            }
            ImportMode::Append => {
                let next_order = self.store.items().iter().map(|a| a.order + 1).max().unwrap_or(0);
                for (index, item) in items.iter_mut().enumerate() {
                    item.order = next_order + index;
                }
                for item in items {
                    self.store.insert_item(item);
                }
            }
        }

        self.replan();
        let first = self
            .store
            .sorted_items()
            .first()
            .map(|a| (a.id.clone(), a.title.clone()));
        if let Some((id, title)) = first {
            self.log(ChangeKind::Adjust, format!("Imported {} items", count), &id, &title);
        }
        self.persist();
    }

    // ===== 命令面：提醒（无快照、无重排） =====

    pub fn add_reminder(&mut self, agenda_id: &str, reminder: Reminder) {
        let Some(item) = self.store.item_mut(agenda_id) else {
            return;
        };
        item.reminders.push(reminder);
        self.store.touch_items();
        self.persist();
    }

    pub fn update_reminder(&mut self, agenda_id: &str, reminder_id: &str, patch: ReminderPatch) {
        let Some(item) = self.store.item_mut(agenda_id) else {
            return;
        };
        let Some(reminder) = item.reminders.iter_mut().find(|r| r.id == reminder_id) else {
            return;
        };
        patch.apply(reminder);
        self.store.touch_items();
        self.persist();
    }

    pub fn delete_reminder(&mut self, agenda_id: &str, reminder_id: &str) {
        let Some(item) = self.store.item_mut(agenda_id) else {
            return;
        };
        item.reminders.retain(|r| r.id != reminder_id);
        self.store.touch_items();
        self.persist();
    }

    // ===== 命令面：历史 =====

    pub fn undo(&mut self) {
        self.history.begin_restore();
        if let Some(items) = self.history.undo(self.store.items()) {
            self.store.replace_items(items);
            self.replan();
            self.persist();
        }
        self.history.end_restore();
    }

    pub fn redo(&mut self) {
        self.history.begin_restore();
        if let Some(items) = self.history.redo(self.store.items()) {
            self.store.replace_items(items);
            self.replan();
            self.persist();
        }
        self.history.end_restore();
    }

    /// 清存储、回种子数据、清历史；确认交互由调用方负责
    pub fn reset(&mut self) {
        if let Some(persistence) = &self.persistence {
            if let Err(e) = persistence.clear() {
                tracing::warn!("Failed to clear storage: {}", e);
            }
        }
        let base = seed::seed_base_time(self.clock.now());
        self.store.replace_items(seed::seed_items(base));
        self.history.clear();
        self.elapsed_seconds = 0;
        self.store.select_first();
        tracing::info!("Document reset to seed data");
    }

    // ===== 时钟 =====

    /// 一个节拍：推进当前时间，并为进行中条目重算已用秒数
    pub fn tick(&mut self) {
        self.clock.tick();
        let now = self.clock.now();
        if let Some(start) = self.store.running_item().and_then(|a| a.actual_start_time) {
            self.elapsed_seconds = (now - start).num_seconds().max(0);
        }
    }

    pub fn toggle_simulation(&mut self) {
        self.clock.toggle_simulation();
    }

    pub fn set_simulation_time(&mut self, time: DateTime<Utc>) {
        self.clock.set_simulation_time(time);
    }

    pub fn toggle_pause(&mut self) {
        self.clock.toggle_pause();
    }

    // ===== 内部 =====

    /// 落定实际结束时间与用时并清零已用秒数；不改状态、不记日志
    fn record_stop(&mut self, id: &str) {
        let now = self.clock.now();
        let elapsed = self.elapsed_seconds;
        if let Some(item) = self.store.item_mut(id) {
            item.actual_end_time = Some(now);
            item.actual_duration_seconds =
                Some(if item.actual_start_time.is_some() { elapsed } else { 0 });
        }
        self.elapsed_seconds = 0;
    }

    /// 把选中项推进到排序上 `after_id` 之后第一个满足条件的条目
    fn advance_selection<F>(&mut self, after_id: &str, eligible: F)
    where
        F: Fn(&AgendaItem) -> bool,
    {
        let next = {
            let sorted = self.store.sorted_items();
            let Some(position) = sorted.iter().position(|a| a.id == after_id) else {
                return;
            };
            sorted
                .iter()
                .skip(position + 1)
                .find(|a| eligible(a))
                .map(|a| a.id.clone())
        };
        if let Some(next_id) = next {
            self.store.set_selected(Some(next_id));
        }
    }

    fn log(&mut self, kind: ChangeKind, description: impl Into<String>, id: &str, title: &str) {
        let entry = ChangeLogEntry::new(kind, description, id.to_string(), title, self.clock.now());
        self.store.append_log(entry);
    }

    fn replan(&mut self) {
        schedule::replan_start_times(self.store.items_mut());
        self.store.touch_items();
    }

    fn persist(&self) {
        if let Some(persistence) = &self.persistence {
            if let Err(e) = persistence.save(self.store.items()) {
                tracing::warn!("Failed to persist document: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    /// 计划时长 30/10/10、从 T 起连续排布的三个条目
    fn engine() -> Engine {
        let t = base();
        let items = vec![
            AgendaItem::new("One", "A", t, 30).with_order(0),
            AgendaItem::new("Two", "B", t + Duration::minutes(30), 10).with_order(1),
            AgendaItem::new("Three", "C", t + Duration::minutes(40), 10).with_order(2),
        ];
        let mut engine = Engine::with_items(&AppConfig::default(), items);
        engine.set_simulation_time(t);
        engine
    }

    fn ids(engine: &Engine) -> Vec<AgendaId> {
        engine.sorted_items().iter().map(|a| a.id.clone()).collect()
    }

    fn running_count(engine: &Engine) -> usize {
        engine
            .sorted_items()
            .iter()
            .filter(|a| a.status == AgendaStatus::Running)
            .count()
    }

    #[test]
    fn test_start_sets_running_and_logs() {
        let mut engine = engine();
        let id = ids(&engine)[0].clone();
        engine.start(&id);

        let item = engine.item(&id).unwrap();
        assert_eq!(item.status, AgendaStatus::Running);
        assert_eq!(item.actual_start_time, Some(base()));
        assert_eq!(engine.change_log()[0].kind, ChangeKind::Start);
        assert_eq!(engine.change_log()[0].description, "Started at 09:00");
    }

    #[test]
    fn test_start_preempts_previous_running() {
        let mut engine = engine();
        let all = ids(&engine);
        engine.start(&all[0]);
        for _ in 0..5 {
            engine.tick();
        }
        engine.start(&all[1]);

        assert_eq!(running_count(&engine), 1);
        let preempted = engine.item(&all[0]).unwrap();
        assert_eq!(preempted.status, AgendaStatus::Done);
        assert!(preempted.actual_end_time.is_some());
        assert_eq!(preempted.actual_duration_seconds, Some(5));
        // 被抢占的条目不记 done 日志
        assert!(engine.change_log().iter().all(|e| e.kind != ChangeKind::Done));
        // 新条目的已用秒数从 0 重新推导
        assert_eq!(engine.elapsed_seconds(), 0);
    }

    #[test]
    fn test_start_terminal_item_is_noop() {
        let mut engine = engine();
        let id = ids(&engine)[0].clone();
        engine.cancel(&id);
        let undo_before = engine.can_undo();
        engine.start(&id);
        assert_eq!(engine.item(&id).unwrap().status, AgendaStatus::Cancelled);
        assert_eq!(engine.can_undo(), undo_before);
    }

    #[test]
    fn test_start_unknown_id_is_noop() {
        let mut engine = engine();
        engine.start("nope");
        assert_eq!(running_count(&engine), 0);
        assert!(!engine.can_undo());
        assert!(engine.change_log().is_empty());
    }

    #[test]
    fn test_stop_marks_done_and_advances_selection() {
        let mut engine = engine();
        let all = ids(&engine);
        engine.start(&all[0]);
        for _ in 0..3 {
            engine.tick();
        }
        engine.stop(&all[0], true);

        let item = engine.item(&all[0]).unwrap();
        assert_eq!(item.status, AgendaStatus::Done);
        assert_eq!(item.actual_duration_seconds, Some(3));
        assert_eq!(engine.elapsed_seconds(), 0);
        assert_eq!(engine.selected_item().unwrap().id, all[1]);
        assert_eq!(engine.change_log()[0].kind, ChangeKind::Done);
    }

    #[test]
    fn test_stop_skips_cancelled_when_advancing() {
        let mut engine = engine();
        let all = ids(&engine);
        engine.cancel(&all[1]);
        engine.start(&all[0]);
        engine.stop(&all[0], true);
        assert_eq!(engine.selected_item().unwrap().id, all[2]);
    }

    #[test]
    fn test_stop_without_start_records_zero_duration() {
        let mut engine = engine();
        let id = ids(&engine)[1].clone();
        engine.stop(&id, true);

        let item = engine.item(&id).unwrap();
        assert!(item.actual_start_time.is_none());
        assert!(item.actual_end_time.is_some());
        assert_eq!(item.actual_duration_seconds, Some(0));
        assert_eq!(item.status, AgendaStatus::Done);
    }

    #[test]
    fn test_stop_without_mark_done_keeps_status() {
        let mut engine = engine();
        let id = ids(&engine)[0].clone();
        engine.start(&id);
        engine.stop(&id, false);

        let item = engine.item(&id).unwrap();
        assert_eq!(item.status, AgendaStatus::Running);
        assert!(item.actual_end_time.is_some());
    }

    #[test]
    fn test_cancel_freezes_and_advances_to_waiting() {
        let mut engine = engine();
        let all = ids(&engine);
        let frozen = engine.item(&all[1]).unwrap().planned_start_time;
        engine.select(&all[0]);
        engine.cancel(&all[1]);

        let item = engine.item(&all[1]).unwrap();
        assert_eq!(item.status, AgendaStatus::Cancelled);
        assert_eq!(item.planned_start_time, frozen);
        assert_eq!(engine.selected_item().unwrap().id, all[2]);
        // 条目 3 的计划时间接到条目 1 之后
        assert_eq!(
            engine.item(&all[2]).unwrap().planned_start_time,
            base() + Duration::minutes(30)
        );
    }

    #[test]
    fn test_adjust_rejects_below_minimum() {
        let mut engine = engine();
        let id = ids(&engine)[1].clone();
        assert!(!engine.adjust_duration(&id, -10));
        assert_eq!(engine.item(&id).unwrap().planned_duration_minutes, 10);
        assert!(!engine.can_undo());
        assert!(engine.change_log().is_empty());
    }

    #[test]
    fn test_adjust_applies_and_cascades() {
        let mut engine = engine();
        let all = ids(&engine);
        assert!(engine.adjust_duration(&all[0], 15));
        assert_eq!(engine.item(&all[0]).unwrap().planned_duration_minutes, 45);
        assert_eq!(engine.change_log()[0].description, "Duration adjusted +15 min");
        assert_eq!(
            engine.item(&all[1]).unwrap().planned_start_time,
            base() + Duration::minutes(45)
        );
    }

    #[test]
    fn test_orders_stay_dense_through_structural_edits() {
        let mut engine = engine();
        let all = ids(&engine);

        let added = engine.add_item(AgendaDraft::default(), Some(&all[0]));
        engine.reorder(0, 3);
        engine.cancel(&all[1]);
        engine.delete_item(&added);

        let orders: Vec<usize> = engine.sorted_items().iter().map(|a| a.order).collect();
        assert_eq!(orders, (0..orders.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_add_item_after_shifts_orders() {
        let mut engine = engine();
        let all = ids(&engine);
        let added = engine.add_item(
            AgendaDraft {
                title: Some("Inserted".into()),
                planned_duration_minutes: Some(5),
                ..Default::default()
            },
            Some(&all[0]),
        );

        let titles: Vec<&str> = engine.sorted_items().iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["One", "Inserted", "Two", "Three"]);
        let item = engine.item(&added).unwrap();
        assert_eq!(item.status, AgendaStatus::Waiting);
        assert!(item.reminders.is_empty());
        // 重排后插入条目接在 One 之后
        assert_eq!(item.planned_start_time, base() + Duration::minutes(30));
    }

    #[test]
    fn test_add_item_defaults() {
        let mut engine = engine();
        let added = engine.add_item(AgendaDraft::default(), None);
        let item = engine.item(&added).unwrap();
        assert_eq!(item.title, "New agenda");
        assert_eq!(item.pic, "-");
        assert_eq!(item.planned_duration_minutes, 15);
    }

    #[test]
    fn test_delete_clears_selection() {
        let mut engine = engine();
        let id = ids(&engine)[0].clone();
        engine.select(&id);
        engine.delete_item(&id);
        assert!(engine.selected_item().is_none());
        assert_eq!(engine.sorted_items().len(), 2);
    }

    #[test]
    fn test_reorder_moves_and_logs() {
        let mut engine = engine();
        engine.reorder(0, 2);
        let titles: Vec<&str> = engine.sorted_items().iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["Two", "Three", "One"]);
        assert_eq!(engine.change_log()[0].kind, ChangeKind::Swap);
        assert_eq!(engine.change_log()[0].description, "Moved to position 3");
    }

    #[test]
    fn test_reorder_out_of_range_is_noop() {
        let mut engine = engine();
        engine.reorder(7, 0);
        assert!(!engine.can_undo());
    }

    #[test]
    fn test_undo_redo_roundtrip() {
        let mut engine = engine();
        let id = ids(&engine)[0].clone();
        assert!(engine.adjust_duration(&id, 15));
        assert_eq!(engine.item(&id).unwrap().planned_duration_minutes, 45);

        engine.undo();
        assert_eq!(engine.item(&id).unwrap().planned_duration_minutes, 30);
        assert!(engine.can_redo());

        engine.redo();
        assert_eq!(engine.item(&id).unwrap().planned_duration_minutes, 45);
    }

    #[test]
    fn test_undo_empty_stack_is_noop() {
        let mut engine = engine();
        engine.undo();
        assert_eq!(engine.sorted_items().len(), 3);
    }

    #[test]
    fn test_import_replace_selects_first() {
        let mut engine = engine();
        let t = base() + Duration::hours(2);
        let incoming = vec![
            AgendaItem::new("X", "-", t, 20).with_order(5),
            AgendaItem::new("Y", "-", t, 10).with_order(9),
        ];
        engine.import_items(incoming, ImportMode::Replace);

        let titles: Vec<&str> = engine.sorted_items().iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["X", "Y"]);
        let orders: Vec<usize> = engine.sorted_items().iter().map(|a| a.order).collect();
        assert_eq!(orders, [0, 1]);
        assert_eq!(engine.selected_item().unwrap().title, "X");
        assert!(engine.change_log()[0].description.contains("Imported 2 items"));
    }

    #[test]
    fn test_import_append_continues_orders() {
        let mut engine = engine();
        let incoming = vec![AgendaItem::new("X", "-", base(), 20).with_order(0)];
        engine.import_items(incoming, ImportMode::Append);

        let titles: Vec<&str> = engine.sorted_items().iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["One", "Two", "Three", "X"]);
        assert_eq!(engine.sorted_items()[3].order, 3);
    }

    #[test]
    fn test_update_item_patch_validation() {
        let mut engine = engine();
        let id = ids(&engine)[0].clone();
        let bad = AgendaPatch {
            planned_duration_minutes: Some(0),
            ..Default::default()
        };
        assert!(!engine.update_item(&id, bad));
        assert_eq!(engine.item(&id).unwrap().planned_duration_minutes, 30);

        let good = AgendaPatch {
            title: Some("Renamed".into()),
            ..Default::default()
        };
        assert!(engine.update_item(&id, good));
        assert_eq!(engine.item(&id).unwrap().title, "Renamed");
    }

    #[test]
    fn test_reminder_edits_skip_history() {
        let mut engine = engine();
        let id = ids(&engine)[0].clone();
        engine.add_reminder(&id, Reminder::new(-5, "Sound", "Check microphones"));
        assert!(!engine.can_undo());

        let reminder_id = engine.item(&id).unwrap().reminders[0].id.clone();
        engine.update_reminder(
            &id,
            &reminder_id,
            ReminderPatch {
                message: Some("Check both microphones".into()),
                ..Default::default()
            },
        );
        assert_eq!(
            engine.item(&id).unwrap().reminders[0].message,
            "Check both microphones"
        );

        engine.delete_reminder(&id, &reminder_id);
        assert!(engine.item(&id).unwrap().reminders.is_empty());
        assert!(!engine.can_undo());
    }

    #[test]
    fn test_notes_skip_history() {
        let mut engine = engine();
        let id = ids(&engine)[0].clone();
        engine.update_notes(&id, "Mic 2 is crackling");
        assert_eq!(engine.item(&id).unwrap().notes, "Mic 2 is crackling");
        assert!(!engine.can_undo());
    }

    #[test]
    fn test_tick_derives_elapsed_from_clock() {
        let mut engine = engine();
        let id = ids(&engine)[0].clone();
        engine.start(&id);
        for _ in 0..90 {
            engine.tick();
        }
        assert_eq!(engine.elapsed_seconds(), 90);

        // 暂停后节拍不再推进
        engine.toggle_pause();
        engine.tick();
        assert_eq!(engine.elapsed_seconds(), 90);
    }

    #[test]
    fn test_estimates_exposed_through_engine() {
        let mut engine = engine();
        let all = ids(&engine);
        engine.start(&all[0]);
        // 进行中：下一条预计 = 实际开始 + 计划时长
        assert_eq!(
            engine.estimated_start_time(&all[1]),
            Some(base() + Duration::minutes(30))
        );
    }

    #[test]
    fn test_reset_restores_seed() {
        let mut engine = engine();
        let id = ids(&engine)[0].clone();
        engine.start(&id);
        engine.reset();

        assert_eq!(running_count(&engine), 0);
        assert!(!engine.can_undo());
        assert_eq!(engine.elapsed_seconds(), 0);
        assert!(engine.selected_item().is_some());
    }
}
