//! 议程存储：文档聚合根与结构性簿记
//!
//! 只负责持有 [`Document`] 并做结构维护（插入、移除、重排序号、日志前插、
//! 选中项），不含任何业务规则；全部业务变更经由 controller 进入。
//! 变更通过 broadcast 通道显式通知观察者（持久化、展示层）。

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::model::{AgendaId, AgendaItem, AgendaStatus, ChangeLogEntry};

/// 存储变更事件，广播给订阅者
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// 条目列表发生变化（增删改、导入、撤销恢复）
    ItemsChanged,
    /// 追加了一条变更日志
    LogAppended,
    /// 选中项变化
    SelectionChanged,
}

/// 文档聚合根：撤销快照与持久化的单位
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// 活动名称
    pub event_name: String,
    /// 全部议程条目（顺序由 `order` 字段决定，Vec 内部顺序不保证）
    pub items: Vec<AgendaItem>,
    /// 变更日志，最新在前，不做裁剪
    pub change_log: Vec<ChangeLogEntry>,
    /// 当前选中条目
    pub selected_id: Option<AgendaId>,
}

/// 议程存储
pub struct AgendaStore {
    doc: Document,
    events_tx: broadcast::Sender<StoreEvent>,
}

impl AgendaStore {
    /// 以给定条目建立存储；默认选中顺序第一个条目
    pub fn new(event_name: impl Into<String>, items: Vec<AgendaItem>) -> Self {
        let (events_tx, _) = broadcast::channel(64);
        let mut store = Self {
            doc: Document {
                event_name: event_name.into(),
                items,
                change_log: Vec::new(),
                selected_id: None,
            },
            events_tx,
        };
        store.doc.selected_id = store.first_id();
        store
    }

    /// 订阅存储变更事件
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events_tx.subscribe()
    }

    fn notify(&self, event: StoreEvent) {
        // 无订阅者时发送失败是正常情况
        let _ = self.events_tx.send(event);
    }

    // ===== 读取 =====

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn event_name(&self) -> &str {
        &self.doc.event_name
    }

    pub fn items(&self) -> &[AgendaItem] {
        &self.doc.items
    }

    pub fn item(&self, id: &str) -> Option<&AgendaItem> {
        self.doc.items.iter().find(|a| a.id == id)
    }

    pub fn item_mut(&mut self, id: &str) -> Option<&mut AgendaItem> {
        self.doc.items.iter_mut().find(|a| a.id == id)
    }

    /// 按 `order` 升序的条目快照
    pub fn sorted_items(&self) -> Vec<&AgendaItem> {
        let mut sorted: Vec<&AgendaItem> = self.doc.items.iter().collect();
        sorted.sort_by_key(|a| a.order);
        sorted
    }

    /// 按 `order` 升序的条目 ID
    pub fn sorted_ids(&self) -> Vec<AgendaId> {
        self.sorted_items().iter().map(|a| a.id.clone()).collect()
    }

    /// 当前正在进行的条目（至多一个）
    pub fn running_item(&self) -> Option<&AgendaItem> {
        self.doc.items.iter().find(|a| a.status == AgendaStatus::Running)
    }

    pub fn selected_item(&self) -> Option<&AgendaItem> {
        self.doc.selected_id.as_deref().and_then(|id| self.item(id))
    }

    pub fn selected_id(&self) -> Option<&AgendaId> {
        self.doc.selected_id.as_ref()
    }

    pub fn change_log(&self) -> &[ChangeLogEntry] {
        &self.doc.change_log
    }

    fn first_id(&self) -> Option<AgendaId> {
        self.sorted_items().first().map(|a| a.id.clone())
    }

    // ===== 结构维护 =====

    /// 追加条目（`order` 由调用方事先设好）
    pub fn insert_item(&mut self, item: AgendaItem) {
        self.doc.items.push(item);
        self.notify(StoreEvent::ItemsChanged);
    }

    /// 移除条目并把存活条目的 `order` 重排为稠密 0..N-1
    pub fn remove_item(&mut self, id: &str) -> Option<AgendaItem> {
        let index = self.doc.items.iter().position(|a| a.id == id)?;
        let removed = self.doc.items.remove(index);
        self.renormalize_orders();
        if self.doc.selected_id.as_deref() == Some(id) {
            self.doc.selected_id = None;
        }
        self.notify(StoreEvent::ItemsChanged);
        Some(removed)
    }

    /// 把 `order` 重排为当前顺序下的稠密 0..N-1
    pub fn renormalize_orders(&mut self) {
        let ids = self.sorted_ids();
        for (index, id) in ids.iter().enumerate() {
            if let Some(item) = self.item_mut(id) {
                item.order = index;
            }
        }
    }

    /// 可变切片访问（排期重排用；改完后调用方负责 [`AgendaStore::touch_items`]）
    pub fn items_mut(&mut self) -> &mut [AgendaItem] {
        &mut self.doc.items
    }

    /// 整体替换条目列表（导入、撤销恢复用）
    pub fn replace_items(&mut self, items: Vec<AgendaItem>) {
        self.doc.items = items;
        self.notify(StoreEvent::ItemsChanged);
    }

    /// 条目内容被修改后的变更通知
    pub fn touch_items(&self) {
        self.notify(StoreEvent::ItemsChanged);
    }

    /// 前插一条变更日志（最新在前）
    pub fn append_log(&mut self, entry: ChangeLogEntry) {
        self.doc.change_log.insert(0, entry);
        self.notify(StoreEvent::LogAppended);
    }

    pub fn set_selected(&mut self, id: Option<AgendaId>) {
        if self.doc.selected_id != id {
            self.doc.selected_id = id;
            self.notify(StoreEvent::SelectionChanged);
        }
    }

    /// 选中顺序第一个条目（重置 / 替换导入后用）
    pub fn select_first(&mut self) {
        let first = self.first_id();
        self.set_selected(first);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(title: &str, order: usize) -> AgendaItem {
        AgendaItem::new(title, "-", Utc::now(), 10).with_order(order)
    }

    #[test]
    fn test_sorted_by_order_not_insertion() {
        let mut store = AgendaStore::new("Test", vec![item("B", 1), item("A", 0)]);
        store.insert_item(item("C", 2));
        let titles: Vec<&str> = store.sorted_items().iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["A", "B", "C"]);
    }

    #[test]
    fn test_remove_renormalizes_and_clears_selection() {
        let mut store = AgendaStore::new("Test", vec![item("A", 0), item("B", 1), item("C", 2)]);
        let b_id = store.sorted_ids()[1].clone();
        store.set_selected(Some(b_id.clone()));

        store.remove_item(&b_id);
        let orders: Vec<usize> = store.sorted_items().iter().map(|a| a.order).collect();
        assert_eq!(orders, [0, 1]);
        assert!(store.selected_id().is_none());
    }

    #[test]
    fn test_log_prepends() {
        let mut store = AgendaStore::new("Test", vec![item("A", 0)]);
        let id = store.sorted_ids()[0].clone();
        store.append_log(ChangeLogEntry::new(
            crate::model::ChangeKind::Start,
            "first",
            id.clone(),
            "A",
            Utc::now(),
        ));
        store.append_log(ChangeLogEntry::new(
            crate::model::ChangeKind::Done,
            "second",
            id,
            "A",
            Utc::now(),
        ));
        assert_eq!(store.change_log()[0].description, "second");
    }

    #[test]
    fn test_events_broadcast() {
        let mut store = AgendaStore::new("Test", vec![item("A", 0)]);
        let mut rx = store.subscribe();
        store.insert_item(item("B", 1));
        assert_eq!(rx.try_recv().unwrap(), StoreEvent::ItemsChanged);
    }
}
