//! 数据模型：议程条目、提醒、变更日志
//!
//! 全部类型可 serde 序列化；时间戳统一用 `DateTime<Utc>`，序列化为 RFC 3339
//! 字符串，反序列化按 schema 还原为同一瞬间（不靠字符串嗅探）。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 议程条目 ID
pub type AgendaId = String;

/// 提醒 ID
pub type ReminderId = String;

/// 生成新的条目 / 提醒 / 日志 ID
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// 条目状态机：waiting → running → done，waiting|running → cancelled（终态）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgendaStatus {
    /// 等待开始
    Waiting,
    /// 正在进行（全文档同一时刻至多一个）
    Running,
    /// 已完成
    Done,
    /// 已取消（不再参与级联）
    Cancelled,
}

impl AgendaStatus {
    /// 是否已进入终态（done / cancelled）
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgendaStatus::Done | AgendaStatus::Cancelled)
    }

    /// 导出报表用的小写形式
    pub fn as_str(&self) -> &'static str {
        match self {
            AgendaStatus::Waiting => "waiting",
            AgendaStatus::Running => "running",
            AgendaStatus::Done => "done",
            AgendaStatus::Cancelled => "cancelled",
        }
    }
}

/// 相对提醒：开始前/后若干分钟提醒某个分工组
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    /// 提醒 ID（条目内唯一）
    pub id: ReminderId,
    /// 相对开始时间的偏移（分钟，-5 表示开始前 5 分钟）
    pub offset_minutes: i64,
    /// 负责分工组，如 "Sound"、"Logistics"
    pub division: String,
    /// 提醒内容
    pub message: String,
    /// 可选图标（emoji）
    pub icon: Option<String>,
}

impl Reminder {
    pub fn new(offset_minutes: i64, division: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            offset_minutes,
            division: division.into(),
            message: message.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// 提醒的逐字段更新；`None` 表示该字段保持不变
#[derive(Debug, Clone, Default)]
pub struct ReminderPatch {
    pub offset_minutes: Option<i64>,
    pub division: Option<String>,
    pub message: Option<String>,
    pub icon: Option<String>,
}

impl ReminderPatch {
    /// 应用到目标提醒
    pub fn apply(self, reminder: &mut Reminder) {
        if let Some(offset) = self.offset_minutes {
            reminder.offset_minutes = offset;
        }
        if let Some(division) = self.division {
            reminder.division = division;
        }
        if let Some(message) = self.message {
            reminder.message = message;
        }
        if let Some(icon) = self.icon {
            reminder.icon = Some(icon);
        }
    }
}

/// 议程条目：一个被排期的环节
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgendaItem {
    /// 条目 ID（生命周期内不变）
    pub id: AgendaId,
    /// 环节标题
    pub title: String,
    /// 负责人（Person In Charge）
    pub pic: String,
    /// 环节说明
    pub description: String,
    /// 操作员现场笔记
    pub notes: String,
    /// 计划开始时间
    pub planned_start_time: DateTime<Utc>,
    /// 计划时长（分钟，恒 >= 1）
    pub planned_duration_minutes: i64,
    /// 实际开始时间
    pub actual_start_time: Option<DateTime<Utc>>,
    /// 实际结束时间
    pub actual_end_time: Option<DateTime<Utc>>,
    /// 实际用时（秒），停止时落定
    pub actual_duration_seconds: Option<i64>,
    /// 状态机当前状态
    pub status: AgendaStatus,
    /// 展示 / 执行顺序（非删除条目间稠密，从 0 起）
    pub order: usize,
    /// 相对提醒列表
    pub reminders: Vec<Reminder>,
}

impl AgendaItem {
    /// 新建等待状态的条目，实际时间为空、无提醒
    pub fn new(
        title: impl Into<String>,
        pic: impl Into<String>,
        planned_start_time: DateTime<Utc>,
        planned_duration_minutes: i64,
    ) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            pic: pic.into(),
            description: String::new(),
            notes: String::new(),
            planned_start_time,
            planned_duration_minutes: planned_duration_minutes.max(1),
            actual_start_time: None,
            actual_end_time: None,
            actual_duration_seconds: None,
            status: AgendaStatus::Waiting,
            order: 0,
            reminders: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    pub fn with_reminder(mut self, reminder: Reminder) -> Self {
        self.reminders.push(reminder);
        self
    }

    /// 计划结束时间 = 计划开始 + 计划时长
    pub fn planned_end_time(&self) -> DateTime<Utc> {
        self.planned_start_time + chrono::Duration::minutes(self.planned_duration_minutes)
    }
}

/// 新建条目时的输入；未提供的字段用默认值补齐
#[derive(Debug, Clone, Default)]
pub struct AgendaDraft {
    pub title: Option<String>,
    pub pic: Option<String>,
    pub description: Option<String>,
    pub planned_start_time: Option<DateTime<Utc>>,
    pub planned_duration_minutes: Option<i64>,
}

/// 条目的逐字段更新；`None` 表示该字段保持不变
///
/// 每个字段由 patch 自己校验，不依赖调用方预先校验（时长低于 1 分钟整个
/// patch 被拒绝）。
#[derive(Debug, Clone, Default)]
pub struct AgendaPatch {
    pub title: Option<String>,
    pub pic: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub planned_start_time: Option<DateTime<Utc>>,
    pub planned_duration_minutes: Option<i64>,
}

impl AgendaPatch {
    /// patch 是否通过自身校验
    pub fn is_valid(&self) -> bool {
        self.planned_duration_minutes.map_or(true, |m| m >= 1)
    }

    /// 应用到目标条目；调用方应先用 [`AgendaPatch::is_valid`] 校验
    pub fn apply(self, item: &mut AgendaItem) {
        if let Some(title) = self.title {
            item.title = title;
        }
        if let Some(pic) = self.pic {
            item.pic = pic;
        }
        if let Some(description) = self.description {
            item.description = description;
        }
        if let Some(notes) = self.notes {
            item.notes = notes;
        }
        if let Some(start) = self.planned_start_time {
            item.planned_start_time = start;
        }
        if let Some(minutes) = self.planned_duration_minutes {
            item.planned_duration_minutes = minutes.max(1);
        }
    }
}

/// 变更类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Delay,
    Cancel,
    Swap,
    Adjust,
    Start,
    Done,
}

/// 变更日志条目：只追加的操作审计，最新在前
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub kind: ChangeKind,
    pub description: String,
    pub agenda_id: AgendaId,
    pub agenda_title: String,
}

impl ChangeLogEntry {
    pub fn new(
        kind: ChangeKind,
        description: impl Into<String>,
        agenda_id: impl Into<AgendaId>,
        agenda_title: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            timestamp,
            kind,
            description: description.into(),
            agenda_id: agenda_id.into(),
            agenda_title: agenda_title.into(),
        }
    }
}

/// HH:MM 时刻文本（日志描述与报表用）
pub fn format_clock(time: DateTime<Utc>) -> String {
    time.format("%H:%M").to_string()
}
