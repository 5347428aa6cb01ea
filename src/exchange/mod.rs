//! CSV 导入 / 导出
//!
//! 两种导出：全量报表（9 列，给复盘用）与可编辑流程单（7 列，与导入格式
//! 同构，带 UTF-8 BOM 方便表格软件识别）。导入解析 7 列格式，每行至多带
//! 一条提醒。逗号与引号按 CSV 规则转义 / 还原。

use chrono::{DateTime, Duration, Utc};

use crate::core::error::EngineError;
use crate::model::{format_clock, AgendaItem, Reminder};

/// 可编辑流程单（与导入同构）的表头
const RUNDOWN_HEADERS: [&str; 7] = [
    "Title",
    "DurationMinutes",
    "PIC",
    "Description",
    "ReminderOffset",
    "ReminderDivision",
    "ReminderMessage",
];

/// 全量报表：每个条目一行，时间 HH:MM、缺失记 `-`，实际用时换算为分钟（1 位小数）
pub fn export_report(items: &[AgendaItem]) -> String {
    let headers = [
        "Title",
        "PIC",
        "Status",
        "PlannedStart",
        "PlannedDurationMinutes",
        "ActualStart",
        "ActualEnd",
        "ActualDurationMinutes",
        "Notes",
    ];

    let mut sorted: Vec<&AgendaItem> = items.iter().collect();
    sorted.sort_by_key(|a| a.order);

    let mut lines = vec![headers.join(",")];
    for item in sorted {
        let actual_minutes = item
            .actual_duration_seconds
            .map(|secs| format!("{:.1}", secs as f64 / 60.0))
            .unwrap_or_default();
        let row = [
            escape(&item.title),
            escape(&item.pic),
            item.status.as_str().to_string(),
            format_clock(item.planned_start_time),
            item.planned_duration_minutes.to_string(),
            item.actual_start_time.map(format_clock).unwrap_or_else(|| "-".into()),
            item.actual_end_time.map(format_clock).unwrap_or_else(|| "-".into()),
            actual_minutes,
            escape(&item.notes),
        ];
        lines.push(row.join(","));
    }
    lines.join("\n")
}

/// 可编辑流程单：7 列、每行第一条提醒，前缀 UTF-8 BOM
pub fn export_rundown(items: &[AgendaItem]) -> String {
    let mut sorted: Vec<&AgendaItem> = items.iter().collect();
    sorted.sort_by_key(|a| a.order);

    let mut lines = vec![RUNDOWN_HEADERS.join(",")];
    for item in sorted {
        let reminder = item.reminders.first();
        let row = [
            escape(&item.title),
            item.planned_duration_minutes.to_string(),
            escape(&item.pic),
            escape(&item.description),
            reminder.map(|r| r.offset_minutes.to_string()).unwrap_or_default(),
            escape(reminder.map(|r| r.division.as_str()).unwrap_or("")),
            escape(reminder.map(|r| r.message.as_str()).unwrap_or("")),
        ];
        lines.push(row.join(","));
    }
    format!("\u{feff}{}", lines.join("\n"))
}

/// 解析 7 列流程单文本为条目列表
///
/// 首行按表头跳过；计划开始时间从 `base` 起按时长累加（导入后引擎还会重
/// 排）。时长或提醒偏移不是整数时返回带行号的格式错误。
pub fn import_rundown(text: &str, base: DateTime<Utc>) -> Result<Vec<AgendaItem>, EngineError> {
    let mut items = Vec::new();
    let mut cumulative_minutes = 0;

    for (line_no, raw) in text.trim_start_matches('\u{feff}').lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line_no == 0 || line.trim().is_empty() {
            continue;
        }

        let fields = split_line(line);
        let title = fields.first().cloned().unwrap_or_default();
        if title.trim().is_empty() {
            return Err(EngineError::ImportFormat {
                line: line_no + 1,
                message: "missing title".into(),
            });
        }

        let duration: i64 = match fields.get(1).map(|s| s.trim()) {
            Some("") | None => 15,
            Some(value) => value.parse().map_err(|_| EngineError::ImportFormat {
                line: line_no + 1,
                message: format!("invalid duration '{}'", value),
            })?,
        };

        let start = base + Duration::minutes(cumulative_minutes);
        cumulative_minutes += duration.max(1);

        let mut item = AgendaItem::new(
            title,
            fields.get(2).cloned().unwrap_or_else(|| "-".into()),
            start,
            duration,
        )
        .with_description(fields.get(3).cloned().unwrap_or_default())
        .with_order(items.len());

        let offset_field = fields.get(4).map(|s| s.trim().to_string()).unwrap_or_default();
        let division = fields.get(5).cloned().unwrap_or_default();
        let message = fields.get(6).cloned().unwrap_or_default();
        if !offset_field.is_empty() || !message.is_empty() {
            let offset: i64 = if offset_field.is_empty() {
                0
            } else {
                offset_field.parse().map_err(|_| EngineError::ImportFormat {
                    line: line_no + 1,
                    message: format!("invalid reminder offset '{}'", offset_field),
                })?
            };
            item = item.with_reminder(Reminder::new(offset, division, message));
        }

        items.push(item);
    }

    Ok(items)
}

/// CSV 字段转义：包引号，内部引号翻倍
fn escape(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// 引号感知的单行切分
fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if in_quotes && chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}
