//! 排期计算：预计开始时间级联与计划时间重排
//!
//! 两个互不掺和的纯函数：
//! - [`estimated_start_times`]：按实际进展推算每个条目的预计开始时间，
//!   每次全量重算（条目量级是几十个，不做增量）。
//! - [`replan_start_times`]：结构性编辑后把非取消条目的*计划*时间重写为
//!   从首条计划时间起的连续排布，完全不看实际时间。

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::model::{AgendaId, AgendaItem, AgendaStatus};

/// 推算各条目的预计开始时间
///
/// 游标规则：取消条目冻结在自己的计划时间且不推进游标；有实际开始的条目
/// 以实际开始为准（真实进展覆盖级联），游标推进到实际结束、否则实际开始 +
/// 计划时长；未开始的条目取当前游标（游标未建立时取自身计划时间），游标
/// 前进一个计划时长。
pub fn estimated_start_times(items: &[AgendaItem]) -> HashMap<AgendaId, DateTime<Utc>> {
    let mut sorted: Vec<&AgendaItem> = items.iter().collect();
    sorted.sort_by_key(|a| a.order);

    let mut estimates = HashMap::new();
    let mut next_estimated_start: Option<DateTime<Utc>> = None;

    for agenda in sorted {
        if agenda.status == AgendaStatus::Cancelled {
            estimates.insert(agenda.id.clone(), agenda.planned_start_time);
            continue;
        }

        let duration = Duration::minutes(agenda.planned_duration_minutes);

        if let Some(actual_start) = agenda.actual_start_time {
            estimates.insert(agenda.id.clone(), actual_start);
            next_estimated_start = Some(match agenda.actual_end_time {
                Some(actual_end) => actual_end,
                None => actual_start + duration,
            });
        } else {
            let estimate = next_estimated_start.unwrap_or(agenda.planned_start_time);
            estimates.insert(agenda.id.clone(), estimate);
            next_estimated_start = Some(estimate + duration);
        }
    }

    estimates
}

/// 把非取消条目的计划开始时间重写为连续排布
///
/// 基准是顺序第一个条目的计划开始时间（无论其状态）；取消条目的计划时间
/// 保持冻结，也不占用时间轴。
pub fn replan_start_times(items: &mut [AgendaItem]) {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by_key(|&i| items[i].order);

    let Some(&first) = order.first() else {
        return;
    };
    let mut cursor = items[first].planned_start_time;

    for index in order {
        let item = &mut items[index];
        if item.status == AgendaStatus::Cancelled {
            continue;
        }
        item.planned_start_time = cursor;
        cursor += Duration::minutes(item.planned_duration_minutes);
    }
}
