//! 种子数据：进程首次启动（或重置）时的默认流程单

use chrono::{DateTime, Duration, Timelike, Utc};

use crate::model::{AgendaItem, Reminder};

/// 把基准时间对齐到整分（秒与纳秒归零）
pub fn seed_base_time(now: DateTime<Utc>) -> DateTime<Utc> {
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

/// 以 `base` 为首条计划开始时间，生成连续排布的默认议程
pub fn seed_items(base: DateTime<Utc>) -> Vec<AgendaItem> {
    let rows: Vec<(&str, i64, &str, &str)> = vec![
        (
            "Crew briefing and venue prep",
            30,
            "Field Coordinator",
            "Final committee briefing before the event opens.",
        ),
        (
            "Doors open and registration",
            30,
            "Secretariat",
            "Participants enter the venue and sign the attendance sheet.",
        ),
        ("Opening by MC", 10, "MC", "Formal opening by the Master of Ceremony."),
        ("Welcome address", 10, "Event Lead", "Short welcome from the organizing lead."),
        ("Pre-test", 10, "Materials Team", "Participants work on the pre-test."),
        ("Ice breaking", 15, "MC", "Short energizer to loosen up the room."),
        ("Speaker profile reading", 5, "MC", "Introduction of the keynote speaker."),
        ("Keynote session", 45, "Speaker 1", "Main material of the first session."),
        ("Q&A session", 15, "MC", "Open discussion with the speaker."),
        (
            "Plaque handover and documentation",
            5,
            "Event Lead",
            "Token of appreciation and group photo.",
        ),
        ("Games", 20, "Program Division", "Interactive games to keep the energy up."),
        ("Post-test", 10, "Materials Team", "Participants work on the post-test."),
        ("Closing remarks", 5, "MC", "Event closing by the MC."),
    ];

    let mut cumulative_minutes = 0;
    rows.into_iter()
        .enumerate()
        .map(|(index, (title, duration, pic, description))| {
            let start = base + Duration::minutes(cumulative_minutes);
            cumulative_minutes += duration;

            let mut item = AgendaItem::new(title, pic, start, duration)
                .with_description(description)
                .with_order(index);

            match title {
                "Crew briefing and venue prep" => {
                    item = item.with_reminder(
                        Reminder::new(0, "Committee", "Lay out attendance sheets and snacks")
                            .with_icon("📋"),
                    );
                }
                "Keynote session" => {
                    item = item.with_reminder(
                        Reminder::new(-10, "Logistics", "Check laptop and projector").with_icon("📽️"),
                    );
                }
                "Games" => {
                    item = item.with_reminder(
                        Reminder::new(0, "Program Division", "Prepare door prizes").with_icon("🎁"),
                    );
                }
                "Post-test" => {
                    item = item.with_reminder(
                        Reminder::new(0, "Materials Team", "Share the post-test link").with_icon("🔗"),
                    );
                }
                _ => {}
            }

            item
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_seed_contiguous_and_dense() {
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let items = seed_items(base);
        assert!(!items.is_empty());

        let mut cursor = base;
        for (index, item) in items.iter().enumerate() {
            assert_eq!(item.order, index);
            assert_eq!(item.planned_start_time, cursor);
            cursor += Duration::minutes(item.planned_duration_minutes);
        }
    }

    #[test]
    fn test_seed_base_time_truncates_seconds() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 42).unwrap();
        assert_eq!(
            seed_base_time(now),
            Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
        );
    }
}
