use chrono::NaiveTime;

use crate::format;
use crate::models::{ScheduleEntry, WeeklySchedule, UNKNOWN_DAY};

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleDay<'a> {
    pub day_of_week: u8,
    pub entries: Vec<&'a ScheduleEntry>,
}

impl ScheduleDay<'_> {
    pub fn name(&self) -> &'static str {
        format::weekday_name(self.day_of_week)
    }
}

fn by_start_time(a: &&ScheduleEntry, b: &&ScheduleEntry) -> std::cmp::Ordering {
    // Entries without a start time go last.
    match (a.start_time, b.start_time) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    }
}

fn school_day_order(schedule: &WeeklySchedule) -> Vec<u8> {
    let mut days: Vec<u8> = Vec::new();
    if schedule.school_days.is_empty() {
        for entry in &schedule.entries {
            if entry.day_of_week != UNKNOWN_DAY && !days.contains(&entry.day_of_week) {
                days.push(entry.day_of_week);
            }
        }
        days.sort_unstable();
    } else {
        for day in &schedule.school_days {
            if *day <= 6 && !days.contains(day) {
                days.push(*day);
            }
        }
    }
    days
}

/// Entries grouped per school day, in `schoolDays` order, each day sorted by
/// start time. Days outside `schoolDays` are dropped; an empty `schoolDays`
/// keeps every day that has entries.
pub fn group_by_day(schedule: &WeeklySchedule) -> Vec<ScheduleDay<'_>> {
    school_day_order(schedule)
        .into_iter()
        .map(|day| ScheduleDay {
            day_of_week: day,
            entries: lessons_on(schedule, day),
        })
        .collect()
}

pub fn lessons_on(schedule: &WeeklySchedule, day_of_week: u8) -> Vec<&ScheduleEntry> {
    let mut entries: Vec<&ScheduleEntry> = schedule
        .entries
        .iter()
        .filter(|entry| entry.day_of_week == day_of_week)
        .collect();
    entries.sort_by(by_start_time);
    entries
}

/// The first lesson on `day_of_week` starting at or after `now`.
pub fn next_lesson(
    schedule: &WeeklySchedule,
    day_of_week: u8,
    now: NaiveTime,
) -> Option<&ScheduleEntry> {
    lessons_on(schedule, day_of_week)
        .into_iter()
        .find(|entry| entry.start_time.is_some_and(|start| start >= now))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(day: u8, start: &str, subject: &str) -> ScheduleEntry {
        ScheduleEntry {
            day_of_week: day,
            start_time: format::parse_time(start),
            end_time: None,
            subject: subject.to_string(),
            teacher_name: None,
            room: None,
        }
    }

    fn schedule(school_days: Vec<u8>) -> WeeklySchedule {
        WeeklySchedule {
            class_name: "8/ب".to_string(),
            entries: vec![
                entry(1, "10:00", "العلوم"),
                entry(0, "09:00", "العربية"),
                entry(0, "08:00", "الرياضيات"),
                entry(5, "08:00", "نشاط"),
                entry(UNKNOWN_DAY, "08:00", "مجهول"),
            ],
            school_days,
        }
    }

    #[test]
    fn groups_follow_school_days_and_sort_by_time() {
        let week = schedule(vec![1, 0, 2]);
        let days = group_by_day(&week);

        let order: Vec<u8> = days.iter().map(|d| d.day_of_week).collect();
        assert_eq!(order, vec![1, 0, 2]);
        assert_eq!(days[1].name(), "الأحد");
        assert_eq!(days[1].entries[0].subject, "الرياضيات");
        assert_eq!(days[1].entries[1].subject, "العربية");
        assert!(days[2].entries.is_empty());
    }

    #[test]
    fn empty_school_days_keeps_days_with_entries() {
        let week = schedule(vec![]);
        let order: Vec<u8> = group_by_day(&week).iter().map(|d| d.day_of_week).collect();
        assert_eq!(order, vec![0, 1, 5]);
    }

    #[test]
    fn next_lesson_skips_past_entries() {
        let week = schedule(vec![0, 1]);
        let at = |raw: &str| format::parse_time(raw).unwrap();

        assert_eq!(next_lesson(&week, 0, at("08:30")).unwrap().subject, "العربية");
        assert_eq!(next_lesson(&week, 0, at("08:00")).unwrap().subject, "الرياضيات");
        assert!(next_lesson(&week, 0, at("12:00")).is_none());
        assert!(next_lesson(&week, 3, at("07:00")).is_none());
    }
}
