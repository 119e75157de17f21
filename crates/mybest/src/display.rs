/// Presentation helpers: greeting, schedule badge status, name/NIM formatting
use crate::db::{Day, Schedule};
use chrono::{Datelike, NaiveDateTime, Timelike};

/// Greeting shown on the dashboard header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Greeting {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl Greeting {
    /// Picks the greeting for an hour of the day (0-23)
    pub fn for_hour(hour: u32) -> Self {
        match hour {
            0..=10 => Greeting::Morning,
            11..=14 => Greeting::Afternoon,
            15..=18 => Greeting::Evening,
            _ => Greeting::Night,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Greeting::Morning => "Selamat Pagi",
            Greeting::Afternoon => "Selamat Siang",
            Greeting::Evening => "Selamat Sore",
            Greeting::Night => "Selamat Malam",
        }
    }
}

/// Where a class stands relative to now. Drives the card's color bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleStatus {
    /// Not today
    FutureDay,
    /// Today, already over
    Passed,
    /// Today, running or still to come
    Active,
}

impl ScheduleStatus {
    pub fn color(&self) -> &'static str {
        match self {
            ScheduleStatus::FutureDay => "#E74C3C",
            ScheduleStatus::Passed => "#95A5A6",
            ScheduleStatus::Active => "#27AE60",
        }
    }
}

/// Classifies `schedule` against `now`.
///
/// Checks are applied in order: different day, then past the end time
/// (strictly, to the minute), otherwise active.
pub fn schedule_status(schedule: &Schedule, now: NaiveDateTime) -> ScheduleStatus {
    let today = Day::from(now.weekday());
    if schedule.day != today {
        return ScheduleStatus::FutureDay;
    }

    if (now.hour(), now.minute()) > parse_end_time(&schedule.end_time) {
        ScheduleStatus::Passed
    } else {
        ScheduleStatus::Active
    }
}

/// Parses "HH:MM" into (hour, minute). Missing or garbled parts fall back to 23 and 59.
fn parse_end_time(text: &str) -> (u32, u32) {
    let mut parts = text.split(':');
    let hour = parts
        .next()
        .and_then(|h| h.trim().parse::<u32>().ok())
        .unwrap_or(23);
    let minute = parts
        .next()
        .and_then(|m| m.trim().parse::<u32>().ok())
        .unwrap_or(59);
    (hour, minute)
}

/// Up to two uppercase initials from a display name ("Guest User" -> "GU").
pub fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();

    if letters.is_empty() {
        "?".to_string()
    } else {
        letters
    }
}

pub fn format_nim(nim: &str) -> String {
    format!("NIM: {}", nim.trim())
}

/// Schedules that meet on `day`, earliest start first.
pub fn today_schedules(schedules: &[Schedule], day: Day) -> Vec<Schedule> {
    let mut today: Vec<Schedule> = schedules
        .iter()
        .filter(|s| s.day == day)
        .cloned()
        .collect();
    today.sort_by(|a, b| a.start_time.cmp(&b.start_time));
    today
}

/// Hint shown under today's classes.
pub fn tips_text(class_count: usize) -> String {
    if class_count == 0 {
        "Tidak ada kuliah hari ini. Waktu yang tepat untuk belajar mandiri!".to_string()
    } else {
        format!("Kamu memiliki {class_count} kelas hari ini. Semangat belajar!")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn schedule(day: Day, start: &str, end: &str) -> Schedule {
        Schedule {
            id: 1,
            subject_name: "Basis Data".to_string(),
            subject_code: "BD01".to_string(),
            day,
            start_time: start.to_string(),
            end_time: end.to_string(),
            room: "R-301".to_string(),
            dosen: "Dr. Sari".to_string(),
            sks: 3,
            is_attended: false,
            attended_at: None,
        }
    }

    /// 2024-01-02 was a Tuesday.
    fn tuesday_at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_greeting_boundaries() {
        let cases = [
            (0, Greeting::Morning),
            (10, Greeting::Morning),
            (11, Greeting::Afternoon),
            (14, Greeting::Afternoon),
            (15, Greeting::Evening),
            (18, Greeting::Evening),
            (19, Greeting::Night),
            (23, Greeting::Night),
        ];
        for (hour, expected) in cases {
            assert_eq!(Greeting::for_hour(hour), expected, "hour {hour}");
        }
    }

    #[test]
    fn test_greeting_covers_every_hour() {
        let morning = (0..24).filter(|&h| Greeting::for_hour(h) == Greeting::Morning).count();
        let afternoon = (0..24).filter(|&h| Greeting::for_hour(h) == Greeting::Afternoon).count();
        let evening = (0..24).filter(|&h| Greeting::for_hour(h) == Greeting::Evening).count();
        let night = (0..24).filter(|&h| Greeting::for_hour(h) == Greeting::Night).count();
        assert_eq!((morning, afternoon, evening, night), (11, 4, 4, 5));
    }

    #[test]
    fn test_other_day_is_future_regardless_of_time() {
        let monday_class = schedule(Day::Senin, "08:00", "10:00");
        assert_eq!(
            schedule_status(&monday_class, tuesday_at(7, 0)),
            ScheduleStatus::FutureDay
        );
        assert_eq!(
            schedule_status(&monday_class, tuesday_at(23, 59)),
            ScheduleStatus::FutureDay
        );
    }

    #[test]
    fn test_today_before_and_after_end() {
        let class = schedule(Day::Selasa, "08:00", "10:00");
        assert_eq!(schedule_status(&class, tuesday_at(9, 59)), ScheduleStatus::Active);
        assert_eq!(schedule_status(&class, tuesday_at(10, 0)), ScheduleStatus::Active);
        assert_eq!(schedule_status(&class, tuesday_at(10, 1)), ScheduleStatus::Passed);
    }

    #[test]
    fn test_garbled_end_time_runs_until_midnight() {
        let class = schedule(Day::Selasa, "08:00", "soon");
        assert_eq!(schedule_status(&class, tuesday_at(23, 59)), ScheduleStatus::Active);
    }

    #[test]
    fn test_status_colors() {
        assert_eq!(ScheduleStatus::FutureDay.color(), "#E74C3C");
        assert_eq!(ScheduleStatus::Passed.color(), "#95A5A6");
        assert_eq!(ScheduleStatus::Active.color(), "#27AE60");
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("Guest User"), "GU");
        assert_eq!(initials("ani lestari putri"), "AL");
        assert_eq!(initials("Budi"), "B");
        assert_eq!(initials("   "), "?");
    }

    #[test]
    fn test_today_schedules_filters_and_sorts() {
        let mut late = schedule(Day::Selasa, "13:00", "15:00");
        late.id = 2;
        let early = schedule(Day::Selasa, "08:00", "10:00");
        let other = schedule(Day::Rabu, "07:00", "09:00");

        let today = today_schedules(&[late, other, early], Day::Selasa);
        let starts: Vec<_> = today.iter().map(|s| s.start_time.as_str()).collect();
        assert_eq!(starts, ["08:00", "13:00"]);
    }

    #[test]
    fn test_tips_text() {
        assert!(tips_text(0).starts_with("Tidak ada kuliah"));
        assert_eq!(tips_text(3), "Kamu memiliki 3 kelas hari ini. Semangat belajar!");
    }
}
