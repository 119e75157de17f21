/// Record types persisted in the local store
use chrono::Weekday;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::StoreError;

/// The student the app is currently acting for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub nim: String,
    /// True for the sample account created on guest-mode entry
    pub is_guest: bool,
    /// Epoch millis of the last write, used to pick the current user
    pub updated_at: i64,
}

/// A user that has not been written yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub nim: String,
    pub is_guest: bool,
}

/// Day of the week, named the way the campus timetable names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Day {
    Senin,
    Selasa,
    Rabu,
    Kamis,
    Jumat,
    Sabtu,
    Minggu,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Senin,
        Day::Selasa,
        Day::Rabu,
        Day::Kamis,
        Day::Jumat,
        Day::Sabtu,
        Day::Minggu,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Senin => "Senin",
            Day::Selasa => "Selasa",
            Day::Rabu => "Rabu",
            Day::Kamis => "Kamis",
            Day::Jumat => "Jumat",
            Day::Sabtu => "Sabtu",
            Day::Minggu => "Minggu",
        }
    }

    pub fn weekday(&self) -> Weekday {
        match self {
            Day::Senin => Weekday::Mon,
            Day::Selasa => Weekday::Tue,
            Day::Rabu => Weekday::Wed,
            Day::Kamis => Weekday::Thu,
            Day::Jumat => Weekday::Fri,
            Day::Sabtu => Weekday::Sat,
            Day::Minggu => Weekday::Sun,
        }
    }
}

impl From<Weekday> for Day {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => Day::Senin,
            Weekday::Tue => Day::Selasa,
            Weekday::Wed => Day::Rabu,
            Weekday::Thu => Day::Kamis,
            Weekday::Fri => Day::Jumat,
            Weekday::Sat => Day::Sabtu,
            Weekday::Sun => Day::Minggu,
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Day::ALL
            .into_iter()
            .find(|day| day.as_str() == s)
            .ok_or_else(|| StoreError::InvalidDay(s.to_string()))
    }
}

impl ToSql for Day {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Day {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        text.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// A recurring weekly class slot.
///
/// Attendance lives on the row itself, so marking a class attended covers
/// every week the slot recurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: i64,
    pub subject_name: String,
    pub subject_code: String,
    pub day: Day,
    /// "HH:MM"
    pub start_time: String,
    /// "HH:MM"
    pub end_time: String,
    pub room: String,
    pub dosen: String,
    pub sks: i32,
    pub is_attended: bool,
    /// Epoch millis of the last attendance mark
    pub attended_at: Option<i64>,
}

/// A schedule that has not been written yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSchedule {
    pub subject_name: String,
    pub subject_code: String,
    pub day: Day,
    pub start_time: String,
    pub end_time: String,
    pub room: String,
    pub dosen: String,
    pub sks: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub message: String,
    pub timestamp: i64,
    pub is_read: bool,
}

/// Tables of the store. Each one has its own change feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    Schedules,
    Notifications,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Users, Table::Schedules, Table::Notifications];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Schedules => "schedules",
            Table::Notifications => "notifications",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_parse_round_trip() {
        for day in Day::ALL {
            assert_eq!(day.as_str().parse::<Day>().unwrap(), day);
            assert_eq!(Day::from(day.weekday()), day);
        }
    }

    #[test]
    fn test_day_parse_rejects_unknown() {
        assert!(matches!(
            "Monday".parse::<Day>(),
            Err(StoreError::InvalidDay(ref s)) if s == "Monday"
        ));
    }
}
