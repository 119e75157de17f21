//! Dashboard: greeting, student card, session status and today's classes.

use crate::db::{Day, Schedule};
use crate::display::{self, Greeting, ScheduleStatus};
use crate::seed::{GUEST_NAME, GUEST_NIM};
use crate::types::AppState;
use chrono::{Datelike, NaiveDateTime, Timelike};
use tracing::debug;

const SUCCESS_COLOR: &str = "#27AE60";
const ERROR_COLOR: &str = "#E74C3C";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub text: &'static str,
    pub color: &'static str,
}

/// One of today's classes, as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCard {
    pub schedule_id: i64,
    pub subject_name: String,
    /// "08:00 - 10:30"
    pub time: String,
    pub room: String,
    pub status: ScheduleStatus,
    pub color: &'static str,
}

impl ClassCard {
    fn new(schedule: &Schedule, now: NaiveDateTime) -> Self {
        let status = display::schedule_status(schedule, now);
        Self {
            schedule_id: schedule.id,
            subject_name: schedule.subject_name.clone(),
            time: format!("{} - {}", schedule.start_time, schedule.end_time),
            room: schedule.room.clone(),
            status,
            color: status.color(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub greeting: Greeting,
    pub greeting_text: &'static str,
    pub avatar: String,
    pub student_name: String,
    pub nim_text: String,
    pub login_status: StatusBadge,
    pub today_classes: Vec<ClassCard>,
    pub tips: String,
    pub unread_notifications: i64,
}

/// Builds the dashboard for `now`. Calling it again is a refresh.
///
/// Reads a snapshot of the current user and the schedule set; neither being
/// available is not an error, the dashboard falls back to the stored
/// preferences and an empty class list.
pub async fn load(state: &AppState, now: NaiveDateTime) -> DashboardView {
    let greeting = Greeting::for_hour(now.hour());
    let prefs = state.preferences.snapshot();

    let (student_name, nim) = match state.repository.current_user().first_or_none().await.flatten()
    {
        Some(user) => (user.name, user.nim),
        None => {
            let name = if prefs.user_name.is_empty() {
                GUEST_NAME.to_string()
            } else {
                prefs.user_name.clone()
            };
            let nim = if prefs.saved_nim.is_empty() {
                GUEST_NIM.to_string()
            } else {
                prefs.saved_nim.clone()
            };
            (name, nim)
        }
    };

    let logged_in = prefs.is_logged_in || prefs.is_guest_mode;
    let login_status = if logged_in {
        StatusBadge {
            text: "Valid",
            color: SUCCESS_COLOR,
        }
    } else {
        StatusBadge {
            text: "Tidak Valid",
            color: ERROR_COLOR,
        }
    };

    let schedules = state
        .repository
        .all_schedules()
        .first_or_none()
        .await
        .unwrap_or_default();
    let today = display::today_schedules(&schedules, Day::from(now.weekday()));
    let today_classes: Vec<ClassCard> = today.iter().map(|s| ClassCard::new(s, now)).collect();
    debug!("Dashboard shows {} classes today", today_classes.len());

    let unread_notifications = state
        .repository
        .unread_notification_count()
        .await
        .unwrap_or(0);

    DashboardView {
        greeting,
        greeting_text: greeting.label(),
        avatar: display::initials(&student_name),
        nim_text: display::format_nim(&nim),
        student_name,
        login_status,
        tips: display::tips_text(today_classes.len()),
        today_classes,
        unread_notifications,
    }
}
