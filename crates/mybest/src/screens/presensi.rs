//! Presensi: class detail, the attend button and the (sample) attendance history.

use crate::attendance::{self, AttendanceHistory};
use crate::db::{Schedule, StoreError};
use crate::types::AppState;
use chrono::NaiveDate;
use rand::Rng;
use tracing::info;

pub const PRESENSI_BUTTON: &str = "Presensi Sekarang";
pub const PRESENSI_ALREADY: &str = "Sudah Presensi";
pub const PRESENSI_SUCCESS: &str = "Presensi berhasil dicatat";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresensiView {
    pub schedule_id: i64,
    pub subject_name: String,
    /// "Senin - 08:00-10:30"
    pub schedule_time: String,
    pub dosen: String,
    pub room: String,
    pub code: String,
    pub sks: String,
    pub button_text: &'static str,
    pub button_enabled: bool,
    pub history: AttendanceHistory,
}

impl PresensiView {
    fn new(schedule: &Schedule, history: AttendanceHistory) -> Self {
        let (button_text, button_enabled) = if schedule.is_attended {
            (PRESENSI_ALREADY, false)
        } else {
            (PRESENSI_BUTTON, true)
        };

        Self {
            schedule_id: schedule.id,
            subject_name: schedule.subject_name.clone(),
            schedule_time: format!(
                "{} - {}-{}",
                schedule.day, schedule.start_time, schedule.end_time
            ),
            dosen: format!("Dosen: {}", schedule.dosen),
            room: format!("Ruang: {}", schedule.room),
            code: format!("Kode: {}", schedule.subject_code),
            sks: format!("SKS: {}", schedule.sks),
            button_text,
            button_enabled,
            history,
        }
    }
}

/// Builds the presensi screen for one class.
///
/// Returns `None` when the class can't be loaded, whether it is missing or
/// the lookup failed.
pub async fn load<R: Rng + ?Sized>(
    state: &AppState,
    schedule_id: i64,
    rng: &mut R,
    today: NaiveDate,
) -> Option<PresensiView> {
    let schedule = state.repository.schedule_by_id(schedule_id).await?;
    let history = attendance::generate_history(rng, today);
    Some(PresensiView::new(&schedule, history))
}

/// Records attendance for the class at `now_millis`.
///
/// # Returns
/// * `Ok(true)` - Attendance stored
/// * `Ok(false)` - No such class; nothing written
/// * `Err(StoreError)` - The write failed
pub async fn mark_attended(
    state: &AppState,
    schedule_id: i64,
    now_millis: i64,
) -> Result<bool, StoreError> {
    if state.repository.schedule_by_id(schedule_id).await.is_none() {
        return Ok(false);
    }

    state
        .repository
        .update_attendance(schedule_id, true, now_millis)
        .await?;
    info!(schedule_id, "{}", PRESENSI_SUCCESS);
    Ok(true)
}
