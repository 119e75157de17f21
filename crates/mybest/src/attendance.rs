//! Sample attendance history for the presensi screen.
//!
//! There is no per-meeting attendance in the store, so the history list is
//! demo data: a random run of past weekly meetings with a status each.

use chrono::{Duration, NaiveDate};
use rand::Rng;

/// Fewest and most meetings a generated history holds.
pub const MIN_RECORDS: usize = 8;
pub const MAX_RECORDS: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceStatus {
    Hadir,
    Izin,
    Alpha,
}

impl AttendanceStatus {
    /// Draws a status: 85% hadir, 10% izin, 5% alpha.
    fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        match rng.gen_range(0..100) {
            0..=84 => AttendanceStatus::Hadir,
            85..=94 => AttendanceStatus::Izin,
            _ => AttendanceStatus::Alpha,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AttendanceStatus::Hadir => "HADIR",
            AttendanceStatus::Izin => "IZIN",
            AttendanceStatus::Alpha => "ALPHA",
        }
    }

    /// Badge color: success, warning, error.
    pub fn color(&self) -> &'static str {
        match self {
            AttendanceStatus::Hadir => "#27AE60",
            AttendanceStatus::Izin => "#F39C12",
            AttendanceStatus::Alpha => "#E74C3C",
        }
    }
}

/// One past meeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    /// 1-based meeting number (PTM)
    pub meeting: usize,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceSummary {
    pub hadir: usize,
    pub izin: usize,
    pub alpha: usize,
}

impl AttendanceSummary {
    pub fn total(&self) -> usize {
        self.hadir + self.izin + self.alpha
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceHistory {
    pub records: Vec<AttendanceRecord>,
    pub summary: AttendanceSummary,
}

/// Generates a history of 8 to 14 weekly meetings before `today`.
///
/// Record `n` is dated `7 * n` days before `today`.
pub fn generate_history<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> AttendanceHistory {
    let count = rng.gen_range(MIN_RECORDS..=MAX_RECORDS);
    let mut summary = AttendanceSummary::default();
    let mut records = Vec::with_capacity(count);
    let mut date = today;

    for meeting in 1..=count {
        date -= Duration::days(7);
        let status = AttendanceStatus::sample(rng);
        match status {
            AttendanceStatus::Hadir => summary.hadir += 1,
            AttendanceStatus::Izin => summary.izin += 1,
            AttendanceStatus::Alpha => summary.alpha += 1,
        }
        records.push(AttendanceRecord {
            meeting,
            date,
            status,
        });
    }

    AttendanceHistory { records, summary }
}
