//! Sample data loaded when the app is entered in guest mode.

use crate::db::{Day, NewSchedule, NewUser, StoreError, User};
use crate::repository::AppRepository;
use tracing::info;

pub const GUEST_NAME: &str = "Guest User";
pub const GUEST_NIM: &str = "00000000";

const WELCOME_MESSAGE: &str =
    "Selamat datang di mode tamu. Data jadwal yang ditampilkan adalah contoh.";

/// (subject, code, day, start, end, room, dosen, sks)
const SAMPLE_SCHEDULES: &[(&str, &str, Day, &str, &str, &str, &str, i32)] = &[
    ("Pemrograman Web", "PW301", Day::Senin, "08:00", "10:30", "R-301", "Andi Saputra, M.Kom", 3),
    ("Basis Data", "BD202", Day::Senin, "13:00", "15:30", "Lab-2", "Dr. Sari Wulandari", 3),
    ("Jaringan Komputer", "JK305", Day::Selasa, "10:00", "12:30", "R-402", "Budi Hartono, M.T", 3),
    ("Statistika", "ST110", Day::Rabu, "08:00", "09:40", "R-205", "Rina Marlina, M.Si", 2),
    ("Sistem Operasi", "SO204", Day::Rabu, "13:00", "15:30", "Lab-1", "Hendra Gunawan, M.Kom", 3),
    ("Rekayasa Perangkat Lunak", "RPL307", Day::Kamis, "09:00", "11:30", "R-303", "Dewi Anggraini, M.Kom", 3),
    ("Pendidikan Pancasila", "PP101", Day::Jumat, "08:00", "09:40", "Aula", "Drs. Slamet Riyadi", 2),
    ("Kecerdasan Buatan", "KB309", Day::Jumat, "13:30", "16:00", "Lab-3", "Dr. Yusuf Maulana", 3),
    ("Praktikum Mobile", "PM310", Day::Sabtu, "09:00", "11:30", "Lab-2", "Fajar Nugroho, M.Kom", 2),
];

pub fn sample_schedules() -> Vec<NewSchedule> {
    SAMPLE_SCHEDULES
        .iter()
        .map(
            |&(subject_name, subject_code, day, start_time, end_time, room, dosen, sks)| NewSchedule {
                subject_name: subject_name.to_string(),
                subject_code: subject_code.to_string(),
                day,
                start_time: start_time.to_string(),
                end_time: end_time.to_string(),
                room: room.to_string(),
                dosen: dosen.to_string(),
                sks,
            },
        )
        .collect()
}

/// Replaces users and schedules with the guest sample set.
///
/// # Arguments
/// * `repository` - Repository to write through
/// * `now_millis` - Timestamp for the welcome notification
///
/// # Returns
/// * `Ok(User)` - The guest user, now the current user
/// * `Err(StoreError)` - If any write fails
pub async fn initialize_guest_data(
    repository: &AppRepository,
    now_millis: i64,
) -> Result<User, StoreError> {
    repository.clear_users().await?;
    repository.clear_schedules().await?;

    let ids = repository.insert_schedules(sample_schedules()).await?;
    let guest = repository
        .upsert_user(NewUser {
            name: GUEST_NAME.to_string(),
            nim: GUEST_NIM.to_string(),
            is_guest: true,
        })
        .await?;
    repository
        .insert_notification(WELCOME_MESSAGE, now_millis)
        .await?;

    info!("Seeded guest data with {} schedules", ids.len());
    Ok(guest)
}
