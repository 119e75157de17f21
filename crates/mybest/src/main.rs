use std::path::Path;

use chrono::Local;
use mybest::screens::{dashboard, login, presensi, DashboardView, LoginForm, PresensiView};
use mybest::{AppConfig, AppState};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::var("MYBEST_CONFIG") {
        Ok(path) => AppConfig::load(Path::new(&path))?,
        Err(_) => AppConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_max_level(config.tracing_level())
        .init();

    let state = AppState::open(config)?;
    let now = Local::now();

    match (std::env::var("MYBEST_NIM"), std::env::var("MYBEST_PASSWORD")) {
        (Ok(nim), Ok(password)) => {
            let form = LoginForm {
                nim,
                password,
                remember_me: std::env::var("MYBEST_REMEMBER").is_ok(),
            };
            match login::login(&state, &form).await {
                Ok(session) => info!("Logged in as {}", session.user.name),
                Err(e) if e.is_validation() => {
                    warn!("Login rejected: {}", e);
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            }
        }
        _ => {
            let prefs = state.preferences.snapshot();
            if prefs.is_logged_in || prefs.is_guest_mode {
                info!("Resuming previous session");
            } else {
                login::enter_guest_mode(&state, now.timestamp_millis()).await?;
            }
        }
    }

    let view = dashboard::load(&state, now.naive_local()).await;
    print_dashboard(&view);

    let Some(card) = view.today_classes.first() else {
        return Ok(());
    };

    if std::env::var("MYBEST_ATTEND").is_ok() {
        if presensi::mark_attended(&state, card.schedule_id, Local::now().timestamp_millis()).await? {
            println!("\n{}", presensi::PRESENSI_SUCCESS);
        }
    }

    let mut rng = rand::thread_rng();
    if let Some(detail) =
        presensi::load(&state, card.schedule_id, &mut rng, now.date_naive()).await
    {
        print_presensi(&detail);
    }

    Ok(())
}

fn print_dashboard(view: &DashboardView) {
    println!("{}", view.greeting_text);
    println!("[{}] {}", view.avatar, view.student_name);
    println!("{}", view.nim_text);
    println!("Status login: {}", view.login_status.text);
    if view.unread_notifications > 0 {
        println!("Notifikasi belum dibaca: {}", view.unread_notifications);
    }

    println!("\nKelas hari ini");
    for card in &view.today_classes {
        println!(
            "  {} {:<28} {:<14} {}",
            card.color, card.subject_name, card.time, card.room
        );
    }
    println!("\n{}", view.tips);
}

fn print_presensi(view: &PresensiView) {
    println!("\n{}", view.subject_name);
    println!("{}", view.schedule_time);
    println!("{} | {} | {} | {}", view.dosen, view.room, view.code, view.sks);
    println!("[{}]", view.button_text);

    println!("\nNo  Tanggal     PTM  Status");
    for record in &view.history.records {
        println!(
            "{:<3} {}  {:<4} {} {}",
            record.meeting,
            record.date.format("%Y-%m-%d"),
            record.meeting,
            record.status.color(),
            record.status.label()
        );
    }

    let summary = &view.history.summary;
    println!(
        "\nHadir: {}  Izin: {}  Alpha: {}",
        summary.hadir, summary.izin, summary.alpha
    );
}
