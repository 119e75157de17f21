//! Screens as view-model builders.
//!
//! Each screen reads preferences and the repository and returns a plain view
//! struct; rendering is left to the front end.

pub mod dashboard;
pub mod login;
pub mod presensi;

pub use dashboard::{ClassCard, DashboardView, StatusBadge};
pub use login::{LoginError, LoginForm, Session};
pub use presensi::{PresensiView, PRESENSI_ALREADY, PRESENSI_SUCCESS};
