//! Login and guest-mode entry.

use crate::db::{NewUser, StoreError, User};
use crate::preferences::PreferenceError;
use crate::seed;
use crate::types::AppState;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("NIM tidak boleh kosong")]
    EmptyNim,

    #[error("Password tidak boleh kosong")]
    EmptyPassword,

    #[error(transparent)]
    Preferences(#[from] PreferenceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LoginError {
    /// True for problems the user can fix in the form.
    pub fn is_validation(&self) -> bool {
        matches!(self, LoginError::EmptyNim | LoginError::EmptyPassword)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub nim: String,
    pub password: String,
    pub remember_me: bool,
}

impl LoginForm {
    /// A form pre-filled with the remembered NIM, if the user asked for it.
    pub fn prefilled(state: &AppState) -> Self {
        let prefs = state.preferences.snapshot();
        if prefs.remember_me {
            Self {
                nim: prefs.saved_nim,
                remember_me: true,
                ..Self::default()
            }
        } else {
            Self::default()
        }
    }
}

/// Who the app is acting for after entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    pub is_guest: bool,
}

/// Validates the form and records a logged-in session.
///
/// There is no authentication backend: any non-empty NIM and password are
/// accepted. The NIM is remembered only when `remember_me` is set, and the
/// user row for that NIM becomes the current user.
pub async fn login(state: &AppState, form: &LoginForm) -> Result<Session, LoginError> {
    let nim = form.nim.trim();
    if nim.is_empty() {
        return Err(LoginError::EmptyNim);
    }
    if form.password.is_empty() {
        return Err(LoginError::EmptyPassword);
    }

    let prefs = state.preferences.update(|p| {
        p.remember_me = form.remember_me;
        p.saved_nim = if form.remember_me {
            nim.to_string()
        } else {
            String::new()
        };
        p.is_guest_mode = false;
        p.is_logged_in = true;
    })?;

    let name = if prefs.user_name.is_empty() {
        nim.to_string()
    } else {
        prefs.user_name
    };
    let user = state
        .repository
        .upsert_user(NewUser {
            name,
            nim: nim.to_string(),
            is_guest: false,
        })
        .await?;

    info!(user_id = user.id, "Logged in");
    Ok(Session {
        user,
        is_guest: false,
    })
}

/// Enters guest mode, replacing stored data with the sample set.
pub async fn enter_guest_mode(state: &AppState, now_millis: i64) -> Result<Session, LoginError> {
    state.preferences.update(|p| p.is_guest_mode = true)?;
    let user = seed::initialize_guest_data(&state.repository, now_millis).await?;

    info!("Entered guest mode");
    Ok(Session {
        user,
        is_guest: true,
    })
}
