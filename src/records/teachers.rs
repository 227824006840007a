use crate::error::{AppError, AppResult};
use crate::model::Teacher;
use crate::store::{Table, TableStore};
use serde::Serialize;

/// What a successful login hands back. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeacherProfile {
    pub id: String,
    pub name: String,
    pub username: String,
}

pub fn login(store: &dyn TableStore, username: &str, password: &str) -> AppResult<TeacherProfile> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AppError::validation("username and password are required"));
    }
    store
        .rows(Table::Teachers)?
        .iter()
        .filter_map(|r| Teacher::from_row(r))
        .find(|t| t.username == username && t.password == password)
        .map(|t| TeacherProfile {
            id: t.id,
            name: t.name,
            username: t.username,
        })
        .ok_or(AppError::InvalidCredentials)
}
