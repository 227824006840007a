pub mod auth;
pub mod backup;
pub mod behaviors;
pub mod classes;
pub mod core;
pub mod dashboard;
pub mod import;
pub mod infractions;
pub mod reports;
pub mod students;
