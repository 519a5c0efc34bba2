pub mod activities;
pub mod calendar;
pub mod dashboard;
pub mod events;
pub mod health;
pub mod insights;
pub mod profile;
pub mod projects;
pub mod quotes;
pub mod tasks;
