pub mod calendar;
pub mod collaborators;
pub mod config;
pub mod csv_pipeline;
pub mod error;
pub mod gmail;
pub mod google_api;
pub mod models;
pub mod name_format;
pub mod schedule;
pub mod search;
