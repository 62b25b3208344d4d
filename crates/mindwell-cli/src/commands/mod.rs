pub mod affirmation;
pub mod auth;
pub mod community;
pub mod config;
pub mod export;
pub mod habit;
pub mod journal;
pub mod meditate;
pub mod mood;
pub mod payment;
pub mod reset;
pub mod sos;
pub mod stats;
