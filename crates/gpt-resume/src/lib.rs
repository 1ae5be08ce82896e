//! Resume screening backend: job postings, applicants, their parsed resume
//! records, and the HTTP surface used by the screening front end.

pub mod config;
pub mod error;
pub mod screening;
pub mod telemetry;
