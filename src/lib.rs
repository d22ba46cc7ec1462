//! Contact-form relay — validates submissions, gates them behind an
//! optional human-verification check, and forwards them as email through
//! an interchangeable provider.

pub mod compose;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod pipeline;
pub mod routes;
pub mod submission;
pub mod verify;
