// src/calendar/mod.rs

//! Calendar export and the subscription HTTP endpoint.

pub mod export;
pub mod server;

pub use export::{build_calendar, write_calendar};
