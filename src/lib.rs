// src/lib.rs

//! U-Cursos Scraper Library

pub mod calendar;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod session;
pub mod storage;
pub mod utils;
