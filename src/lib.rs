// src/lib.rs

//! starnotify: GitHub trending repository notifier library.

pub mod config;
pub mod error;
pub mod format;
pub mod messaging;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
