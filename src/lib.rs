#![forbid(unsafe_code)]

//! Client-side orchestration for supervised remote agent runs: a session
//! controller state machine, a single-armed poll scheduler, and an HTTP
//! gateway to the remote service.

pub mod config;
pub mod controller;
pub mod errors;
pub mod gateway;
pub mod models;
pub mod scheduler;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
