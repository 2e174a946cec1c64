#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod bridge;
pub mod config;
pub mod error;
pub mod event;
pub mod swis;
pub mod telemetry;
pub mod types;

pub type Result<T> = std::result::Result<T, error::Error>;
