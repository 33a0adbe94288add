#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod error;
pub mod notifier;
pub mod poll;
pub mod scanner;
pub mod startup;
pub mod telemetry;
pub mod types;
pub mod util;
pub mod window;
pub mod zbx_client;

pub type Result<T> = std::result::Result<T, error::Error>;
