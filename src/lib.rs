// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod article;
pub mod config;
pub mod countdown;
pub mod error;
pub mod history;
pub mod logging;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod text;
pub mod ui;
pub mod util;

/// Interval between session ticks.
pub const TICK_RATE_MS: u64 = 100;
