pub mod adapters;
pub mod checkers;
pub mod config;
pub mod core;
pub mod domain;
pub mod python;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{reporter::reporter_for, source::LocalSourceLoader};
pub use core::engine::LintEngine;
pub use utils::error::{LintError, Result};
