pub mod engine;
pub mod expand;
pub mod messages;
pub mod pragma;

pub use crate::domain::model::{Diagnostic, LintReport};
pub use crate::domain::ports::{Reporter, SourceLoader};
pub use crate::utils::error::Result;
