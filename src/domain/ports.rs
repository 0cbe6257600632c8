use crate::domain::model::{LintReport, ModuleDescr, SourceFile};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Where module sources come from.
#[async_trait]
pub trait SourceLoader: Send + Sync {
    async fn load(&self, module: &ModuleDescr) -> Result<SourceFile>;
}

/// Renders a finished run.
pub trait Reporter: Send + Sync {
    fn render(&self, report: &LintReport) -> Result<String>;
}
