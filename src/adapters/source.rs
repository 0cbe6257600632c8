use crate::domain::model::{ModuleDescr, SourceFile};
use crate::domain::ports::SourceLoader;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Reads module sources from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct LocalSourceLoader;

impl LocalSourceLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SourceLoader for LocalSourceLoader {
    async fn load(&self, module: &ModuleDescr) -> Result<SourceFile> {
        let bytes = tokio::fs::read(&module.path).await?;
        tracing::debug!("Read {} bytes from {}", bytes.len(), module.path.display());
        Ok(SourceFile::decode(module.path.clone(), module.name.clone(), bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn descr(path: PathBuf) -> ModuleDescr {
        ModuleDescr {
            basepath: path.clone(),
            path,
            name: "mod".to_string(),
            is_arg: true,
            basename: "mod".to_string(),
        }
    }

    #[test]
    fn test_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mod.py");
        std::fs::write(&path, b"\xef\xbb\xbfx = 1\n").unwrap();
        let source = tokio_test::block_on(LocalSourceLoader::new().load(&descr(path))).unwrap();
        assert_eq!(source.text, "x = 1\n");
        assert_eq!(source.module, "mod");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = LocalSourceLoader::new().load(&descr(PathBuf::from("/no/such/mod.py"))).await;
        assert!(result.is_err());
    }
}
