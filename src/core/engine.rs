use crate::checkers::{self, CheckContext, Checker};
use crate::config::options::LintOptions;
use crate::core::expand::{expand_modules, ExpandError, IgnoreRules};
use crate::core::messages::{MessageState, MessageStore, FATAL, SUPPRESSED_MESSAGE, SYNTAX_ERROR};
use crate::core::pragma::Pragmas;
use crate::domain::model::{Diagnostic, Emission, LintReport, ModuleDescr, ModuleReport, SourceFile};
use crate::domain::ports::SourceLoader;
use crate::python::ParsedModule;
use crate::utils::error::{LintError, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Everything a lint task needs, shared between tasks.
struct Linter {
    store: MessageStore,
    state: MessageState,
    checkers: Vec<Box<dyn Checker>>,
}

impl Linter {
    fn diagnostic(
        &self,
        emission: &Emission,
        module: &str,
        path: &str,
        obj: String,
    ) -> Option<Diagnostic> {
        let def = self.store.get(emission.msgid)?;
        Some(Diagnostic {
            msg_id: def.msgid.to_string(),
            symbol: def.symbol.to_string(),
            category: def.category(),
            message: def.format(&emission.args),
            path: path.to_string(),
            module: module.to_string(),
            obj,
            line: emission.line,
            column: emission.column,
        })
    }

    fn fatal(&self, name: &str, path: &str, message: String) -> ModuleReport {
        let emission = Emission::new(FATAL, vec![message], 1, 0);
        ModuleReport {
            name: name.to_string(),
            path: path.to_string(),
            diagnostics: self
                .state
                .is_enabled(FATAL)
                .then(|| self.diagnostic(&emission, name, path, String::new()))
                .flatten()
                .into_iter()
                .collect(),
            statements: 0,
        }
    }

    fn lint(&self, descr: &ModuleDescr, source: SourceFile) -> ModuleReport {
        let path = source.path.display().to_string();
        let mut report = ModuleReport {
            name: descr.name.clone(),
            path: path.clone(),
            ..Default::default()
        };

        let module = match ParsedModule::parse(source) {
            Ok(module) => module,
            Err(LintError::TokenizeError { line, column, message }) => {
                tracing::debug!("Syntax error in {}: {}", path, message);
                let emission = Emission::new(SYNTAX_ERROR, vec![message], line, column);
                if self.state.is_enabled(SYNTAX_ERROR) {
                    report
                        .diagnostics
                        .extend(self.diagnostic(&emission, &descr.name, &path, String::new()));
                }
                return report;
            }
            Err(e) => return self.fatal(&descr.name, &path, e.to_string()),
        };

        let pragmas = Pragmas::collect(&module.tokens, &module.lines, &self.store);
        if pragmas.skip_file {
            tracing::debug!("⏭️ Skipping {} (skip-file)", descr.name);
            return report;
        }
        report.statements = module.statement_count();

        let mut ctx = CheckContext::new();
        for checker in &self.checkers {
            checker.check(&module, &mut ctx);
        }

        let mut kept: Vec<Emission> = pragmas
            .emissions
            .iter()
            .filter(|e| self.state.is_enabled(e.msgid))
            .cloned()
            .collect();
        for emission in ctx.into_emissions() {
            let globally = self.state.is_enabled(emission.msgid);
            match pragmas.state_for(emission.msgid, emission.line) {
                Some((true, _)) => kept.push(emission),
                Some((false, origin)) => {
                    if globally && self.state.is_enabled(SUPPRESSED_MESSAGE) {
                        let symbol = self
                            .store
                            .get(emission.msgid)
                            .map_or(emission.msgid, |d| d.symbol);
                        kept.push(Emission::new(
                            SUPPRESSED_MESSAGE,
                            vec![symbol.to_string(), origin.to_string()],
                            emission.line,
                            emission.column,
                        ));
                    }
                }
                None if globally => kept.push(emission),
                None => {}
            }
        }

        report.diagnostics = kept
            .iter()
            .filter_map(|e| {
                let obj = e.obj.clone().unwrap_or_else(|| module.outline.scope_at(e.line));
                self.diagnostic(e, &descr.name, &path, obj)
            })
            .collect();
        report
            .diagnostics
            .sort_by(|a, b| (a.line, a.column, &a.msg_id).cmp(&(b.line, b.column, &b.msg_id)));
        report
    }
}

pub struct LintEngine<L: SourceLoader + 'static> {
    options: LintOptions,
    loader: Arc<L>,
    linter: Arc<Linter>,
}

impl<L: SourceLoader + 'static> LintEngine<L> {
    pub fn new(options: LintOptions, loader: L) -> Result<Self> {
        let checkers = checkers::load_all(&options)?;
        let mut store = MessageStore::new();
        for checker in &checkers {
            store.register(checker.name(), checker.messages());
        }
        let state = MessageState::new(&store, &options.message_control);
        Ok(Self {
            options,
            loader: Arc::new(loader),
            linter: Arc::new(Linter {
                store,
                state,
                checkers,
            }),
        })
    }

    pub fn store(&self) -> &MessageStore {
        &self.linter.store
    }

    pub async fn run(&self, paths: &[PathBuf]) -> Result<LintReport> {
        let ignore = IgnoreRules {
            names: self.options.ignore.clone(),
            patterns: self.options.ignore_patterns.clone(),
        };
        let (modules, errors) = expand_modules(paths, &ignore, self.options.recursive);
        tracing::info!("🔍 Linting {} module(s)", modules.len());

        let mut report = LintReport::default();
        for ExpandError { key, message } in errors {
            tracing::warn!("⚠️ {}", message);
            report.modules.push(self.linter.fatal(&key, &key, message));
        }

        let jobs = self.options.effective_jobs().min(Semaphore::MAX_PERMITS);
        let limiter = Arc::new(Semaphore::new(jobs));
        let mut tasks = JoinSet::new();
        let mut pending = HashMap::new();
        for (index, descr) in modules.into_iter().enumerate() {
            let limiter = Arc::clone(&limiter);
            let loader = Arc::clone(&self.loader);
            let linter = Arc::clone(&self.linter);
            let name = descr.name.clone();
            let path = descr.path.display().to_string();
            let handle = tasks.spawn(async move {
                let _permit = limiter.acquire_owned().await;
                match loader.load(&descr).await {
                    Ok(source) => linter.lint(&descr, source),
                    Err(e) => {
                        tracing::warn!("⚠️ Cannot read {}: {}", descr.path.display(), e);
                        let path = descr.path.display().to_string();
                        linter.fatal(&descr.name, &path, e.to_string())
                    }
                }
            });
            pending.insert(handle.id(), (index, name, path));
        }

        let mut linted = Vec::new();
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((id, module_report)) => {
                    if let Some((index, _, _)) = pending.remove(&id) {
                        linted.push((index, module_report));
                    }
                }
                Err(e) => {
                    if let Some((index, name, path)) = pending.remove(&e.id()) {
                        tracing::error!("❌ Linting {} failed: {}", path, e);
                        linted.push((index, self.linter.fatal(&name, &path, e.to_string())));
                    }
                }
            }
        }
        linted.sort_by_key(|(index, _)| *index);
        report.modules.extend(linted.into_iter().map(|(_, m)| m));

        tracing::info!(
            "✅ Linted {} statement(s), {} message(s)",
            report.statements(),
            report.diagnostics().count()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::MessageCategory;
    use async_trait::async_trait;
    use std::path::Path;

    /// Serves sources from memory, keyed by file name.
    struct MemoryLoader(HashMap<String, String>);

    #[async_trait]
    impl SourceLoader for MemoryLoader {
        async fn load(&self, module: &ModuleDescr) -> Result<SourceFile> {
            let name = module.path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            let text = self.0.get(name).cloned().ok_or_else(|| {
                let missing = std::io::Error::new(std::io::ErrorKind::NotFound, name.to_string());
                LintError::IoError(missing)
            })?;
            Ok(SourceFile {
                path: module.path.clone(),
                module: module.name.clone(),
                text,
            })
        }
    }

    fn descr(name: &str) -> ModuleDescr {
        ModuleDescr {
            path: Path::new(name).with_extension("py"),
            name: name.to_string(),
            is_arg: true,
            basepath: PathBuf::from(name),
            basename: name.to_string(),
        }
    }

    fn lint(options: LintOptions, text: &str) -> ModuleReport {
        let engine = LintEngine::new(options, MemoryLoader(HashMap::new())).unwrap();
        let source = SourceFile {
            path: PathBuf::from("mod.py"),
            module: "mod".to_string(),
            text: text.to_string(),
        };
        engine.linter.lint(&descr("mod"), source)
    }

    fn ids(report: &ModuleReport) -> Vec<&str> {
        report.diagnostics.iter().map(|d| d.msg_id.as_str()).collect()
    }

    #[test]
    fn test_reports_fstring_with_scope() {
        let report = lint(LintOptions::default(), "def f():\n    return f'x'\n");
        assert_eq!(ids(&report), vec!["W1309"]);
        assert_eq!(report.diagnostics[0].obj, "f");
        assert_eq!(report.diagnostics[0].category, MessageCategory::Warning);
        assert_eq!(report.statements, 2);
    }

    #[test]
    fn test_pragma_and_suppressed_message() {
        let source = "x = f'a'  # pylint: disable=f-string-without-interpolation\ny = f'b'\n";
        assert_eq!(ids(&lint(LintOptions::default(), source)), vec!["W1309"]);

        let mut options = LintOptions::default();
        options.message_control.push(crate::core::messages::MessageControl {
            disable: Vec::new(),
            enable: vec!["I".to_string()],
        });
        let report = lint(options, source);
        assert_eq!(ids(&report), vec!["I0020", "I0011", "W1309"]);
        assert_eq!(
            report.diagnostics[0].message,
            "Suppressed f-string-without-interpolation (from line 1)"
        );
    }

    #[test]
    fn test_syntax_error() {
        let report = lint(LintOptions::default(), "x = 'unterminated\n");
        assert_eq!(ids(&report), vec!["E0001"]);
        assert_eq!(report.statements, 0);
    }

    #[test]
    fn test_skip_file() {
        let report = lint(LintOptions::default(), "# pylint: skip-file\nx = f''\n");
        assert!(report.diagnostics.is_empty());
    }

    #[tokio::test]
    async fn test_run_reports_missing_paths_and_unreadable_modules() {
        let engine = LintEngine::new(LintOptions::default(), MemoryLoader(HashMap::new())).unwrap();
        let report = engine.run(&[PathBuf::from("/definitely/missing.py")]).await.unwrap();
        assert_eq!(report.modules.len(), 1);
        assert_eq!(report.modules[0].diagnostics[0].msg_id, "F0001");
        assert_eq!(report.exit_code(), 1);
    }

    /// Panics while loading `boom`, serves an unused f-string otherwise.
    struct FlakyLoader;

    #[async_trait]
    impl SourceLoader for FlakyLoader {
        async fn load(&self, module: &ModuleDescr) -> Result<SourceFile> {
            if module.name == "boom" {
                panic!("loader failed for {}", module.name);
            }
            Ok(SourceFile {
                path: module.path.clone(),
                module: module.name.clone(),
                text: "x = f'a'\n".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_failed_task_only_affects_its_module() {
        let dir = tempfile::TempDir::new().unwrap();
        let paths: Vec<PathBuf> = ["boom.py", "fine.py"]
            .iter()
            .map(|n| dir.path().join(n))
            .collect();
        for path in &paths {
            std::fs::write(path, "").unwrap();
        }

        let engine = LintEngine::new(LintOptions::default(), FlakyLoader).unwrap();
        let report = engine.run(&paths).await.unwrap();

        let modules: Vec<(&str, Vec<&str>)> = report
            .modules
            .iter()
            .map(|m| (m.name.as_str(), ids(m)))
            .collect();
        assert_eq!(modules, vec![("boom", vec!["F0001"]), ("fine", vec!["W1309"])]);
        assert_eq!(report.exit_code(), 1 | 4);
    }

    #[tokio::test]
    async fn test_huge_jobs_value_is_capped() {
        let options = LintOptions {
            jobs: 9_000_000_000_000_000_000,
            ..LintOptions::default()
        };
        let engine = LintEngine::new(options, MemoryLoader(HashMap::new())).unwrap();
        let report = engine.run(&[PathBuf::from("/definitely/missing.py")]).await.unwrap();
        assert_eq!(report.modules.len(), 1);
    }
}
