// Checkers walk a parsed module and emit messages; the engine decides which survive.

pub mod docstring;
pub mod strings;

use crate::config::options::LintOptions;
use crate::core::messages::MessageDefinition;
use crate::domain::model::Emission;
use crate::python::ParsedModule;
use crate::utils::error::{LintError, Result};

pub use docstring::DocstringChecker;
pub use strings::StringChecker;

/// Plugin names accepted by `load-plugins` for the docstring checker.
pub const DOCSTRING_PLUGINS: &[&str] = &[
    "pylint.extensions.check_docs",
    "pylint.extensions.docparams",
];

#[derive(Debug, Default)]
pub struct CheckContext {
    emissions: Vec<Emission>,
}

impl CheckContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, msgid: &'static str, args: Vec<String>, line: usize, column: usize) {
        self.emissions.push(Emission::new(msgid, args, line, column));
    }

    pub fn push(&mut self, emission: Emission) {
        self.emissions.push(emission);
    }

    pub fn into_emissions(self) -> Vec<Emission> {
        self.emissions
    }
}

pub trait Checker: Send + Sync {
    fn name(&self) -> &'static str;
    fn messages(&self) -> &'static [MessageDefinition];
    fn check(&self, module: &ParsedModule, ctx: &mut CheckContext);
}

/// Checkers that always run.
pub fn builtin() -> Vec<Box<dyn Checker>> {
    vec![Box::new(StringChecker)]
}

pub fn plugin(name: &str, options: &LintOptions) -> Result<Box<dyn Checker>> {
    if DOCSTRING_PLUGINS.contains(&name) {
        return Ok(Box::new(DocstringChecker::new(
            options.accept_no_param_doc,
            options.accept_no_raise_doc,
        )));
    }
    Err(LintError::PluginError {
        name: name.to_string(),
    })
}

/// Builtin checkers plus every plugin named in `load-plugins`, each loaded once.
pub fn load_all(options: &LintOptions) -> Result<Vec<Box<dyn Checker>>> {
    let mut checkers = builtin();
    for name in &options.load_plugins {
        let checker = plugin(name, options)?;
        if checkers.iter().any(|c| c.name() == checker.name()) {
            continue;
        }
        tracing::debug!("🔌 Loaded plugin {}", name);
        checkers.push(checker);
    }
    Ok(checkers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_lookup() {
        let options = LintOptions::default();
        assert_eq!(
            plugin("pylint.extensions.docparams", &options).unwrap().name(),
            "docstring_checks"
        );
        assert!(matches!(
            plugin("no.such.plugin", &options),
            Err(LintError::PluginError { .. })
        ));
    }

    #[test]
    fn test_load_all_deduplicates() {
        let options = LintOptions {
            load_plugins: DOCSTRING_PLUGINS.iter().map(|s| s.to_string()).collect(),
            ..LintOptions::default()
        };
        let names: Vec<&str> = load_all(&options).unwrap().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["string", "docstring_checks"]);
    }
}
