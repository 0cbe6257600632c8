//! Expansion of command line arguments into the list of modules to lint.

use crate::domain::model::ModuleDescr;
use crate::utils::error::LintError;
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

const INIT: &str = "__init__.py";

/// An argument that could not be turned into modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandError {
    pub key: String,
    pub message: String,
}

/// Skip rules shared by arguments and walked entries.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    pub names: Vec<String>,
    pub patterns: Vec<Regex>,
}

impl IgnoreRules {
    /// Whether a basename is ignored. Patterns must match from the first character.
    pub fn is_ignored(&self, basename: &str) -> bool {
        self.names.iter().any(|n| n == basename)
            || self
                .patterns
                .iter()
                .any(|re| re.find(basename).is_some_and(|m| m.start() == 0))
    }

    fn path_is_ignored(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.is_ignored(name))
    }
}

fn is_package(dir: &Path) -> bool {
    dir.join(INIT).is_file()
}

fn is_python_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "py")
}

/// Dotted module name of a file or package directory, rooted at the topmost
/// enclosing package.
pub fn modname_from_path(path: &Path) -> String {
    let (mut parts, mut dir) = if path.is_dir() {
        (Vec::new(), Some(path))
    } else {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let parts = if stem == "__init__" { Vec::new() } else { vec![stem.to_string()] };
        (parts, path.parent())
    };
    while let Some(current) = dir.filter(|d| is_package(d)) {
        match current.file_name().and_then(|n| n.to_str()) {
            Some(name) => parts.push(name.to_string()),
            None => break,
        }
        dir = current.parent();
    }
    parts.reverse();
    parts.join(".")
}

fn descr(
    path: PathBuf,
    name: String,
    is_arg: bool,
    basepath: &Path,
    basename: &str,
) -> ModuleDescr {
    ModuleDescr {
        path,
        name,
        is_arg,
        basepath: basepath.to_path_buf(),
        basename: basename.to_string(),
    }
}

fn readable(entry: walkdir::Result<DirEntry>) -> Option<DirEntry> {
    match entry {
        Ok(entry) => Some(entry),
        Err(e) => {
            tracing::warn!("⚠️ Skipping unreadable entry: {}", e);
            None
        }
    }
}

/// `.py` files below a package directory, descending only into sub-packages,
/// sorted by path.
fn package_files(root: &Path, ignore: &IgnoreRules) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !ignore.path_is_ignored(entry.path())
                    && (!entry.file_type().is_dir() || is_package(entry.path()))
        })
        .filter_map(readable)
        .filter(|entry| entry.file_type().is_file() && is_python_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

/// `.py` files anywhere below a plain directory.
fn recursive_files(root: &Path, ignore: &IgnoreRules) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !ignore.path_is_ignored(entry.path()))
        .filter_map(readable)
        .filter(|entry| entry.file_type().is_file() && is_python_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

fn file_module(path: &Path) -> ModuleDescr {
    let name = modname_from_path(path);
    descr(path.to_path_buf(), name.clone(), true, path, &name)
}

pub fn expand_modules(
    args: &[PathBuf],
    ignore: &IgnoreRules,
    recursive: bool,
) -> (Vec<ModuleDescr>, Vec<ExpandError>) {
    let mut result: Vec<ModuleDescr> = Vec::new();
    let mut errors = Vec::new();

    for arg in args {
        if ignore.path_is_ignored(arg) {
            tracing::debug!("Ignoring {}", arg.display());
            continue;
        }
        let key = arg.display().to_string();

        if arg.is_file() {
            result.push(file_module(arg));
        } else if arg.is_dir() && is_package(arg) {
            let init = arg.join(INIT);
            let basename = modname_from_path(arg);
            result.push(descr(init.clone(), basename.clone(), true, &init, &basename));
            for file in package_files(arg, ignore).into_iter().filter(|f| *f != init) {
                let name = if file.file_name().is_some_and(|n| n == INIT) {
                    format!("{}.__init__", modname_from_path(&file))
                } else {
                    modname_from_path(&file)
                };
                result.push(descr(file, name, false, &init, &basename));
            }
        } else if arg.is_dir() && recursive {
            result.extend(recursive_files(arg, ignore).iter().map(|f| file_module(f)));
        } else {
            errors.push(ExpandError {
                message: LintError::ModuleNotFound { name: key.clone() }.to_string(),
                key,
            });
        }
    }

    let mut seen = std::collections::HashSet::new();
    result.retain(|m| seen.insert(m.path.clone()));
    (result, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn patterns(list: &[&str]) -> IgnoreRules {
        IgnoreRules {
            names: Vec::new(),
            patterns: list.iter().map(|p| Regex::new(p).unwrap()).collect(),
        }
    }

    #[test]
    fn test_basename_in_ignore_patterns() {
        let rules = patterns(&[".*enchilada.*", "unittest_.*"]);
        assert!(rules.is_ignored("unittest_utils.py"));
        assert!(rules.is_ignored("cheese_enchiladas.xml"));
        assert!(!rules.is_ignored("test_utils.py"));
        assert!(!rules.is_ignored("enchilad.py"));
        assert!(!rules.is_ignored("my_unittest_x.py"));
    }

    fn case1() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("pkg1/subpkg1")).unwrap();
        fs::create_dir_all(root.join("pkg1/data")).unwrap();
        for file in [
            "module1.py",
            "pkg1/__init__.py",
            "pkg1/submodule1.py",
            "pkg1/submodule2.py",
            "pkg1/subpkg1/__init__.py",
            "pkg1/subpkg1/submodulea.py",
            "pkg1/subpkg1/submoduleb.py",
            "pkg1/data/loose.py",
        ] {
            fs::write(root.join(file), "").unwrap();
        }
        dir
    }

    fn names(modules: &[ModuleDescr]) -> Vec<(&str, bool, &str)> {
        modules
            .iter()
            .map(|m| (m.name.as_str(), m.is_arg, m.basename.as_str()))
            .collect()
    }

    #[test]
    fn test_expand_single_file() {
        let dir = case1();
        let (modules, errors) =
            expand_modules(&[dir.path().join("module1.py")], &IgnoreRules::default(), false);
        assert!(errors.is_empty());
        assert_eq!(names(&modules), vec![("module1", true, "module1")]);
        assert_eq!(modules[0].basepath, dir.path().join("module1.py"));
    }

    #[test]
    fn test_expand_subpackage() {
        let dir = case1();
        let (modules, _) =
            expand_modules(&[dir.path().join("pkg1/subpkg1")], &IgnoreRules::default(), false);
        assert_eq!(
            names(&modules),
            vec![
                ("pkg1.subpkg1", true, "pkg1.subpkg1"),
                ("pkg1.subpkg1.submodulea", false, "pkg1.subpkg1"),
                ("pkg1.subpkg1.submoduleb", false, "pkg1.subpkg1"),
            ]
        );
    }

    #[test]
    fn test_expand_package_skips_non_package_dirs() {
        let dir = case1();
        let (modules, _) =
            expand_modules(&[dir.path().join("pkg1")], &IgnoreRules::default(), false);
        assert_eq!(
            names(&modules),
            vec![
                ("pkg1", true, "pkg1"),
                ("pkg1.submodule1", false, "pkg1"),
                ("pkg1.submodule2", false, "pkg1"),
                ("pkg1.subpkg1.__init__", false, "pkg1"),
                ("pkg1.subpkg1.submodulea", false, "pkg1"),
                ("pkg1.subpkg1.submoduleb", false, "pkg1"),
            ]
        );
    }

    #[test]
    fn test_ignore_by_name() {
        let dir = case1();
        let rules = IgnoreRules {
            names: vec!["subpkg1".to_string()],
            patterns: Vec::new(),
        };
        let (modules, _) = expand_modules(&[dir.path().join("pkg1")], &rules, false);
        assert_eq!(modules.len(), 3);
    }

    #[test]
    fn test_plain_directory_needs_recursive() {
        let dir = case1();
        let (modules, errors) =
            expand_modules(&[dir.path().to_path_buf()], &IgnoreRules::default(), false);
        assert!(modules.is_empty());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("No module named"));

        let (modules, errors) =
            expand_modules(&[dir.path().to_path_buf()], &IgnoreRules::default(), true);
        assert!(errors.is_empty());
        let found: Vec<&str> = modules.iter().map(|m| m.name.as_str()).collect();
        assert!(found.contains(&"module1"));
        assert!(found.contains(&"pkg1.subpkg1.submodulea"));
        assert!(found.contains(&"loose"));
    }

    #[test]
    fn test_missing_path_is_error() {
        let (modules, errors) =
            expand_modules(&[PathBuf::from("/no/such/module.py")], &IgnoreRules::default(), false);
        assert!(modules.is_empty());
        assert_eq!(errors[0].key, "/no/such/module.py");
    }

    #[test]
    fn test_walk_errors_are_skipped() {
        let dir = TempDir::new().unwrap();
        let gone = dir.path().join("gone");
        assert!(recursive_files(&gone, &IgnoreRules::default()).is_empty());
        assert!(package_files(&gone, &IgnoreRules::default()).is_empty());
    }
}
