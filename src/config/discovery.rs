//! Locating the configuration file when none is given explicitly.

use super::ini_file::{self, IniFlavor};
use super::options::ConfigLayer;
use super::toml_config::{self, PyprojectConfig};
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

const RC_NAMES: &[&str] = &["pylintrc", ".pylintrc"];
const SYSTEM_RCFILE: &str = "/etc/pylintrc";

/// A configuration file and the parser its name calls for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Pylintrc(PathBuf),
    SetupCfg(PathBuf),
    Pyproject(PathBuf),
}

impl ConfigSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if name.ends_with(".toml") {
            ConfigSource::Pyproject(path)
        } else if name == "setup.cfg" {
            ConfigSource::SetupCfg(path)
        } else {
            ConfigSource::Pylintrc(path)
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::Pylintrc(p) | ConfigSource::SetupCfg(p) | ConfigSource::Pyproject(p) => p,
        }
    }

    pub fn load(&self) -> Result<ConfigLayer> {
        let source = self.path().display().to_string();
        match self {
            ConfigSource::Pylintrc(path) => ini_file::read_ini_file(path, IniFlavor::Pylintrc),
            ConfigSource::SetupCfg(path) => ini_file::read_ini_file(path, IniFlavor::SetupCfg),
            ConfigSource::Pyproject(path) => PyprojectConfig::from_file(path)?.to_layer(&source),
        }
    }
}

/// `pylintrc`, then `.pylintrc`, in `dir`.
pub fn find_pylintrc_in(dir: &Path) -> Option<PathBuf> {
    RC_NAMES.iter().map(|name| dir.join(name)).find(|path| path.is_file())
}

/// Search roots, taken from the process environment or set directly in tests.
#[derive(Debug, Clone)]
pub struct ConfigDiscovery {
    pub cwd: PathBuf,
    pub home: Option<PathBuf>,
    /// Value of `PYLINTRC`
    pub env_rcfile: Option<PathBuf>,
    pub system_rcfile: PathBuf,
}

impl ConfigDiscovery {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            cwd: std::env::current_dir()?,
            home: std::env::var_os("HOME").map(PathBuf::from),
            env_rcfile: std::env::var_os("PYLINTRC").map(PathBuf::from),
            system_rcfile: PathBuf::from(SYSTEM_RCFILE),
        })
    }

    /// First match wins: cwd rc files, cwd pyproject.toml and setup.cfg (when
    /// they configure the linter), enclosing packages, `PYLINTRC`, the home
    /// directory, then the system file.
    pub fn find_config_file(&self) -> Option<ConfigSource> {
        if let Some(path) = find_pylintrc_in(&self.cwd) {
            return Some(ConfigSource::Pylintrc(path));
        }
        let pyproject = self.cwd.join("pyproject.toml");
        if pyproject.is_file() && toml_config::has_pylint_section(&pyproject) {
            return Some(ConfigSource::Pyproject(pyproject));
        }
        let setup_cfg = self.cwd.join("setup.cfg");
        if setup_cfg.is_file() && ini_file::has_pylint_section(&setup_cfg) {
            return Some(ConfigSource::SetupCfg(setup_cfg));
        }
        if let Some(path) = self.find_in_packages() {
            return Some(ConfigSource::Pylintrc(path));
        }
        self.find_global().map(ConfigSource::Pylintrc)
    }

    /// rc files in parent directories, while the directory below is a package.
    fn find_in_packages(&self) -> Option<PathBuf> {
        let mut dir = self.cwd.as_path();
        while dir.join("__init__.py").is_file() {
            dir = dir.parent()?;
            if let Some(path) = find_pylintrc_in(dir) {
                return Some(path);
            }
        }
        None
    }

    fn find_global(&self) -> Option<PathBuf> {
        if let Some(env) = self.env_rcfile.as_ref().filter(|p| p.is_file()) {
            return Some(env.clone());
        }
        if let Some(home) = &self.home {
            if let Some(path) = [home.join(".pylintrc"), home.join(".config").join("pylintrc")]
                .into_iter()
                .find(|p| p.is_file())
            {
                return Some(path);
            }
        }
        self.system_rcfile.is_file().then(|| self.system_rcfile.clone())
    }
}
