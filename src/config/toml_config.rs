use super::options::{ConfigLayer, OptionOrigin};
use crate::utils::error::{LintError, Result};
use std::path::Path;
use toml::{Table, Value};

/// `[tool.pylint.*]` tables of a pyproject.toml.
#[derive(Debug, Clone)]
pub struct PyprojectConfig {
    pylint: Option<Table>,
}

impl PyprojectConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut document: Table = toml::from_str(content)?;
        let pylint = match document.remove("tool") {
            Some(Value::Table(mut tool)) => match tool.remove("pylint") {
                Some(Value::Table(pylint)) => Some(pylint),
                Some(_) => return Err(LintError::config("tool.pylint must be a table")),
                None => None,
            },
            _ => None,
        };
        Ok(Self { pylint })
    }

    pub fn has_pylint_section(&self) -> bool {
        self.pylint.is_some()
    }

    /// Each `tool.pylint.<section>` option as a raw value the option validators accept.
    pub fn to_layer(&self, source: &str) -> Result<ConfigLayer> {
        let mut layer = ConfigLayer::new(OptionOrigin::File, source);
        let Some(pylint) = &self.pylint else {
            return Ok(layer);
        };
        for (section, options) in pylint {
            let Value::Table(options) = options else {
                return Err(LintError::config(format!(
                    "tool.pylint.{} must be a table of options",
                    section
                )));
            };
            for (name, value) in options {
                let raw = to_raw(value).ok_or_else(|| LintError::InvalidOptionValue {
                    option: name.clone(),
                    value: value.to_string(),
                    reason: "nested tables are not supported".to_string(),
                })?;
                layer.push(name.clone(), raw);
            }
        }
        Ok(layer)
    }
}

/// TOML value to ini-style text: booleans become `y`/`n`, arrays are comma joined.
fn to_raw(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(if *b { "y" } else { "n" }.to_string()),
        Value::Datetime(d) => Some(d.to_string()),
        Value::Array(items) => items
            .iter()
            .map(to_raw)
            .collect::<Option<Vec<_>>>()
            .map(|items| items.join(",")),
        Value::Table(_) => None,
    }
}

/// Whether a pyproject.toml has a `[tool.pylint]` table. Unreadable or malformed
/// files count as not having one.
pub fn has_pylint_section(path: &Path) -> bool {
    match PyprojectConfig::from_file(path) {
        Ok(config) => config.has_pylint_section(),
        Err(e) => {
            tracing::debug!("Not using {}: {}", path.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PYPROJECT: &str = r#"
[project]
name = "demo"

[tool.black]
line-length = 100

[tool.pylint.'MESSAGES CONTROL']
disable = ["missing-docstring", "C0103"]
enable = "W1309"

[tool.pylint.MASTER]
jobs = 4
recursive = true
"#;

    #[test]
    fn test_parse_pylint_tables() {
        let config = PyprojectConfig::from_toml_str(PYPROJECT).unwrap();
        assert!(config.has_pylint_section());
        let layer = config.to_layer("pyproject.toml").unwrap();
        let values: Vec<(&str, &str)> = layer
            .values
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert!(values.contains(&("disable", "missing-docstring,C0103")));
        assert!(values.contains(&("enable", "W1309")));
        assert!(values.contains(&("jobs", "4")));
        assert!(values.contains(&("recursive", "y")));
        assert_eq!(values.len(), 4);
    }

    #[test]
    fn test_without_pylint_section() {
        let config = PyprojectConfig::from_toml_str("[tool.black]\nline-length = 100\n").unwrap();
        assert!(!config.has_pylint_section());
        assert!(config.to_layer("pyproject.toml").unwrap().values.is_empty());
    }

    #[test]
    fn test_nested_table_is_rejected() {
        let config = PyprojectConfig::from_toml_str("[tool.pylint.MASTER.extra]\nx = 1\n").unwrap();
        assert!(config.to_layer("pyproject.toml").is_err());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            PyprojectConfig::from_toml_str("[tool.pylint"),
            Err(LintError::TomlError(_))
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(PYPROJECT.as_bytes()).unwrap();
        assert!(has_pylint_section(temp_file.path()));
    }
}
