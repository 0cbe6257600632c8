//! pylintrc and setup.cfg reading: the configparser subset these files use.

use super::options::{ConfigLayer, OptionOrigin};
use crate::utils::error::{LintError, Result};
use std::path::Path;

const SETUP_CFG_PREFIX: &str = "PYLINT.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IniFlavor {
    /// Every section holds linter options
    Pylintrc,
    /// Only `[pylint.*]` sections hold linter options, others belong to other tools
    SetupCfg,
}

/// Sections (upper-cased) with their `(key, value)` pairs in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    pub sections: Vec<(String, Vec<(String, String)>)>,
}

fn strip_inline_comment(value: &str) -> &str {
    let mut prev_ws = false;
    for (i, c) in value.char_indices() {
        if (c == '#' || c == ';') && prev_ws {
            return value[..i].trim_end();
        }
        prev_ws = c.is_whitespace();
    }
    value.trim_end()
}

fn is_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with('#') || trimmed.starts_with(';')
}

impl IniDocument {
    pub fn parse(content: &str, path: &str) -> Result<Self> {
        let mut doc = IniDocument::default();
        let mut current: Option<usize> = None;
        // indentation of the key whose value may continue on the next lines
        let mut open_key: Option<usize> = None;

        for (index, raw_line) in content.lines().enumerate() {
            let lineno = index + 1;
            let error = |message: &str| LintError::ConfigFileError {
                path: path.to_string(),
                line: lineno,
                message: message.to_string(),
            };
            if raw_line.trim().is_empty() || is_comment(raw_line) {
                continue;
            }
            let indent = raw_line.len() - raw_line.trim_start().len();

            if open_key.is_some_and(|key_indent| indent > key_indent) {
                let last = current.and_then(|i| doc.sections[i].1.last_mut());
                if let Some((_, value)) = last {
                    let continued = strip_inline_comment(raw_line.trim());
                    if !value.is_empty() {
                        value.push('\n');
                    }
                    value.push_str(continued);
                    continue;
                }
            }

            let line = raw_line.trim();
            if let Some(header) = line.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .ok_or_else(|| error("section header is missing ']'"))?
                    .trim()
                    .to_uppercase();
                open_key = None;
                // 重複的 section 合併
                current = match doc.sections.iter().position(|(s, _)| *s == name) {
                    Some(pos) => Some(pos),
                    None => {
                        doc.sections.push((name, Vec::new()));
                        Some(doc.sections.len() - 1)
                    }
                };
                continue;
            }

            let split = line
                .find(['=', ':'])
                .ok_or_else(|| error("expected 'key = value'"))?;
            let key = line[..split].trim().to_lowercase();
            if key.is_empty() {
                return Err(error("option name is empty"));
            }
            let value = strip_inline_comment(line[split + 1..].trim()).to_string();
            let section = current.ok_or_else(|| error("option found before any section header"))?;
            let entries = &mut doc.sections[section].1;
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(existing) => existing.1 = value,
                None => entries.push((key, value)),
            }
            open_key = Some(indent);
        }
        Ok(doc)
    }

    /// Linter sections only, with the setup.cfg prefix removed.
    pub fn linter_sections(&self, flavor: IniFlavor) -> Vec<(&str, &[(String, String)])> {
        self.sections
            .iter()
            .filter_map(|(name, entries)| match flavor {
                IniFlavor::Pylintrc => Some((name.as_str(), entries.as_slice())),
                IniFlavor::SetupCfg => name
                    .strip_prefix(SETUP_CFG_PREFIX)
                    .map(|stripped| (stripped, entries.as_slice())),
            })
            .collect()
    }

    /// Every linter option, matched by name regardless of section.
    pub fn to_layer(&self, flavor: IniFlavor, source: &str) -> ConfigLayer {
        let mut layer = ConfigLayer::new(OptionOrigin::File, source);
        for (section, entries) in self.linter_sections(flavor) {
            tracing::debug!("Reading [{}] from {}", section, source);
            for (key, value) in entries {
                layer.push(key.clone(), value.clone());
            }
        }
        layer
    }
}

pub fn read_ini_file(path: &Path, flavor: IniFlavor) -> Result<ConfigLayer> {
    let content = std::fs::read_to_string(path)?;
    let source = path.display().to_string();
    Ok(IniDocument::parse(&content, &source)?.to_layer(flavor, &source))
}

/// Whether a setup.cfg has any `[pylint.*]` section. Unreadable or malformed
/// files count as not having one.
pub fn has_pylint_section(path: &Path) -> bool {
    let Ok(content) = std::fs::read_to_string(path) else {
        return false;
    };
    match IniDocument::parse(&content, &path.display().to_string()) {
        Ok(doc) => !doc.linter_sections(IniFlavor::SetupCfg).is_empty(),
        Err(e) => {
            tracing::debug!("Not using {}: {}", path.display(), e);
            false
        }
    }
}
