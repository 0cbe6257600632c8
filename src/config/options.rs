//! Option definitions and the typed configuration resolved from layered sources.

use crate::core::messages::MessageControl;
use crate::utils::error::{LintError, Result};
use crate::utils::validation::{
    check_choice, check_csv, check_file_yn, check_int, check_non_empty_string, check_regexp_csv,
    check_yn, unquote, validate_positive_number, Validate,
};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Csv,
    RegexpCsv,
    Int,
    Yn,
    Choice(&'static [&'static str]),
    NonEmptyString,
}

#[derive(Debug, Clone, Copy)]
pub struct OptionDef {
    pub name: &'static str,
    pub section: &'static str,
    pub kind: OptionKind,
    /// Raw default, as it would be written in a pylintrc
    pub default: &'static str,
    pub metavar: &'static str,
    pub help: &'static str,
}

pub const OUTPUT_FORMATS: &[&str] = &["text", "parseable", "json", "colorized"];

pub static OPTIONS: &[OptionDef] = &[
    OptionDef {
        name: "ignore",
        section: "MASTER",
        kind: OptionKind::Csv,
        default: "CVS",
        metavar: "<file>[,<file>...]",
        help: "Add files or directories to the blacklist. They should be base names, not paths.",
    },
    OptionDef {
        name: "ignore-patterns",
        section: "MASTER",
        kind: OptionKind::RegexpCsv,
        default: "",
        metavar: "<pattern>[,<pattern>...]",
        help: "Add files or directories matching the regex patterns to the blacklist. The regex \
               matches against base names, not paths.",
    },
    OptionDef {
        name: "load-plugins",
        section: "MASTER",
        kind: OptionKind::Csv,
        default: "",
        metavar: "<modules>",
        help: "List of plugins (as comma separated values of python modules names) to load, \
               usually to register additional checkers.",
    },
    OptionDef {
        name: "jobs",
        section: "MASTER",
        kind: OptionKind::Int,
        default: "1",
        metavar: "<n-processes>",
        help: "Use multiple processes to speed up Pylint. Specifying 0 will auto-detect the \
               number of processors available to use.",
    },
    OptionDef {
        name: "recursive",
        section: "MASTER",
        kind: OptionKind::Yn,
        default: "n",
        metavar: "<yn>",
        help: "Discover python modules and packages in the file system subtree.",
    },
    OptionDef {
        name: "disable",
        section: "MESSAGES CONTROL",
        kind: OptionKind::Csv,
        default: "",
        metavar: "<msg ids>",
        help: "Disable the message, report, category or checker with the given id(s). You can \
               either give multiple identifiers separated by comma (,) or put this option \
               multiple times.",
    },
    OptionDef {
        name: "enable",
        section: "MESSAGES CONTROL",
        kind: OptionKind::Csv,
        default: "",
        metavar: "<msg ids>",
        help: "Enable the message, report, category or checker with the given id(s). You can \
               either give multiple identifier separated by comma (,) or put this option \
               multiple time.",
    },
    OptionDef {
        name: "output-format",
        section: "REPORTS",
        kind: OptionKind::Choice(OUTPUT_FORMATS),
        default: "text",
        metavar: "<format>",
        help: "Set the output format. Available formats are text, parseable, colorized and json.",
    },
    OptionDef {
        name: "msg-template",
        section: "REPORTS",
        kind: OptionKind::NonEmptyString,
        default: "",
        metavar: "<template>",
        help: "Template used to display messages. This is a python new-style format string used \
               to format the message information.",
    },
    OptionDef {
        name: "score",
        section: "REPORTS",
        kind: OptionKind::Yn,
        default: "y",
        metavar: "<y_or_n>",
        help: "Activate the evaluation score.",
    },
    OptionDef {
        name: "reports",
        section: "REPORTS",
        kind: OptionKind::Yn,
        default: "n",
        metavar: "<y_or_n>",
        help: "Tells whether to display a full report or only the messages.",
    },
    OptionDef {
        name: "accept-no-param-doc",
        section: "DOCSTRING_CHECKS",
        kind: OptionKind::Yn,
        default: "y",
        metavar: "<y or n>",
        help: "Whether to accept totally missing parameter documentation in a docstring of a \
               function that has parameters.",
    },
    OptionDef {
        name: "accept-no-raise-doc",
        section: "DOCSTRING_CHECKS",
        kind: OptionKind::Yn,
        default: "y",
        metavar: "<y or n>",
        help: "Whether to accept totally missing raises documentation in a docstring of a \
               function that raises an exception.",
    },
];

pub fn find_option(name: &str) -> Option<&'static OptionDef> {
    OPTIONS.iter().find(|o| o.name == name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Parseable,
    Json,
    Colorized,
}

impl FromStr for OutputFormat {
    type Err = LintError;

    fn from_str(s: &str) -> Result<Self> {
        match check_choice("output-format", s, OUTPUT_FORMATS)?.as_str() {
            "parseable" => Ok(OutputFormat::Parseable),
            "json" => Ok(OutputFormat::Json),
            "colorized" => Ok(OutputFormat::Colorized),
            _ => Ok(OutputFormat::Text),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Text => "text",
            OutputFormat::Parseable => "parseable",
            OutputFormat::Json => "json",
            OutputFormat::Colorized => "colorized",
        };
        f.write_str(name)
    }
}

/// Where a layer's values come from; file values accept `1`/`True`/`0`/`False` for booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionOrigin {
    File,
    CommandLine,
}

/// Ordered `(option, raw value)` pairs contributed by one configuration source.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    pub origin: OptionOrigin,
    /// Shown in warnings, e.g. the config file path
    pub source: String,
    pub values: Vec<(String, String)>,
}

impl ConfigLayer {
    pub fn new(origin: OptionOrigin, source: impl Into<String>) -> Self {
        Self {
            origin,
            source: source.into(),
            values: Vec::new(),
        }
    }

    pub fn push(&mut self, option: impl Into<String>, value: impl Into<String>) {
        self.values.push((option.into(), value.into()));
    }
}

#[derive(Debug, Clone)]
pub struct LintOptions {
    pub ignore: Vec<String>,
    pub ignore_patterns: Vec<Regex>,
    pub load_plugins: Vec<String>,
    /// 0 means one job per available CPU
    pub jobs: i64,
    pub recursive: bool,
    /// One entry per applied layer, in layer order
    pub message_control: Vec<MessageControl>,
    pub output_format: OutputFormat,
    pub msg_template: Option<String>,
    pub score: bool,
    pub reports: bool,
    pub accept_no_param_doc: bool,
    pub accept_no_raise_doc: bool,
    /// Last raw value seen per option, for `generate_rcfile`
    pub raw: BTreeMap<&'static str, String>,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            ignore: vec!["CVS".to_string()],
            ignore_patterns: Vec::new(),
            load_plugins: Vec::new(),
            jobs: 1,
            recursive: false,
            message_control: Vec::new(),
            output_format: OutputFormat::Text,
            msg_template: None,
            score: true,
            reports: false,
            accept_no_param_doc: true,
            accept_no_raise_doc: true,
            raw: BTreeMap::new(),
        }
    }
}

impl LintOptions {
    /// Defaults overridden by each layer in turn.
    pub fn resolve(layers: &[ConfigLayer]) -> Result<Self> {
        let mut options = Self::default();
        for layer in layers {
            options.apply_layer(layer)?;
        }
        options.validate()?;
        Ok(options)
    }

    pub fn apply_layer(&mut self, layer: &ConfigLayer) -> Result<()> {
        self.message_control.push(MessageControl::default());
        for (name, value) in &layer.values {
            match self.apply(name, value, layer.origin) {
                Err(LintError::UnknownOption { option }) if layer.origin == OptionOrigin::File => {
                    tracing::warn!("⚠️ {}: ignoring unknown option {}", layer.source, option);
                }
                other => other?,
            }
        }
        Ok(())
    }

    /// Validate `raw` by the option's kind and store it.
    pub fn apply(&mut self, name: &str, raw: &str, origin: OptionOrigin) -> Result<()> {
        let def = find_option(name).ok_or_else(|| LintError::UnknownOption {
            option: name.to_string(),
        })?;
        let yn = |value: &str| match origin {
            OptionOrigin::File => check_file_yn(name, value),
            OptionOrigin::CommandLine => check_yn(name, value),
        };

        match def.name {
            "ignore" => self.ignore = check_csv(raw),
            "ignore-patterns" => self.ignore_patterns = check_regexp_csv(name, raw)?,
            "load-plugins" => self.load_plugins = check_csv(raw),
            "jobs" => self.jobs = check_int(name, raw)?,
            "recursive" => self.recursive = yn(raw)?,
            "disable" | "enable" => {
                if self.message_control.is_empty() {
                    self.message_control.push(MessageControl::default());
                }
                if let Some(control) = self.message_control.last_mut() {
                    let target = if def.name == "disable" {
                        &mut control.disable
                    } else {
                        &mut control.enable
                    };
                    target.extend(check_csv(raw));
                }
            }
            "output-format" => self.output_format = raw.parse()?,
            "msg-template" => self.msg_template = Some(check_non_empty_string(name, raw)?),
            "score" => self.score = yn(raw)?,
            "reports" => self.reports = yn(raw)?,
            "accept-no-param-doc" => self.accept_no_param_doc = yn(raw)?,
            "accept-no-raise-doc" => self.accept_no_raise_doc = yn(raw)?,
            _ => {
                return Err(LintError::UnknownOption {
                    option: name.to_string(),
                })
            }
        }

        let shown = match def.name {
            "disable" | "enable" => {
                let mut all = self.raw.get(def.name).map(|v| check_csv(v)).unwrap_or_default();
                all.extend(check_csv(raw));
                all.join(",")
            }
            _ => unquote(raw).to_string(),
        };
        self.raw.insert(def.name, shown);
        Ok(())
    }

    /// Number of concurrent lint tasks.
    pub fn effective_jobs(&self) -> usize {
        if self.jobs == 0 {
            std::thread::available_parallelism().map_or(1, |n| n.get())
        } else {
            self.jobs.max(1) as usize
        }
    }

    fn raw_value(&self, def: &OptionDef) -> String {
        self.raw
            .get(def.name)
            .cloned()
            .unwrap_or_else(|| def.default.to_string())
    }
}

impl Validate for LintOptions {
    fn validate(&self) -> Result<()> {
        validate_positive_number("jobs", self.jobs, 0)
    }
}

fn wrap_comment(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::from("#");
    for word in text.split_whitespace() {
        if current.len() > 1 && current.len() + word.len() + 1 > width {
            lines.push(std::mem::replace(&mut current, String::from("#")));
        }
        current.push(' ');
        current.push_str(word);
    }
    if current.len() > 1 {
        lines.push(current);
    }
    lines
}

/// A pylintrc holding every option and its current value, grouped by section.
pub fn generate_rcfile(options: &LintOptions) -> String {
    let mut sections: Vec<&str> = Vec::new();
    for def in OPTIONS {
        if !sections.contains(&def.section) {
            sections.push(def.section);
        }
    }

    let mut out = String::new();
    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        out.push_str(&format!("[{}]\n", section.to_uppercase()));
        let mut defs: Vec<&OptionDef> = OPTIONS.iter().filter(|d| d.section == *section).collect();
        defs.sort_by_key(|d| d.name);
        for def in defs {
            out.push('\n');
            for line in wrap_comment(def.help, 79) {
                out.push_str(&line);
                out.push('\n');
            }
            let value = options.raw_value(def);
            // 未設定的字串選項以註解輸出，讀回時保留預設值
            if value.is_empty() && matches!(def.kind, OptionKind::NonEmptyString) {
                out.push('#');
            }
            out.push_str(&format!("{}={}\n", def.name, value));
        }
    }
    out
}
