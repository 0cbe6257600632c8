//! Rendering a finished run: text, parseable, colorized and JSON output.

use crate::config::options::{LintOptions, OutputFormat};
use crate::domain::model::{Diagnostic, LintReport, MessageCategory};
use crate::domain::ports::Reporter;
use crate::utils::error::Result;
use regex::{Captures, Regex};
use std::sync::LazyLock;

pub const DEFAULT_TEMPLATE: &str = "{path}:{line}:{column}: {msg_id}: {msg} ({symbol})";
pub const PARSEABLE_TEMPLATE: &str = "{path}:{line}: [{msg_id}({symbol}), {obj}] {msg}";

static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(?P<name>\w+)(?::(?P<align>[<>^])?(?P<width>\d+))?\}").unwrap()
});

/// Value of a `msg-template` field, `None` for unknown fields.
fn field(diagnostic: &Diagnostic, name: &str) -> Option<String> {
    let value = match name {
        "path" => diagnostic.path.clone(),
        "abspath" => std::path::absolute(&diagnostic.path)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| diagnostic.path.clone()),
        "module" => diagnostic.module.clone(),
        "obj" => diagnostic.obj.clone(),
        "line" => diagnostic.line.to_string(),
        "column" => diagnostic.column.to_string(),
        "msg_id" => diagnostic.msg_id.clone(),
        "symbol" => diagnostic.symbol.clone(),
        "msg" => diagnostic.message.clone(),
        "category" => diagnostic.category.to_string(),
        "C" => diagnostic.category.letter().to_string(),
        _ => return None,
    };
    Some(value)
}

fn pad(value: String, align: Option<&str>, width: usize) -> String {
    match align {
        Some(">") => format!("{:>width$}", value),
        Some("^") => format!("{:^width$}", value),
        _ => format!("{:<width$}", value),
    }
}

/// Render one diagnostic with a python-style format template. Supports
/// `{field}` and `{field:<N}` / `{field:>N}` / `{field:^N}`.
pub fn render_template(template: &str, diagnostic: &Diagnostic) -> String {
    FIELD_RE
        .replace_all(template, |caps: &Captures| {
            let name = &caps["name"];
            let Some(value) = field(diagnostic, name) else {
                tracing::warn!("Don't recognize the argument '{}' in the msg-template", name);
                return String::new();
            };
            match caps.name("width").and_then(|w| w.as_str().parse().ok()) {
                Some(width) => pad(value, caps.name("align").map(|a| a.as_str()), width),
                None => value,
            }
        })
        .into_owned()
}

fn score_line(report: &LintReport) -> Option<String> {
    report
        .score()
        .map(|score| format!("{}\nYour code has been rated at {:.2}/10\n", "-".repeat(70), score))
}

/// Categories listed by the `reports=y` summary, in display order.
const REPORT_CATEGORIES: &[MessageCategory] = &[
    MessageCategory::Convention,
    MessageCategory::Refactor,
    MessageCategory::Warning,
    MessageCategory::Error,
];

/// Statements analysed and a message count per category.
fn category_report(report: &LintReport) -> String {
    let rule = "+-----------+-------+\n";
    let mut out = format!(
        "Report\n======\n{} statements analysed.\n\nMessages by category\n--------------------\n\n",
        report.statements()
    );
    out.push_str(rule);
    out.push_str("|type       |number |\n");
    out.push_str("+===========+=======+\n");
    for category in REPORT_CATEGORIES {
        let count = report.count(*category).to_string();
        out.push_str(&format!("|{:<11}|{:<7}|\n", category.to_string(), count));
        out.push_str(rule);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Plain,
    #[cfg(feature = "cli")]
    Colorized,
}

/// One `************* Module` header per module with messages, one line per message.
pub struct TextReporter {
    template: String,
    score: bool,
    reports: bool,
    style: TextStyle,
}

impl TextReporter {
    pub fn new(template: impl Into<String>, score: bool, style: TextStyle) -> Self {
        Self {
            template: template.into(),
            score,
            reports: false,
            style,
        }
    }

    /// Append the per-category summary after the messages.
    pub fn with_reports(mut self, reports: bool) -> Self {
        self.reports = reports;
        self
    }

    fn header(&self, name: &str) -> String {
        let header = format!("************* Module {}", name);
        match self.style {
            TextStyle::Plain => header,
            #[cfg(feature = "cli")]
            TextStyle::Colorized => {
                use colored::Colorize;
                header.yellow().reversed().to_string()
            }
        }
    }

    fn line(&self, diagnostic: &Diagnostic) -> String {
        match self.style {
            TextStyle::Plain => render_template(&self.template, diagnostic),
            #[cfg(feature = "cli")]
            TextStyle::Colorized => {
                use colored::Colorize;
                let rendered = render_template(&self.template, diagnostic);
                match diagnostic.category {
                    MessageCategory::Info => rendered.green().to_string(),
                    MessageCategory::Convention => rendered,
                    MessageCategory::Refactor => rendered.magenta().bold().to_string(),
                    MessageCategory::Warning => rendered.magenta().to_string(),
                    MessageCategory::Error | MessageCategory::Fatal => {
                        rendered.red().bold().to_string()
                    }
                }
            }
        }
    }
}

impl Reporter for TextReporter {
    fn render(&self, report: &LintReport) -> Result<String> {
        let mut out = String::new();
        for module in report.modules.iter().filter(|m| !m.diagnostics.is_empty()) {
            out.push_str(&self.header(&module.name));
            out.push('\n');
            for diagnostic in &module.diagnostics {
                out.push_str(&self.line(diagnostic));
                out.push('\n');
            }
        }
        if self.reports {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&category_report(report));
        }
        if self.score {
            if let Some(score) = score_line(report) {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(&score);
            }
        }
        Ok(out)
    }
}

/// A JSON array of every message.
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn render(&self, report: &LintReport) -> Result<String> {
        let diagnostics: Vec<&Diagnostic> = report.diagnostics().collect();
        let mut out = serde_json::to_string_pretty(&diagnostics)?;
        out.push('\n');
        Ok(out)
    }
}

pub fn reporter_for(options: &LintOptions) -> Box<dyn Reporter> {
    let template = |default: &str| {
        options
            .msg_template
            .clone()
            .unwrap_or_else(|| default.to_string())
    };
    let text = |default: &str, style: TextStyle| -> Box<dyn Reporter> {
        Box::new(
            TextReporter::new(template(default), options.score, style)
                .with_reports(options.reports),
        )
    };
    match options.output_format {
        OutputFormat::Json => Box::new(JsonReporter),
        OutputFormat::Parseable => text(PARSEABLE_TEMPLATE, TextStyle::Plain),
        #[cfg(feature = "cli")]
        OutputFormat::Colorized => text(DEFAULT_TEMPLATE, TextStyle::Colorized),
        #[cfg(not(feature = "cli"))]
        OutputFormat::Colorized => text(DEFAULT_TEMPLATE, TextStyle::Plain),
        OutputFormat::Text => text(DEFAULT_TEMPLATE, TextStyle::Plain),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ModuleReport;

    fn diagnostic() -> Diagnostic {
        Diagnostic {
            msg_id: "W1309".to_string(),
            symbol: "f-string-without-interpolation".to_string(),
            category: MessageCategory::Warning,
            message: "Using an f-string that does not have any interpolated variables".to_string(),
            path: "pkg/mod.py".to_string(),
            module: "pkg.mod".to_string(),
            obj: "Foo.bar".to_string(),
            line: 3,
            column: 8,
        }
    }

    fn report(diagnostics: Vec<Diagnostic>, statements: usize) -> LintReport {
        LintReport {
            modules: vec![ModuleReport {
                name: "pkg.mod".to_string(),
                path: "pkg/mod.py".to_string(),
                diagnostics,
                statements,
            }],
        }
    }

    #[test]
    fn test_default_template() {
        assert_eq!(
            render_template(DEFAULT_TEMPLATE, &diagnostic()),
            concat!(
                "pkg/mod.py:3:8: W1309: Using an f-string that does not have any ",
                "interpolated variables (f-string-without-interpolation)"
            )
        );
    }

    #[test]
    fn test_template_fields_and_widths() {
        let d = diagnostic();
        assert_eq!(
            render_template("{C}:{line:>4}: {obj} [{category}]", &d),
            "W:   3: Foo.bar [warning]"
        );
        assert_eq!(render_template("{module}|{nope}|", &d), "pkg.mod||");
        assert_eq!(render_template("{msg_id:<6}|", &d), "W1309 |");
    }

    #[test]
    fn test_text_report_with_score() {
        let out = TextReporter::new(PARSEABLE_TEMPLATE, true, TextStyle::Plain)
            .render(&report(vec![diagnostic()], 10))
            .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "************* Module pkg.mod");
        assert_eq!(
            lines[1],
            concat!(
                "pkg/mod.py:3: [W1309(f-string-without-interpolation), Foo.bar] ",
                "Using an f-string that does not have any interpolated variables"
            )
        );
        assert_eq!(lines.last(), Some(&"Your code has been rated at 9.00/10"));
    }

    #[test]
    fn test_clean_report_without_score() {
        let out = TextReporter::new(DEFAULT_TEMPLATE, false, TextStyle::Plain)
            .render(&report(Vec::new(), 10))
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_json_report() {
        let out = JsonReporter.render(&report(vec![diagnostic()], 10)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["type"], "warning");
        assert_eq!(value[0]["message-id"], "W1309");
        assert_eq!(value[0]["obj"], "Foo.bar");
        assert_eq!(value[0]["line"], 3);
    }

    #[test]
    fn test_reporter_for_uses_msg_template() {
        let options = LintOptions {
            msg_template: Some("{msg_id}".to_string()),
            score: false,
            ..LintOptions::default()
        };
        let out = reporter_for(&options).render(&report(vec![diagnostic()], 1)).unwrap();
        assert_eq!(out, "************* Module pkg.mod\nW1309\n");
    }

    #[test]
    fn test_reports_summary() {
        let options = LintOptions {
            reports: true,
            ..LintOptions::default()
        };
        let out = reporter_for(&options).render(&report(vec![diagnostic()], 10)).unwrap();
        assert!(out.contains("\nReport\n======\n10 statements analysed.\n"));
        assert!(out.contains("|convention |0      |\n"));
        assert!(out.contains("|warning    |1      |\n"));
        assert!(out.find("Report").unwrap() < out.find("Your code has been rated").unwrap());

        let plain = reporter_for(&LintOptions::default())
            .render(&report(vec![diagnostic()], 10))
            .unwrap();
        assert!(!plain.contains("Messages by category"));
    }
}
