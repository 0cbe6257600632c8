use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// 訊息類別，決定退出碼的位元與評分權重
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageCategory {
    Info,
    Convention,
    Refactor,
    Warning,
    Error,
    Fatal,
}

impl MessageCategory {
    pub const ALL: [MessageCategory; 6] = [
        MessageCategory::Info,
        MessageCategory::Convention,
        MessageCategory::Refactor,
        MessageCategory::Warning,
        MessageCategory::Error,
        MessageCategory::Fatal,
    ];

    pub fn letter(self) -> char {
        match self {
            MessageCategory::Info => 'I',
            MessageCategory::Convention => 'C',
            MessageCategory::Refactor => 'R',
            MessageCategory::Warning => 'W',
            MessageCategory::Error => 'E',
            MessageCategory::Fatal => 'F',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.letter() == letter.to_ascii_uppercase())
    }

    /// Bit or-ed into the process exit status when a message of this category is emitted.
    pub fn exit_bit(self) -> i32 {
        match self {
            MessageCategory::Fatal => 1,
            MessageCategory::Error => 2,
            MessageCategory::Warning => 4,
            MessageCategory::Refactor => 8,
            MessageCategory::Convention => 16,
            MessageCategory::Info => 0,
        }
    }
}

impl fmt::Display for MessageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageCategory::Info => "info",
            MessageCategory::Convention => "convention",
            MessageCategory::Refactor => "refactor",
            MessageCategory::Warning => "warning",
            MessageCategory::Error => "error",
            MessageCategory::Fatal => "fatal",
        };
        f.write_str(name)
    }
}

/// A module (file) selected for linting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescr {
    pub path: PathBuf,
    pub name: String,
    /// Given directly on the command line rather than found inside a package
    pub is_arg: bool,
    pub basepath: PathBuf,
    pub basename: String,
}

#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub module: String,
    pub text: String,
}

impl SourceFile {
    /// 解碼原始位元組：去除 UTF-8 BOM，非 UTF-8 內容以替代字元解碼
    pub fn decode(path: PathBuf, module: String, bytes: Vec<u8>) -> Self {
        let bytes = match bytes.strip_prefix(b"\xef\xbb\xbf") {
            Some(rest) => rest.to_vec(),
            None => bytes,
        };
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    "⚠️ {} is not valid UTF-8, decoding lossily",
                    path.display()
                );
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        Self { path, module, text }
    }
}

/// A message raised by a checker or by inline-option processing, before
/// message control and formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub msgid: &'static str,
    pub args: Vec<String>,
    pub line: usize,
    pub column: usize,
    /// Overrides the enclosing def/class name derived from the line
    pub obj: Option<String>,
}

impl Emission {
    pub fn new(msgid: &'static str, args: Vec<String>, line: usize, column: usize) -> Self {
        Self {
            msgid,
            args,
            line,
            column,
            obj: None,
        }
    }

    pub fn with_obj(mut self, obj: impl Into<String>) -> Self {
        self.obj = Some(obj.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    #[serde(rename = "message-id")]
    pub msg_id: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub category: MessageCategory,
    pub message: String,
    pub path: String,
    pub module: String,
    pub obj: String,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ModuleReport {
    pub name: String,
    pub path: String,
    pub diagnostics: Vec<Diagnostic>,
    pub statements: usize,
}

#[derive(Debug, Clone, Default)]
pub struct LintReport {
    pub modules: Vec<ModuleReport>,
}

impl LintReport {
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.modules.iter().flat_map(|m| m.diagnostics.iter())
    }

    pub fn statements(&self) -> usize {
        self.modules.iter().map(|m| m.statements).sum()
    }

    pub fn count(&self, category: MessageCategory) -> usize {
        self.diagnostics().filter(|d| d.category == category).count()
    }

    /// `None` when nothing was analysed.
    pub fn score(&self) -> Option<f64> {
        let statements = self.statements();
        if statements == 0 {
            return None;
        }
        if self.count(MessageCategory::Fatal) > 0 {
            return Some(0.0);
        }
        let weighted = 5 * self.count(MessageCategory::Error)
            + self.count(MessageCategory::Warning)
            + self.count(MessageCategory::Refactor)
            + self.count(MessageCategory::Convention);
        let score = 10.0 - (weighted as f64 / statements as f64) * 10.0;
        Some(score.max(0.0))
    }

    pub fn exit_code(&self) -> i32 {
        self.diagnostics()
            .fold(0, |code, d| code | d.category.exit_bit())
    }
}
