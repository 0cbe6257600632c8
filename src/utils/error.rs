use thiserror::Error;

#[derive(Error, Debug)]
pub enum LintError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("{path}:{line}: {message}")]
    ConfigFileError {
        path: String,
        line: usize,
        message: String,
    },

    #[error("option {option}: invalid value: {value:?}, {reason}")]
    InvalidOptionValue {
        option: String,
        value: String,
        reason: String,
    },

    #[error("no such option: {option}")]
    UnknownOption { option: String },

    #[error("Plugin \"{name}\" is impossible to load")]
    PluginError { name: String },

    #[error("{message} ({line}:{column})")]
    TokenizeError {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("No module named {name}")]
    ModuleNotFound { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LintError {
    pub fn config(message: impl Into<String>) -> Self {
        LintError::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            LintError::ConfigError { .. }
            | LintError::ConfigFileError { .. }
            | LintError::InvalidOptionValue { .. }
            | LintError::UnknownOption { .. }
            | LintError::PluginError { .. }
            | LintError::TomlError(_) => ErrorCategory::Configuration,
            LintError::IoError(_)
            | LintError::TokenizeError { .. }
            | LintError::ModuleNotFound { .. } => ErrorCategory::Input,
            LintError::SerializationError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LintError::IoError(e) => format!("Could not read a file: {}", e),
            LintError::TomlError(e) => format!("pyproject.toml is not valid TOML: {}", e),
            LintError::ConfigFileError {
                path,
                line,
                message,
            } => format!("Invalid configuration file {} (line {}): {}", path, line, message),
            LintError::UnknownOption { option } => {
                format!("Unrecognized option found: {}", option)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            LintError::IoError(_) => "Check that the path exists and is readable",
            LintError::TomlError(_) => "Fix the TOML syntax in pyproject.toml",
            LintError::ConfigError { .. } | LintError::ConfigFileError { .. } => {
                "Check the configuration file, or pass --rcfile explicitly"
            }
            LintError::InvalidOptionValue { .. } => {
                "Run with --generate-rcfile to see the accepted values"
            }
            LintError::UnknownOption { .. } => "Remove the option or check its spelling",
            LintError::PluginError { .. } => {
                "Available plugins: pylint.extensions.check_docs, pylint.extensions.docparams"
            }
            LintError::TokenizeError { .. } => "Fix the syntax error in the module",
            LintError::ModuleNotFound { .. } => {
                "Pass an existing file or package, or use --recursive=y for plain directories"
            }
            LintError::SerializationError(_) => "This is a bug, please report it",
        }
    }
}

pub type Result<T> = std::result::Result<T, LintError>;
