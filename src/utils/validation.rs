use crate::utils::error::{LintError, Result};
use regex::Regex;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(option: &str, value: &str, reason: impl Into<String>) -> LintError {
    LintError::InvalidOptionValue {
        option: option.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// 去除一對外層引號
pub fn unquote(value: &str) -> &str {
    let value = value.trim();
    if value.len() >= 2 {
        let bytes = value.as_bytes();
        let (first, last) = (bytes[0], bytes[value.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Comma separated values; newlines separate items too so multi-line ini values work.
pub fn check_csv(value: &str) -> Vec<String> {
    value
        .split(|c| c == ',' || c == '\n')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn check_int(option: &str, value: &str) -> Result<i64> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|e| invalid(option, value, format!("expected an integer ({})", e)))
}

pub fn check_yn(option: &str, value: &str) -> Result<bool> {
    match value.trim() {
        "y" | "yes" => Ok(true),
        "n" | "no" => Ok(false),
        _ => Err(invalid(option, value, "should be in (y, yes, n, no)")),
    }
}

/// 檔案中的 yn 另外接受 1/True 與 0/False
pub fn check_file_yn(option: &str, value: &str) -> Result<bool> {
    match value.trim() {
        "1" | "True" => Ok(true),
        "0" | "False" => Ok(false),
        other => check_yn(option, other),
    }
}

pub fn check_regexp_csv(option: &str, value: &str) -> Result<Vec<Regex>> {
    check_csv(value)
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|e| invalid(option, pattern, e.to_string()))
        })
        .collect()
}

pub fn check_choice(option: &str, value: &str, choices: &[&str]) -> Result<String> {
    let value = unquote(value);
    if choices.contains(&value) {
        Ok(value.to_string())
    } else {
        Err(invalid(
            option,
            value,
            format!("should be in {}", choices.join(", ")),
        ))
    }
}

pub fn check_non_empty_string(option: &str, value: &str) -> Result<String> {
    if value.is_empty() {
        return Err(invalid(option, value, "string can't be empty"));
    }
    Ok(unquote(value).to_string())
}

pub fn validate_positive_number(field_name: &str, value: i64, min_value: i64) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            &value.to_string(),
            format!("value must be at least {}", min_value),
        ));
    }
    Ok(())
}
