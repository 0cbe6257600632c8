use super::{CheckContext, Checker};
use crate::core::messages::MessageDefinition;
use crate::python::tokenizer::{StringToken, Token};
use crate::python::ParsedModule;

pub const F_STRING_WITHOUT_INTERPOLATION: &str = "W1309";

static MESSAGES: &[MessageDefinition] = &[MessageDefinition {
    msgid: F_STRING_WITHOUT_INTERPOLATION,
    symbol: "f-string-without-interpolation",
    template: "Using an f-string that does not have any interpolated variables",
    description: "Used when we detect an f-string that does not use any interpolation \
                  variables, in which case it can be either a normal string or a bug in the code.",
    default_enabled: true,
}];

/// Checks string literals.
pub struct StringChecker;

/// Whether an f-string has a replacement field. `{{` is a literal brace, and
/// outside raw strings so is the `{` of a `\N{NAME}` escape.
fn has_replacement_field(s: &StringToken) -> bool {
    let raw = s.is_raw();
    let mut chars = s.body.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if !raw => match chars.peek() {
                Some('\\') => {
                    chars.next();
                }
                Some('N') => {
                    chars.next();
                    if chars.peek() == Some(&'{') {
                        for c in chars.by_ref() {
                            if c == '}' {
                                break;
                            }
                        }
                    }
                }
                _ => {}
            },
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
            }
            '{' => return true,
            _ => {}
        }
    }
    false
}

fn check_literal(parts: &[(&Token, &StringToken)], ctx: &mut CheckContext) {
    let fstrings: Vec<&StringToken> = parts
        .iter()
        .map(|(_, s)| *s)
        .filter(|s| s.is_fstring() && !s.is_bytes())
        .collect();
    if fstrings.is_empty() || fstrings.iter().any(|s| has_replacement_field(s)) {
        return;
    }
    if let Some((first, _)) = parts.first() {
        ctx.add(F_STRING_WITHOUT_INTERPOLATION, Vec::new(), first.line, first.column);
    }
}

impl Checker for StringChecker {
    fn name(&self) -> &'static str {
        "string"
    }

    fn messages(&self) -> &'static [MessageDefinition] {
        MESSAGES
    }

    fn check(&self, module: &ParsedModule, ctx: &mut CheckContext) {
        for line in &module.lines {
            // adjacent literals concatenate into one
            let mut parts: Vec<(&Token, &StringToken)> = Vec::new();
            for token in &line.tokens {
                match token.as_string() {
                    Some(s) => parts.push((token, s)),
                    None => {
                        check_literal(&parts, ctx);
                        parts.clear();
                    }
                }
            }
            check_literal(&parts, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SourceFile;
    use std::path::PathBuf;

    fn lines_flagged(text: &str) -> Vec<(usize, usize)> {
        let module = ParsedModule::parse(SourceFile {
            path: PathBuf::from("t.py"),
            module: "t".to_string(),
            text: text.to_string(),
        })
        .unwrap();
        let mut ctx = CheckContext::new();
        StringChecker.check(&module, &mut ctx);
        ctx.into_emissions().iter().map(|e| (e.line, e.column)).collect()
    }

    #[test]
    fn test_plain_fstrings_without_fields() {
        assert_eq!(lines_flagged("x = f''\n"), vec![(1, 4)]);
        assert_eq!(lines_flagged("x = f\"{{}}\"\n"), vec![(1, 4)]);
        assert_eq!(lines_flagged("x = rf'\\d'\n"), vec![(1, 4)]);
        assert_eq!(lines_flagged("print(F'hello')\n"), vec![(1, 6)]);
    }

    #[test]
    fn test_interpolated_fstrings() {
        assert!(lines_flagged("x = f'{a}'\n").is_empty());
        assert!(lines_flagged("x = f'{a!r:>{width}}'\n").is_empty());
        assert!(lines_flagged("x = f'{{{a}}}'\n").is_empty());
        assert!(lines_flagged("x = '{a}'\n").is_empty());
        assert!(lines_flagged("x = b'{a}'\n").is_empty());
    }

    #[test]
    fn test_named_unicode_escapes() {
        assert_eq!(lines_flagged("x = f'\\N{BULLET} item'\n"), vec![(1, 4)]);
        assert!(lines_flagged("x = f'\\N{DASH}{a}'\n").is_empty());
        assert!(lines_flagged("x = rf'\\N{name}'\n").is_empty());
        assert!(lines_flagged("x = f'\\\\N{name}'\n").is_empty());
    }

    #[test]
    fn test_implicit_concatenation() {
        assert!(lines_flagged("x = (f'a'\n     f'{b}')\n").is_empty());
        assert_eq!(lines_flagged("x = (f'a'\n     '{b}')\n"), vec![(1, 5)]);
        assert_eq!(lines_flagged("x = 'a' f'b'\n"), vec![(1, 4)]);
        assert_eq!(lines_flagged("f(f'a', f'{b}')\n"), vec![(1, 2)]);
    }

    #[test]
    fn test_docstrings_and_triple_quotes() {
        assert_eq!(lines_flagged("def g():\n    f'''\n    text\n    '''\n"), vec![(2, 4)]);
        assert!(lines_flagged("def g():\n    '''{not a field}'''\n").is_empty());
    }
}
