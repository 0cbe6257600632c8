//! A small Python tokenizer.
//!
//! Only what the checkers need: names, numbers, strings (with their prefix
//! and raw body), operators, comments and logical/non-logical newlines.
//! Indentation is carried by token columns rather than INDENT/DEDENT tokens.

use crate::utils::error::{LintError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringToken {
    pub prefix: String,
    pub quote: char,
    pub triple: bool,
    /// Text between the quotes, escapes left as written
    pub body: String,
}

impl StringToken {
    pub fn is_fstring(&self) -> bool {
        self.prefix.chars().any(|c| c.eq_ignore_ascii_case(&'f'))
    }

    pub fn is_bytes(&self) -> bool {
        self.prefix.chars().any(|c| c.eq_ignore_ascii_case(&'b'))
    }

    pub fn is_raw(&self) -> bool {
        self.prefix.chars().any(|c| c.eq_ignore_ascii_case(&'r'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Name,
    Number,
    String(StringToken),
    Op,
    Comment,
    /// End of a logical line
    Newline,
    /// Newline that does not end a logical line (blank line, inside brackets, after a comment)
    Nl,
    EndMarker,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based
    pub line: usize,
    /// 0-based character offset
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl Token {
    pub fn is_op(&self, op: &str) -> bool {
        self.kind == TokenKind::Op && self.text == op
    }

    pub fn is_name(&self, name: &str) -> bool {
        self.kind == TokenKind::Name && self.text == name
    }

    pub fn as_string(&self) -> Option<&StringToken> {
        match &self.kind {
            TokenKind::String(s) => Some(s),
            _ => None,
        }
    }
}

const STRING_PREFIXES: &[&str] = &["r", "u", "b", "f", "br", "rb", "fr", "rf"];

const THREE_CHAR_OPS: &[&str] = &["**=", "//=", ">>=", "<<=", "..."];
const TWO_CHAR_OPS: &[&str] = &[
    "**", "//", "==", "!=", "<=", ">=", "->", ":=", "+=", "-=", "*=", "/=", "%=", "&=", "|=",
    "^=", "@=", "<<", ">>", "<>",
];

pub struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    brackets: Vec<(char, usize, usize)>,
    pending_content: bool,
    tokens: Vec<Token>,
}

impl Tokenizer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 0,
            brackets: Vec::new(),
            pending_content: false,
            tokens: Vec::new(),
        }
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 0;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn error(&self, line: usize, column: usize, message: impl Into<String>) -> LintError {
        LintError::TokenizeError {
            line,
            column,
            message: message.into(),
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize, line: usize, column: usize) {
        if !matches!(kind, TokenKind::Comment | TokenKind::Nl | TokenKind::Newline) {
            self.pending_content = true;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        self.tokens.push(Token {
            kind,
            text,
            line,
            column,
            end_line: self.line,
            end_column: self.col,
        });
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        while let Some(c) = self.current() {
            let (start, line, column) = (self.pos, self.line, self.col);
            match c {
                ' ' | '\t' | '\x0c' | '\r' => {
                    self.advance();
                }
                '\n' => {
                    self.advance();
                    if self.brackets.is_empty() && self.pending_content {
                        self.pending_content = false;
                        self.push(TokenKind::Newline, start, line, column);
                    } else {
                        self.push(TokenKind::Nl, start, line, column);
                    }
                }
                '#' => {
                    while let Some(c) = self.current() {
                        if c == '\n' || c == '\r' {
                            break;
                        }
                        self.advance();
                    }
                    self.push(TokenKind::Comment, start, line, column);
                }
                '\\' => {
                    self.advance();
                    if self.current() == Some('\r') {
                        self.advance();
                    }
                    if self.current() != Some('\n') {
                        return Err(self.error(
                            line,
                            column,
                            "unexpected character after line continuation character",
                        ));
                    }
                    self.advance();
                }
                '"' | '\'' => {
                    let token = self.read_string(String::new(), line, column)?;
                    self.push(TokenKind::String(token), start, line, column);
                }
                c if c.is_ascii_digit()
                    || (c == '.' && self.peek(1).is_some_and(|n| n.is_ascii_digit())) =>
                {
                    self.read_number();
                    self.push(TokenKind::Number, start, line, column);
                }
                c if c.is_alphabetic() || c == '_' => {
                    let mut ident = String::new();
                    while let Some(c) = self.current() {
                        if c.is_alphanumeric() || c == '_' {
                            ident.push(c);
                            self.advance();
                        } else {
                            break;
                        }
                    }
                    let is_prefix = STRING_PREFIXES.contains(&ident.to_ascii_lowercase().as_str());
                    if is_prefix && matches!(self.current(), Some('"') | Some('\'')) {
                        let token = self.read_string(ident, line, column)?;
                        self.push(TokenKind::String(token), start, line, column);
                    } else {
                        self.push(TokenKind::Name, start, line, column);
                    }
                }
                '(' | '[' | '{' => {
                    self.advance();
                    self.brackets.push((c, line, column));
                    self.push(TokenKind::Op, start, line, column);
                }
                ')' | ']' | '}' => {
                    let expected = match c {
                        ')' => '(',
                        ']' => '[',
                        _ => '{',
                    };
                    match self.brackets.pop() {
                        Some((open, _, _)) if open == expected => {}
                        Some((open, _, _)) => {
                            return Err(self.error(
                                line,
                                column,
                                format!(
                                    "closing parenthesis '{}' does not match opening parenthesis '{}'",
                                    c, open
                                ),
                            ));
                        }
                        None => {
                            return Err(self.error(line, column, format!("unmatched '{}'", c)));
                        }
                    }
                    self.advance();
                    self.push(TokenKind::Op, start, line, column);
                }
                _ => {
                    self.read_operator();
                    self.push(TokenKind::Op, start, line, column);
                }
            }
        }

        if let Some((open, line, column)) = self.brackets.last().copied() {
            return Err(self.error(line, column, format!("'{}' was never closed", open)));
        }
        let (start, line, column) = (self.pos, self.line, self.col);
        if self.pending_content {
            self.pending_content = false;
            self.push(TokenKind::Newline, start, line, column);
        }
        self.push(TokenKind::EndMarker, start, line, column);
        Ok(self.tokens)
    }

    fn read_string(&mut self, prefix: String, line: usize, column: usize) -> Result<StringToken> {
        let quote = self.current().unwrap_or('"');
        let triple = self.peek(1) == Some(quote) && self.peek(2) == Some(quote);
        let quote_len = if triple { 3 } else { 1 };
        for _ in 0..quote_len {
            self.advance();
        }

        let mut body = String::new();
        loop {
            let c = match self.current() {
                Some(c) => c,
                None => {
                    let what = if triple { "triple-quoted string" } else { "string" };
                    return Err(self.error(line, column, format!("unterminated {} literal", what)));
                }
            };
            if c == '\\' {
                body.push(c);
                self.advance();
                if let Some(escaped) = self.advance() {
                    body.push(escaped);
                }
                continue;
            }
            if c == '\n' && !triple {
                return Err(self.error(line, column, "unterminated string literal"));
            }
            if c == quote {
                if !triple {
                    self.advance();
                    break;
                }
                if self.peek(1) == Some(quote) && self.peek(2) == Some(quote) {
                    for _ in 0..3 {
                        self.advance();
                    }
                    break;
                }
            }
            body.push(c);
            self.advance();
        }

        Ok(StringToken {
            prefix,
            quote,
            triple,
            body,
        })
    }

    fn read_number(&mut self) {
        while let Some(c) = self.current() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                let exponent = matches!(c, 'e' | 'E')
                    && matches!(self.peek(1), Some('+') | Some('-'))
                    && !self.number_is_hex();
                self.advance();
                if exponent {
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn number_is_hex(&self) -> bool {
        let mut start = self.pos;
        while start > 0
            && (self.chars[start - 1].is_ascii_alphanumeric() || self.chars[start - 1] == '_')
        {
            start -= 1;
        }
        matches!(self.chars.get(start + 1), Some('x') | Some('X')) && self.chars[start] == '0'
    }

    fn read_operator(&mut self) {
        let rest: String = self.chars[self.pos..self.chars.len().min(self.pos + 3)]
            .iter()
            .collect();
        let len = if THREE_CHAR_OPS.iter().any(|op| rest.starts_with(op)) {
            3
        } else if TWO_CHAR_OPS.iter().any(|op| rest.starts_with(op)) {
            2
        } else {
            1
        };
        for _ in 0..len {
            self.advance();
        }
    }
}

pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Tokenizer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<String> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| match t.kind {
                TokenKind::Name => format!("NAME {}", t.text),
                TokenKind::Number => format!("NUMBER {}", t.text),
                TokenKind::String(_) => format!("STRING {}", t.text),
                TokenKind::Op => format!("OP {}", t.text),
                TokenKind::Comment => format!("COMMENT {}", t.text),
                TokenKind::Newline => "NEWLINE".to_string(),
                TokenKind::Nl => "NL".to_string(),
                TokenKind::EndMarker => "ENDMARKER".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_simple_statement() {
        assert_eq!(
            kinds("x = f'a{b}'  # note\n"),
            vec![
                "NAME x",
                "OP =",
                "STRING f'a{b}'",
                "COMMENT # note",
                "NEWLINE",
                "ENDMARKER"
            ]
        );
    }

    #[test]
    fn test_string_prefixes() {
        let tokens = tokenize("Rb'x' fR\"y\" u'z' rf'''w'''\n").unwrap();
        let strings: Vec<&StringToken> = tokens.iter().filter_map(Token::as_string).collect();
        assert_eq!(strings.len(), 4);
        assert!(strings[0].is_bytes() && strings[0].is_raw() && !strings[0].is_fstring());
        assert!(strings[1].is_fstring() && strings[1].is_raw());
        assert!(!strings[2].is_fstring());
        assert!(strings[3].triple);
        assert_eq!(strings[3].body, "w");
    }

    #[test]
    fn test_prefix_like_names_are_names() {
        assert_eq!(kinds("f(rb)\n")[0], "NAME f");
        assert_eq!(kinds("f(rb)\n")[2], "NAME rb");
    }

    #[test]
    fn test_escaped_quotes_and_positions() {
        let tokens = tokenize("a = 'it\\'s'\nb = \"\"\"two\nlines\"\"\"\n").unwrap();
        let first = tokens[2].as_string().unwrap();
        assert_eq!(first.body, "it\\'s");
        let second = &tokens[6];
        assert_eq!(second.line, 2);
        assert_eq!(second.column, 4);
        assert_eq!(second.end_line, 3);
        assert_eq!(second.as_string().unwrap().body, "two\nlines");
    }

    #[test]
    fn test_brackets_suppress_newline() {
        let k = kinds("x = (1,\n     2)\n");
        assert_eq!(k.iter().filter(|k| *k == "NEWLINE").count(), 1);
        assert_eq!(k.iter().filter(|k| *k == "NL").count(), 1);
    }

    #[test]
    fn test_line_continuation() {
        let k = kinds("x = 1 + \\\n    2\n");
        assert_eq!(k.iter().filter(|k| *k == "NEWLINE").count(), 1);
    }

    #[test]
    fn test_numbers_and_operators() {
        assert_eq!(
            kinds("a **= 1.5e-3 // 0xE-1\n")[..6],
            ["NAME a", "OP **=", "NUMBER 1.5e-3", "OP //", "NUMBER 0xE", "OP -"]
        );
    }

    #[test]
    fn test_unterminated_string_is_error() {
        match tokenize("x = 'abc\n") {
            Err(LintError::TokenizeError { line, column, .. }) => {
                assert_eq!((line, column), (1, 4));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(tokenize("x = '''abc\n").is_err());
    }

    #[test]
    fn test_unbalanced_brackets_are_errors() {
        assert!(tokenize("x = (1, 2]\n").is_err());
        assert!(tokenize("x = )\n").is_err());
        assert!(tokenize("x = (1,\n").is_err());
    }

    #[test]
    fn test_missing_final_newline() {
        let k = kinds("pass");
        assert_eq!(k, vec!["NAME pass", "NEWLINE", "ENDMARKER"]);
    }
}
