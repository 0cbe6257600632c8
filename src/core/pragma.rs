//! Inline message control: `# pylint: disable=...` style pragmas and `# noqa`.

use crate::core::messages::{
    MessageStore, BAD_OPTION_VALUE, LOCALLY_DISABLED, UNRECOGNIZED_INLINE_OPTION,
};
use crate::domain::model::Emission;
use crate::python::blocks::{block_end, LogicalLine};
use crate::python::tokenizer::{Token, TokenKind};
use regex::Regex;
use std::sync::LazyLock;

static PYLINT_PRAGMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#.*?\bpylint:\s*(?P<body>[^#]*)").unwrap());
static NOQA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)#\s*noqa\b(?::\s*(?P<codes>[\w\-]+(?:\s*,\s*[\w\-]+)*))?").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
struct Scope {
    msgids: Vec<&'static str>,
    start: usize,
    end: usize,
    enabled: bool,
    origin: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reach {
    /// The statement (or whole block) the comment trails, or the rest of the enclosing block
    Positional,
    NextLine,
    /// The statement the comment trails, never the block
    Statement,
}

#[derive(Debug, Default)]
pub struct Pragmas {
    pub skip_file: bool,
    scopes: Vec<Scope>,
    /// E0011/E0012/I0011 raised while reading the pragmas
    pub emissions: Vec<Emission>,
}

fn is_code(token: &Token) -> bool {
    !matches!(
        token.kind,
        TokenKind::Comment | TokenKind::Nl | TokenKind::Newline | TokenKind::EndMarker
    )
}

impl Pragmas {
    pub fn collect(tokens: &[Token], lines: &[LogicalLine], store: &MessageStore) -> Self {
        let mut pragmas = Pragmas::default();
        for comment in tokens.iter().filter(|t| t.kind == TokenKind::Comment) {
            let trailing = tokens.iter().any(|t| {
                is_code(t)
                    && t.line <= comment.line
                    && t.end_line >= comment.line
                    && (t.line < comment.line || t.column < comment.column)
            });

            if let Some(caps) = PYLINT_PRAGMA_RE.captures(&comment.text) {
                for directive in caps["body"].split(';') {
                    pragmas.directive(directive.trim(), comment, trailing, lines, store);
                }
            } else if let Some(caps) = NOQA_RE.captures(&comment.text) {
                let msgids = match caps.name("codes") {
                    Some(codes) => pragmas.resolve_all(codes.as_str(), comment, store),
                    None => store.definitions().map(|m| m.msgid).collect(),
                };
                pragmas.push_scope(msgids, false, Reach::Statement, comment, trailing, lines);
            }
        }
        pragmas
    }

    fn directive(
        &mut self,
        directive: &str,
        comment: &Token,
        trailing: bool,
        lines: &[LogicalLine],
        store: &MessageStore,
    ) {
        if directive.is_empty() {
            return;
        }
        let (keyword, values) = match directive.split_once('=') {
            Some((keyword, values)) => (keyword.trim(), Some(values)),
            None => (directive, None),
        };

        let (enabled, reach) = match (keyword, values) {
            ("skip-file" | "disable-all", None) => {
                self.skip_file = true;
                return;
            }
            ("disable" | "disable-msg", Some(_)) => (false, Reach::Positional),
            ("enable" | "enable-msg", Some(_)) => (true, Reach::Positional),
            ("disable-next", Some(_)) => (false, Reach::NextLine),
            _ => {
                self.emissions.push(Emission::new(
                    UNRECOGNIZED_INLINE_OPTION,
                    vec![format!("'{}'", keyword)],
                    comment.line,
                    comment.column,
                ));
                return;
            }
        };

        let msgids = self.resolve_all(values.unwrap_or_default(), comment, store);
        if !enabled {
            for msgid in &msgids {
                if let Some(def) = store.get(msgid) {
                    self.emissions.push(Emission::new(
                        LOCALLY_DISABLED,
                        vec![def.symbol.to_string(), def.msgid.to_string()],
                        comment.line,
                        comment.column,
                    ));
                }
            }
        }
        self.push_scope(msgids, enabled, reach, comment, trailing, lines);
    }

    fn resolve_all(
        &mut self,
        values: &str,
        comment: &Token,
        store: &MessageStore,
    ) -> Vec<&'static str> {
        let mut msgids = Vec::new();
        for value in values.split(',').map(str::trim).filter(|v| !v.is_empty()) {
            match store.resolve(value) {
                Some(ids) => msgids.extend(ids),
                None => self.emissions.push(Emission::new(
                    BAD_OPTION_VALUE,
                    vec![format!("'{}'", value)],
                    comment.line,
                    comment.column,
                )),
            }
        }
        msgids
    }

    fn push_scope(
        &mut self,
        msgids: Vec<&'static str>,
        enabled: bool,
        reach: Reach,
        comment: &Token,
        trailing: bool,
        lines: &[LogicalLine],
    ) {
        if msgids.is_empty() {
            return;
        }
        let line = comment.line;
        let (start, end) = match reach {
            Reach::NextLine => match lines.iter().find(|l| l.line > line) {
                Some(next) => (next.line, next.end_line),
                None => return,
            },
            _ if trailing => match lines.iter().position(|l| l.contains_line(line)) {
                Some(index) if reach == Reach::Positional => {
                    (lines[index].line, block_end(lines, index))
                }
                Some(index) => (lines[index].line, lines[index].end_line),
                None => (line, line),
            },
            Reach::Statement => (line, line),
            Reach::Positional => {
                let end = lines
                    .iter()
                    .find(|l| l.line > line && l.indent < comment.column)
                    .map_or(usize::MAX, |l| l.line - 1);
                (line, end)
            }
        };
        self.scopes.push(Scope {
            msgids,
            start,
            end,
            enabled,
            origin: line,
        });
    }

    /// The state a pragma imposes on `msgid` at `line`, with the pragma's line;
    /// `None` when no pragma covers it.
    pub fn state_for(&self, msgid: &str, line: usize) -> Option<(bool, usize)> {
        self.scopes
            .iter()
            .filter(|s| s.start <= line && line <= s.end && s.msgids.contains(&msgid))
            .last()
            .map(|s| (s.enabled, s.origin))
    }
}
