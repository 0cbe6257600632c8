//! Logical lines, the indentation block tree, and the function/class outline
//! extracted from it.

use super::tokenizer::{Token, TokenKind};
use std::collections::HashSet;

const COMPOUND_KEYWORDS: &[&str] = &[
    "def", "class", "if", "elif", "else", "for", "while", "try", "except", "finally", "with",
    "async",
];

/// 一個邏輯行（已移除註解與非邏輯換行）
#[derive(Debug, Clone)]
pub struct LogicalLine {
    pub tokens: Vec<Token>,
    pub indent: usize,
    pub line: usize,
    pub end_line: usize,
}

impl LogicalLine {
    fn from_tokens(tokens: Vec<Token>, indent: usize) -> Option<Self> {
        let first = tokens.first()?;
        let last = tokens.last()?;
        Some(Self {
            line: first.line,
            end_line: last.end_line,
            indent,
            tokens,
        })
    }

    pub fn keyword(&self) -> Option<&str> {
        let first = self.tokens.first()?;
        if first.is_name("async") {
            return self.tokens.get(1).map(|t| t.text.as_str());
        }
        (first.kind == TokenKind::Name).then_some(first.text.as_str())
    }

    pub fn opens_block(&self) -> bool {
        self.tokens.last().is_some_and(|t| t.is_op(":"))
            && self
                .tokens
                .first()
                .is_some_and(|t| {
                    t.kind == TokenKind::Name && COMPOUND_KEYWORDS.contains(&t.text.as_str())
                })
    }

    pub fn contains_line(&self, line: usize) -> bool {
        self.line <= line && line <= self.end_line
    }
}

/// Index of the colon closing a compound statement header, if any.
fn header_colon(tokens: &[Token]) -> Option<usize> {
    let mut depth = 0usize;
    let mut lambdas = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        if token.kind != TokenKind::Op {
            if depth == 0 && token.is_name("lambda") {
                lambdas += 1;
            }
            continue;
        }
        match token.text.as_str() {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => depth = depth.saturating_sub(1),
            ":" if depth == 0 => {
                if lambdas > 0 {
                    lambdas -= 1;
                } else {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn split_statements(tokens: Vec<Token>) -> Vec<Vec<Token>> {
    let mut statements = Vec::new();
    let mut current = Vec::new();
    let mut depth = 0usize;
    for token in tokens {
        if token.kind == TokenKind::Op {
            match token.text.as_str() {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => depth = depth.saturating_sub(1),
                ";" if depth == 0 => {
                    statements.push(std::mem::take(&mut current));
                    continue;
                }
                _ => {}
            }
        }
        current.push(token);
    }
    statements.push(current);
    statements.into_iter().filter(|s| !s.is_empty()).collect()
}

fn push_statement(lines: &mut Vec<LogicalLine>, tokens: Vec<Token>, indent: usize) {
    let is_compound = tokens
        .first()
        .is_some_and(|t| t.kind == TokenKind::Name && COMPOUND_KEYWORDS.contains(&t.text.as_str()));
    if is_compound {
        if let Some(colon) = header_colon(&tokens) {
            if colon + 1 < tokens.len() {
                let mut header = tokens;
                let body = header.split_off(colon + 1);
                if let Some(line) = LogicalLine::from_tokens(header, indent) {
                    lines.push(line);
                }
                for statement in split_statements(body) {
                    push_statement(lines, statement, indent + 1);
                }
                return;
            }
        }
    }
    for statement in split_statements(tokens) {
        if let Some(line) = LogicalLine::from_tokens(statement, indent) {
            lines.push(line);
        }
    }
}

/// 將 token 串切成邏輯行
pub fn logical_lines(tokens: &[Token]) -> Vec<LogicalLine> {
    let mut lines = Vec::new();
    let mut current: Vec<Token> = Vec::new();

    for token in tokens {
        match token.kind {
            TokenKind::Comment | TokenKind::Nl => {}
            TokenKind::Newline | TokenKind::EndMarker => {
                if let Some(indent) = current.first().map(|t| t.column) {
                    push_statement(&mut lines, std::mem::take(&mut current), indent);
                }
            }
            _ => current.push(token.clone()),
        }
    }
    lines
}

/// Last physical line covered by the block opened at `lines[index]`, or the
/// line's own end when it opens no block.
pub fn block_end(lines: &[LogicalLine], index: usize) -> usize {
    let opener = &lines[index];
    if !opener.opens_block() {
        return opener.end_line;
    }
    lines[index + 1..]
        .iter()
        .take_while(|line| line.indent > opener.indent)
        .last()
        .map_or(opener.end_line, |line| line.end_line)
}

#[derive(Debug, Clone)]
pub struct Block {
    pub line: LogicalLine,
    pub children: Vec<Block>,
}

impl Block {
    pub fn end_line(&self) -> usize {
        self.children
            .last()
            .map_or(self.line.end_line, |child| child.end_line().max(self.line.end_line))
    }

    /// The docstring of a def/class/module body: a leading statement made only of
    /// plain (non-f, non-bytes) string literals.
    fn docstring_of(children: &[Block]) -> Option<String> {
        let first = children.first()?;
        let mut doc = String::new();
        for token in &first.line.tokens {
            let s = token.as_string()?;
            if s.is_fstring() || s.is_bytes() {
                return None;
            }
            doc.push_str(&s.body);
        }
        Some(doc)
    }
}

pub fn build_tree(lines: &[LogicalLine]) -> Vec<Block> {
    let mut index = 0;
    build_level(lines, &mut index, None)
}

fn build_level(
    lines: &[LogicalLine],
    index: &mut usize,
    parent_indent: Option<usize>,
) -> Vec<Block> {
    let mut blocks = Vec::new();
    while let Some(line) = lines.get(*index) {
        if parent_indent.is_some_and(|indent| line.indent <= indent) {
            break;
        }
        *index += 1;
        let children = if line.opens_block() {
            build_level(lines, index, Some(line.indent))
        } else {
            Vec::new()
        };
        blocks.push(Block {
            line: line.clone(),
            children,
        });
    }
    blocks
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    pub name: String,
    pub qualname: String,
    /// Positional and keyword-only parameter names, in order
    pub params: Vec<String>,
    pub vararg: Option<String>,
    pub kwarg: Option<String>,
    pub docstring: Option<String>,
    /// Raised exception type names, first occurrence order
    pub raises: Vec<String>,
    pub class_name: Option<String>,
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
}

impl FunctionDef {
    pub fn is_constructor(&self) -> bool {
        self.class_name.is_some() && matches!(self.name.as_str(), "__init__" | "__new__")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    pub name: String,
    pub qualname: String,
    pub docstring: Option<String>,
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ModuleOutline {
    pub docstring: Option<String>,
    pub functions: Vec<FunctionDef>,
    pub classes: Vec<ClassDef>,
}

impl ModuleOutline {
    pub fn from_tree(tree: &[Block]) -> Self {
        let mut outline = ModuleOutline {
            docstring: Block::docstring_of(tree),
            ..Default::default()
        };
        outline.visit(tree, "", None);
        outline
    }

    /// 取得某行所在最內層 def/class 的限定名稱，模組層級回傳空字串
    pub fn scope_at(&self, line: usize) -> String {
        let functions = self
            .functions
            .iter()
            .map(|f| (f.line, f.end_line, f.qualname.as_str()));
        let classes = self
            .classes
            .iter()
            .map(|c| (c.line, c.end_line, c.qualname.as_str()));
        functions
            .chain(classes)
            .filter(|(start, end, _)| *start <= line && line <= *end)
            .max_by_key(|(start, _, _)| *start)
            .map(|(_, _, name)| name.to_string())
            .unwrap_or_default()
    }

    pub fn class(&self, qualname: &str) -> Option<&ClassDef> {
        self.classes.iter().find(|c| c.qualname == qualname)
    }

    fn visit(&mut self, blocks: &[Block], prefix: &str, class_name: Option<&str>) {
        for block in blocks {
            match block.line.keyword() {
                Some("def") => {
                    if let Some(function) = parse_function(block, prefix, class_name) {
                        let nested_prefix = format!("{}.", function.qualname);
                        self.functions.push(function);
                        self.visit(&block.children, &nested_prefix, None);
                    }
                }
                Some("class") => {
                    let Some(name) = block.line.tokens.get(1).filter(|t| t.kind == TokenKind::Name)
                    else {
                        continue;
                    };
                    let qualname = format!("{}{}", prefix, name.text);
                    self.classes.push(ClassDef {
                        name: name.text.clone(),
                        qualname: qualname.clone(),
                        docstring: Block::docstring_of(&block.children),
                        line: block.line.line,
                        column: block.line.indent,
                        end_line: block.end_line(),
                    });
                    self.visit(&block.children, &format!("{}.", qualname), Some(&qualname));
                }
                _ => self.visit(&block.children, prefix, None),
            }
        }
    }
}

fn parse_function(block: &Block, prefix: &str, class_name: Option<&str>) -> Option<FunctionDef> {
    let tokens = &block.line.tokens;
    let def_index = tokens.iter().position(|t| t.is_name("def"))?;
    let name = tokens.get(def_index + 1).filter(|t| t.kind == TokenKind::Name)?;
    let open = def_index + 2;
    if !tokens.get(open)?.is_op("(") {
        return None;
    }

    let mut depth = 0usize;
    let mut chunks: Vec<Vec<&Token>> = vec![Vec::new()];
    for token in &tokens[open + 1..] {
        if token.kind == TokenKind::Op {
            match token.text.as_str() {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" if depth == 0 => break,
                ")" | "]" | "}" => depth -= 1,
                "," if depth == 0 => {
                    chunks.push(Vec::new());
                    continue;
                }
                _ => {}
            }
        }
        if let Some(chunk) = chunks.last_mut() {
            chunk.push(token);
        }
    }

    let mut params = Vec::new();
    let mut vararg = None;
    let mut kwarg = None;
    for chunk in chunks.iter().filter(|c| !c.is_empty()) {
        let first = chunk[0];
        if first.is_op("*") {
            if let Some(arg) = chunk.get(1).filter(|t| t.kind == TokenKind::Name) {
                vararg = Some(arg.text.clone());
            }
        } else if first.is_op("**") {
            if let Some(arg) = chunk.get(1).filter(|t| t.kind == TokenKind::Name) {
                kwarg = Some(arg.text.clone());
            }
        } else if first.kind == TokenKind::Name {
            params.push(first.text.clone());
        }
    }

    let mut collector = RaiseCollector::default();
    collector.visit(&block.children, &Handler::default());

    Some(FunctionDef {
        name: name.text.clone(),
        qualname: format!("{}{}", prefix, name.text),
        params,
        vararg,
        kwarg,
        docstring: Block::docstring_of(&block.children),
        raises: collector.raises,
        class_name: class_name.map(str::to_string),
        line: block.line.line,
        column: block.line.indent,
        end_line: block.end_line(),
    })
}

/// Exception context while walking a function body.
#[derive(Debug, Clone, Default)]
struct Handler {
    /// Types caught by enclosing `try` statements
    caught: HashSet<String>,
    catch_all: bool,
    /// Types handled by the enclosing `except` clause and the name bound by `as`
    handling: Vec<String>,
    bound: Option<String>,
}

impl Handler {
    fn is_caught(&self, exc: &str) -> bool {
        self.catch_all
            || self.caught.contains(exc)
            || self.caught.contains("Exception")
            || self.caught.contains("BaseException")
    }
}

#[derive(Default)]
struct RaiseCollector {
    raises: Vec<String>,
}

impl RaiseCollector {
    fn record(&mut self, exc: String, handler: &Handler) {
        if !handler.is_caught(&exc) && !self.raises.contains(&exc) {
            self.raises.push(exc);
        }
    }

    fn visit(&mut self, blocks: &[Block], handler: &Handler) {
        for (i, block) in blocks.iter().enumerate() {
            match block.line.keyword() {
                Some("def") | Some("class") => {}
                Some("raise") => self.visit_raise(&block.line, handler),
                Some("try") => {
                    let mut inner = handler.clone();
                    inner.handling.clear();
                    inner.bound = None;
                    for clause in blocks[i + 1..]
                        .iter()
                        .take_while(|b| {
                            matches!(b.line.keyword(), Some("except" | "else" | "finally"))
                        })
                    {
                        if clause.line.keyword() == Some("except") {
                            let (types, _) = except_clause(&clause.line);
                            if types.is_empty() {
                                inner.catch_all = true;
                            }
                            inner.caught.extend(types);
                        }
                    }
                    self.visit(&block.children, &inner);
                }
                Some("except") => {
                    let (types, bound) = except_clause(&block.line);
                    let inner = Handler {
                        handling: types,
                        bound,
                        ..handler.clone()
                    };
                    self.visit(&block.children, &inner);
                }
                _ => self.visit(&block.children, handler),
            }
        }
    }

    fn visit_raise(&mut self, line: &LogicalLine, handler: &Handler) {
        let rest = &line.tokens[1..];
        if rest.is_empty() {
            for exc in handler.handling.clone() {
                self.record(exc, handler);
            }
            return;
        }
        let Some(name) = dotted_name(rest) else {
            return;
        };
        if handler.bound.as_deref() == Some(name.as_str()) {
            for exc in handler.handling.clone() {
                self.record(exc, handler);
            }
            return;
        }
        let last = name.rsplit('.').next().unwrap_or(&name).to_string();
        if last.chars().next().is_some_and(char::is_uppercase) {
            self.record(last, handler);
        }
    }
}

fn dotted_name(tokens: &[Token]) -> Option<String> {
    let mut name = String::new();
    let mut expect_name = true;
    for token in tokens {
        if expect_name && token.kind == TokenKind::Name {
            name.push_str(&token.text);
            expect_name = false;
        } else if !expect_name && token.is_op(".") {
            name.push('.');
            expect_name = true;
        } else {
            break;
        }
    }
    (!name.is_empty() && !expect_name).then_some(name)
}

/// Types named by an `except` header (last dotted component) and the `as` name.
fn except_clause(line: &LogicalLine) -> (Vec<String>, Option<String>) {
    let end = match line.tokens.last() {
        Some(last) if last.is_op(":") => line.tokens.len() - 1,
        _ => line.tokens.len(),
    };
    let tokens = line.tokens.get(1..end).unwrap_or_default();
    let (types_part, bound) = match tokens.iter().position(|t| t.is_name("as")) {
        Some(pos) => (&tokens[..pos], tokens.get(pos + 1).map(|t| t.text.clone())),
        None => (tokens, None),
    };
    let mut types = Vec::new();
    let mut current: Option<String> = None;
    for token in types_part {
        match token.kind {
            TokenKind::Name => current = Some(token.text.clone()),
            TokenKind::Op if token.text == "," || token.text == ")" => {
                types.extend(current.take());
            }
            _ => {}
        }
    }
    types.extend(current);
    (types, bound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::python::tokenizer::tokenize;

    fn outline(source: &str) -> ModuleOutline {
        let tokens = tokenize(source).unwrap();
        let lines = logical_lines(&tokens);
        ModuleOutline::from_tree(&build_tree(&lines))
    }

    #[test]
    fn test_logical_lines_split_inline_bodies() {
        let tokens = tokenize("if x: a = 1; b = 2\nc = 3\n").unwrap();
        let lines = logical_lines(&tokens);
        assert_eq!(lines.len(), 4);
        assert!(lines[0].opens_block());
        assert_eq!(lines[1].indent, 1);
        assert_eq!(lines[3].indent, 0);
    }

    #[test]
    fn test_lambda_colon_is_not_header_colon() {
        let tokens = tokenize("if (lambda: 1)(): pass\nwhile lambda x: x: pass\n").unwrap();
        let lines = logical_lines(&tokens);
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_block_end() {
        let source = "def f():\n    a = 1\n\n    b = 2\nc = 3\n";
        let tokens = tokenize(source).unwrap();
        let lines = logical_lines(&tokens);
        assert_eq!(block_end(&lines, 0), 4);
        assert_eq!(block_end(&lines, 3), 5);
    }

    #[test]
    fn test_function_signature() {
        let o = outline(concat!(
            "def f(self, a: int, b=(1, 2), *args, c, d: str = 'x', **kw) -> None:\n",
            "    '''Doc.'''\n",
        ));
        let f = &o.functions[0];
        assert_eq!(f.name, "f");
        assert_eq!(f.params, vec!["self", "a", "b", "c", "d"]);
        assert_eq!(f.vararg.as_deref(), Some("args"));
        assert_eq!(f.kwarg.as_deref(), Some("kw"));
        assert_eq!(f.docstring.as_deref(), Some("Doc."));
    }

    #[test]
    fn test_bare_star_and_slash() {
        let o = outline("def f(a, /, b, *, c):\n    pass\n");
        assert_eq!(o.functions[0].params, vec!["a", "b", "c"]);
        assert_eq!(o.functions[0].vararg, None);
    }

    #[test]
    fn test_methods_and_qualnames() {
        let o = outline(concat!(
            "class Foo:\n    \"\"\"Cls.\"\"\"\n",
            "    def __init__(self, x):\n        def inner():\n            pass\n\n",
            "async def g():\n    pass\n",
        ));
        assert_eq!(o.classes[0].docstring.as_deref(), Some("Cls."));
        let names: Vec<&str> = o.functions.iter().map(|f| f.qualname.as_str()).collect();
        assert_eq!(names, vec!["Foo.__init__", "Foo.__init__.inner", "g"]);
        assert!(o.functions[0].is_constructor());
        assert!(!o.functions[1].is_constructor());
        assert_eq!(o.scope_at(5), "Foo.__init__.inner");
        assert_eq!(o.scope_at(2), "Foo");
        assert_eq!(o.scope_at(8), "g");
    }

    #[test]
    fn test_raises() {
        let o = outline(concat!(
            "def f(x):\n",
            "    if x:\n",
            "        raise ValueError('bad')\n",
            "    raise errors.NotFound\n",
            "    raise self.error()\n",
            "    def nested():\n",
            "        raise KeyError\n",
        ));
        assert_eq!(o.functions[0].raises, vec!["ValueError", "NotFound"]);
        assert_eq!(o.functions[1].raises, vec!["KeyError"]);
    }

    #[test]
    fn test_reraise_and_caught() {
        let o = outline(concat!(
            "def f():\n",
            "    try:\n",
            "        raise KeyError\n",
            "    except (KeyError, IndexError) as err:\n",
            "        raise err\n",
            "    try:\n",
            "        pass\n",
            "    except OSError:\n",
            "        raise\n",
            "    try:\n",
            "        raise RuntimeError\n",
            "    except:\n",
            "        pass\n",
        ));
        assert_eq!(o.functions[0].raises, vec!["KeyError", "IndexError", "OSError"]);
    }

    #[test]
    fn test_except_without_colon() {
        let o = outline("def f():\n    try:\n        pass\n    except\n");
        assert!(o.functions[0].raises.is_empty());

        let o = outline("def f():\n    try:\n        raise KeyError\n    except KeyError\n");
        assert!(o.functions[0].raises.is_empty());
    }

    #[test]
    fn test_fstring_is_not_docstring() {
        let o = outline("def f():\n    f'''doc'''\n");
        assert_eq!(o.functions[0].docstring, None);
    }
}
