//! Parameter and exception documentation in Sphinx, Google and Numpy style docstrings.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static SPHINX_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r":(?:param|parameter|arg|argument|key|keyword)\s+(?:(?P<type>[\w\.\[\]]+)\s+)?\*{0,2}(?P<name>\w+)\s*:",
    )
    .unwrap()
});
static SPHINX_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":type\s+\*{0,2}(?P<name>\w+)\s*:").unwrap());
static SPHINX_RAISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r":(?:raises?|except|exception)\s+(?P<types>[\w\.]+(?:\s*,\s*[\w\.]+)*)\s*:")
        .unwrap()
});
static SPHINX_RETURN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":(?:returns?|rtype)\s*:").unwrap());

static GOOGLE_SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?P<section>Args|Arguments|Parameters|Keyword Args|Keyword Arguments|Raises|Returns|Yields)\s*:\s*$",
    )
    .unwrap()
});
static GOOGLE_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\*{0,2}(?P<name>\w+)\s*(?:\((?P<type>[^)]*)\))?\s*:").unwrap()
});

static NUMPY_SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<section>Parameters|Other Parameters|Raises|Returns|Yields)\s*$").unwrap()
});
static NUMPY_UNDERLINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-{3,}\s*$").unwrap());
static NUMPY_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<names>\*{0,2}\w+(?:\s*,\s*\*{0,2}\w+)*)\s*(?::\s*(?P<type>.*\S))?\s*$")
        .unwrap()
});

static EXCEPTION_ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?P<type>[\w\.]+)\s*(?::.*)?$").unwrap());

static DOCUMENTED_ELSEWHERE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"For\s+the\s+(?:other\s+)?parameters\s*,\s+see").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocstringStyle {
    Sphinx,
    Google,
    Numpy,
    Unknown,
}

#[derive(Debug, Clone, Default)]
struct Extracted {
    params_with_doc: BTreeSet<String>,
    params_with_type: BTreeSet<String>,
    exceptions: BTreeSet<String>,
    has_markers: bool,
}

#[derive(Debug, Clone)]
pub struct Docstring {
    pub text: String,
    pub style: DocstringStyle,
    extracted: Extracted,
}

fn exception_name(raw: &str) -> String {
    raw.rsplit('.').next().unwrap_or(raw).trim().to_string()
}

fn indent_of(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

impl Docstring {
    pub fn parse(text: &str) -> Self {
        let candidates = [
            (DocstringStyle::Sphinx, parse_sphinx(text)),
            (DocstringStyle::Google, parse_google(text)),
            (DocstringStyle::Numpy, parse_numpy(text)),
        ];
        let (style, extracted) = candidates
            .into_iter()
            .find(|(_, e)| e.has_markers)
            .unwrap_or((DocstringStyle::Unknown, Extracted::default()));
        Self {
            text: text.to_string(),
            style,
            extracted,
        }
    }

    pub fn empty() -> Self {
        Self::parse("")
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Whether the docstring uses a recognised documentation style at all.
    pub fn is_valid(&self) -> bool {
        self.style != DocstringStyle::Unknown
    }

    pub fn has_params(&self) -> bool {
        !self.extracted.params_with_doc.is_empty() || !self.extracted.params_with_type.is_empty()
    }

    pub fn params_documented_elsewhere(&self) -> bool {
        DOCUMENTED_ELSEWHERE_RE.is_match(&self.text)
    }

    /// (parameters with a description, parameters with a type)
    pub fn match_param_docs(&self) -> (BTreeSet<String>, BTreeSet<String>) {
        (
            self.extracted.params_with_doc.clone(),
            self.extracted.params_with_type.clone(),
        )
    }

    pub fn exceptions(&self) -> &BTreeSet<String> {
        &self.extracted.exceptions
    }
}

fn parse_sphinx(text: &str) -> Extracted {
    let mut e = Extracted::default();
    for caps in SPHINX_PARAM_RE.captures_iter(text) {
        let name = caps["name"].to_string();
        if caps.name("type").is_some() {
            e.params_with_type.insert(name.clone());
        }
        e.params_with_doc.insert(name);
    }
    for caps in SPHINX_TYPE_RE.captures_iter(text) {
        e.params_with_type.insert(caps["name"].to_string());
    }
    for caps in SPHINX_RAISE_RE.captures_iter(text) {
        for exc in caps["types"].split(',') {
            e.exceptions.insert(exception_name(exc));
        }
    }
    e.has_markers = !e.params_with_doc.is_empty()
        || !e.params_with_type.is_empty()
        || !e.exceptions.is_empty()
        || SPHINX_RETURN_RE.is_match(text);
    e
}

/// Entry lines of an indented section starting after `header`: lines at the
/// first entry's indentation, stopping at the first line indented at or
/// below `min_indent`.
fn section_entries<'a>(lines: &[&'a str], start: usize, min_indent: Option<usize>) -> Vec<&'a str> {
    let mut entries = Vec::new();
    let mut entry_indent = None;
    for line in &lines[start..] {
        if line.trim().is_empty() {
            continue;
        }
        let indent = indent_of(line);
        if min_indent.is_some_and(|min| indent <= min) {
            break;
        }
        match entry_indent {
            None => {
                entry_indent = Some(indent);
                entries.push(*line);
            }
            Some(expected) if indent == expected => entries.push(*line),
            Some(expected) if indent < expected => break,
            Some(_) => {}
        }
    }
    entries
}

fn parse_google(text: &str) -> Extracted {
    let mut e = Extracted::default();
    let lines: Vec<&str> = text.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        let Some(caps) = GOOGLE_SECTION_RE.captures(line) else {
            continue;
        };
        e.has_markers = true;
        let entries = section_entries(&lines, i + 1, Some(indent_of(line)));
        match &caps["section"] {
            "Raises" => {
                for entry in entries {
                    if let Some(caps) = EXCEPTION_ENTRY_RE.captures(entry) {
                        e.exceptions.insert(exception_name(&caps["type"]));
                    }
                }
            }
            "Returns" | "Yields" => {}
            _ => {
                for entry in entries {
                    if let Some(caps) = GOOGLE_PARAM_RE.captures(entry) {
                        let name = caps["name"].to_string();
                        if caps.name("type").is_some_and(|t| !t.as_str().trim().is_empty()) {
                            e.params_with_type.insert(name.clone());
                        }
                        e.params_with_doc.insert(name);
                    }
                }
            }
        }
    }
    e
}

fn parse_numpy(text: &str) -> Extracted {
    let mut e = Extracted::default();
    let lines: Vec<&str> = text.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        let Some(caps) = NUMPY_SECTION_RE.captures(line) else {
            continue;
        };
        if !lines.get(i + 1).is_some_and(|next| NUMPY_UNDERLINE_RE.is_match(next)) {
            continue;
        }
        e.has_markers = true;
        let header_indent = indent_of(line);
        let mut entries = Vec::new();
        for (j, entry) in lines.iter().enumerate().skip(i + 2) {
            if entry.trim().is_empty() {
                continue;
            }
            let indent = indent_of(entry);
            if indent < header_indent {
                break;
            }
            let next_is_underline = lines
                .get(j + 1)
                .is_some_and(|n| NUMPY_UNDERLINE_RE.is_match(n));
            if indent == header_indent && next_is_underline {
                break;
            }
            if indent == header_indent {
                entries.push(*entry);
            }
        }
        match &caps["section"] {
            "Raises" => {
                for entry in entries {
                    if let Some(caps) = EXCEPTION_ENTRY_RE.captures(entry) {
                        e.exceptions.insert(exception_name(&caps["type"]));
                    }
                }
            }
            "Returns" | "Yields" => {}
            _ => {
                for entry in entries {
                    let Some(caps) = NUMPY_PARAM_RE.captures(entry) else {
                        continue;
                    };
                    let typed = caps.name("type").is_some();
                    for name in caps["names"].split(',') {
                        let name = name.trim().trim_start_matches('*').to_string();
                        if typed {
                            e.params_with_type.insert(name.clone());
                        }
                        e.params_with_doc.insert(name);
                    }
                }
            }
        }
    }
    e
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sphinx_params_and_raises() {
        let doc = Docstring::parse(concat!(
            "Do things.\n\n",
            "    :param int x: first\n",
            "    :param y: second\n",
            "    :type y: str\n",
            "    :param **kwargs: rest\n",
            "    :raises ValueError: sometimes\n",
            "    :raises errors.NotFound, KeyError: other times\n",
            "    ",
        ));
        assert_eq!(doc.style, DocstringStyle::Sphinx);
        let (with_doc, with_type) = doc.match_param_docs();
        assert_eq!(with_doc, set(&["kwargs", "x", "y"]));
        assert_eq!(with_type, set(&["x", "y"]));
        assert_eq!(doc.exceptions(), &set(&["KeyError", "NotFound", "ValueError"]));
        assert!(doc.has_params());
    }

    #[test]
    fn test_google_sections() {
        let doc = Docstring::parse(concat!(
            "Summary.\n\n",
            "    Args:\n",
            "        x (int): first\n",
            "            continued\n",
            "        y: second\n\n",
            "    Raises:\n",
            "        NameError: never\n",
            "    ",
        ));
        assert_eq!(doc.style, DocstringStyle::Google);
        let (with_doc, with_type) = doc.match_param_docs();
        assert_eq!(with_doc, set(&["x", "y"]));
        assert_eq!(with_type, set(&["x"]));
        assert_eq!(doc.exceptions(), &set(&["NameError"]));
    }

    #[test]
    fn test_numpy_sections() {
        let doc = Docstring::parse(concat!(
            "Summary.\n\n",
            "    Parameters\n",
            "    ----------\n",
            "    x : int\n",
            "        first\n",
            "    y\n",
            "        second\n\n",
            "    Raises\n",
            "    ------\n",
            "    NameError\n",
            "        Never\n",
            "    ",
        ));
        assert_eq!(doc.style, DocstringStyle::Numpy);
        let (with_doc, with_type) = doc.match_param_docs();
        assert_eq!(with_doc, set(&["x", "y"]));
        assert_eq!(with_type, set(&["x"]));
        assert_eq!(doc.exceptions(), &set(&["NameError"]));
    }

    #[test]
    fn test_unknown_style() {
        let doc = Docstring::parse("This is a docstring.");
        assert!(!doc.is_valid());
        assert!(!doc.has_params());
        assert!(!doc.is_empty());
        assert!(Docstring::empty().is_empty());
    }

    #[test]
    fn test_documented_elsewhere() {
        let doc = Docstring::parse("For the other parameters, see :func:`g`.\n:param x: y\n");
        assert!(doc.params_documented_elsewhere());
        assert!(!Docstring::parse(":param x: y").params_documented_elsewhere());
    }
}
