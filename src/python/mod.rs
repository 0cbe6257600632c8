// Just enough of a Python front-end for the checkers: tokens, logical lines,
// the indentation tree and a def/class outline.

pub mod blocks;
pub mod docstring;
pub mod tokenizer;

use crate::domain::model::SourceFile;
use crate::utils::error::Result;
use blocks::{build_tree, logical_lines, Block, LogicalLine, ModuleOutline};
use tokenizer::Token;

#[derive(Debug, Clone)]
pub struct ParsedModule {
    pub source: SourceFile,
    pub tokens: Vec<Token>,
    pub lines: Vec<LogicalLine>,
    pub tree: Vec<Block>,
    pub outline: ModuleOutline,
}

impl ParsedModule {
    pub fn parse(source: SourceFile) -> Result<Self> {
        let tokens = tokenizer::tokenize(&source.text)?;
        let lines = logical_lines(&tokens);
        let tree = build_tree(&lines);
        let outline = ModuleOutline::from_tree(&tree);
        Ok(Self {
            source,
            tokens,
            lines,
            tree,
            outline,
        })
    }

    /// Number of statements, the denominator of the score.
    pub fn statement_count(&self) -> usize {
        self.lines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn source(text: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from("mod.py"),
            module: "mod".to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_parse_counts_statements() {
        let parsed =
            ParsedModule::parse(source("import os\n\n# c\nif os:\n    x = 1; y = 2\n")).unwrap();
        assert_eq!(parsed.statement_count(), 4);
        assert_eq!(parsed.tree.len(), 2);
    }

    #[test]
    fn test_parse_error() {
        assert!(ParsedModule::parse(source("x = (1,\n")).is_err());
    }
}
