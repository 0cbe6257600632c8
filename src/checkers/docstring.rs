//! Parameter and raised-exception documentation checks for Sphinx, Google and
//! Numpy style docstrings.
//!
//! * Every parameter of a function, method or constructor must be documented,
//!   with a type. Constructor parameters go in the class docstring or in
//!   `__init__`, never both.
//! * Documented parameters that are not in the signature are reported too,
//!   catching renames that did not reach the documentation.
//! * Every exception raised explicitly and not caught in the same function
//!   must be documented.
//!
//! Enabled with `load-plugins=pylint.extensions.check_docs`.

use super::{CheckContext, Checker};
use crate::core::messages::MessageDefinition;
use crate::domain::model::Emission;
use crate::python::blocks::FunctionDef;
use crate::python::docstring::Docstring;
use crate::python::ParsedModule;
use std::collections::BTreeSet;

pub const MISSING_PARAM_DOC: &str = "W9003";
pub const MISSING_TYPE_DOC: &str = "W9004";
pub const MULTIPLE_CONSTRUCTOR_DOC: &str = "W9005";
pub const MISSING_RAISES_DOC: &str = "W9006";

static MESSAGES: &[MessageDefinition] = &[
    MessageDefinition {
        msgid: MISSING_PARAM_DOC,
        symbol: "missing-param-doc",
        template: "\"{}\" missing or differing in parameter documentation",
        description: "Please add parameter declarations for all parameters.",
        default_enabled: true,
    },
    MessageDefinition {
        msgid: MISSING_TYPE_DOC,
        symbol: "missing-type-doc",
        template: "\"{}\" missing or differing in parameter type documentation",
        description: "Please add parameter type declarations for all parameters.",
        default_enabled: true,
    },
    MessageDefinition {
        msgid: MULTIPLE_CONSTRUCTOR_DOC,
        symbol: "multiple-constructor-doc",
        template: "\"{}\" has constructor parameters documented in class and __init__",
        description: "Please remove parameter declarations in the class or constructor.",
        default_enabled: true,
    },
    MessageDefinition {
        msgid: MISSING_RAISES_DOC,
        symbol: "missing-raises-doc",
        template: "Raising a \"{}\" is not documented",
        description: "Please document that this exception type is raised.",
        default_enabled: true,
    },
];

const NOT_NEEDED_PARAMS: &[&str] = &["self", "cls"];

/// Where a message is reported: the def or class line and its qualified name.
struct Anchor<'a> {
    line: usize,
    column: usize,
    obj: &'a str,
}

impl Anchor<'_> {
    fn emit(&self, ctx: &mut CheckContext, msgid: &'static str, arg: String) {
        ctx.push(Emission::new(msgid, vec![arg], self.line, self.column).with_obj(self.obj));
    }
}

pub struct DocstringChecker {
    accept_no_param_doc: bool,
    accept_no_raise_doc: bool,
}

impl DocstringChecker {
    pub fn new(accept_no_param_doc: bool, accept_no_raise_doc: bool) -> Self {
        Self {
            accept_no_param_doc,
            accept_no_raise_doc,
        }
    }

    fn check_function(
        &self,
        module: &ParsedModule,
        function: &FunctionDef,
        ctx: &mut CheckContext,
    ) {
        let doc = docstringify(function.docstring.as_deref());
        let anchor = Anchor {
            line: function.line,
            column: function.column,
            obj: &function.qualname,
        };

        let mut node_accept_no_param = None;
        let class = function
            .class_name
            .as_deref()
            .filter(|_| function.is_constructor())
            .and_then(|qualname| module.outline.class(qualname));
        if let Some(class) = class {
            let class_doc = docstringify(class.docstring.as_deref());
            let class_anchor = Anchor {
                line: class.line,
                column: class.column,
                obj: &class.qualname,
            };
            if class_doc.has_params() && doc.has_params() {
                class_anchor.emit(ctx, MULTIPLE_CONSTRUCTOR_DOC, class.name.clone());
            }
            // 建構子與類別的 docstring 只要有一方記載參數即可
            node_accept_no_param = class_doc.has_params().then_some(true);
            let class_accept_no_param = doc.has_params().then_some(true);
            self.check_arguments(&class_doc, function, &class_anchor, class_accept_no_param, ctx);
        }
        self.check_arguments(&doc, function, &anchor, node_accept_no_param, ctx);
        self.check_raises(&doc, function, &anchor, ctx);
    }

    fn check_arguments(
        &self,
        doc: &Docstring,
        function: &FunctionDef,
        anchor: &Anchor<'_>,
        accept_no_param_doc: Option<bool>,
        ctx: &mut CheckContext,
    ) {
        if doc.is_empty() {
            return;
        }
        let accept_no_param_doc = accept_no_param_doc.unwrap_or(self.accept_no_param_doc);

        let mut expected: BTreeSet<String> = function.params.iter().cloned().collect();
        let mut not_needed_type: BTreeSet<String> =
            NOT_NEEDED_PARAMS.iter().map(|s| s.to_string()).collect();
        for star in [&function.vararg, &function.kwarg].into_iter().flatten() {
            expected.insert(star.clone());
            not_needed_type.insert(star.clone());
        }
        let not_needed: BTreeSet<String> =
            NOT_NEEDED_PARAMS.iter().map(|s| s.to_string()).collect();

        let (with_doc, with_type) = doc.match_param_docs();
        let tolerate_missing = doc.params_documented_elsewhere()
            || (with_doc.is_empty() && with_type.is_empty() && accept_no_param_doc);

        let compare = |found: &BTreeSet<String>, not_needed: &BTreeSet<String>| -> Vec<String> {
            let differing: BTreeSet<&String> = if tolerate_missing {
                found.difference(&expected).collect()
            } else {
                found.symmetric_difference(&expected).collect()
            };
            differing
                .into_iter()
                .filter(|name| !not_needed.contains(*name))
                .cloned()
                .collect()
        };

        let missing_doc = compare(&with_doc, &not_needed);
        if !missing_doc.is_empty() {
            anchor.emit(ctx, MISSING_PARAM_DOC, missing_doc.join(", "));
        }
        let missing_type = compare(&with_type, &not_needed_type);
        if !missing_type.is_empty() {
            anchor.emit(ctx, MISSING_TYPE_DOC, missing_type.join(", "));
        }
    }

    fn check_raises(
        &self,
        doc: &Docstring,
        function: &FunctionDef,
        anchor: &Anchor<'_>,
        ctx: &mut CheckContext,
    ) {
        if function.raises.is_empty() || doc.is_empty() {
            return;
        }
        let raised: BTreeSet<&String> = function.raises.iter().collect();
        if !doc.is_valid() {
            if self.accept_no_raise_doc {
                return;
            }
            for exc in raised {
                anchor.emit(ctx, MISSING_RAISES_DOC, exc.clone());
            }
            return;
        }
        for exc in raised.into_iter().filter(|exc| !doc.exceptions().contains(*exc)) {
            anchor.emit(ctx, MISSING_RAISES_DOC, exc.clone());
        }
    }
}

fn docstringify(docstring: Option<&str>) -> Docstring {
    docstring.map_or_else(Docstring::empty, Docstring::parse)
}

impl Checker for DocstringChecker {
    fn name(&self) -> &'static str {
        "docstring_checks"
    }

    fn messages(&self) -> &'static [MessageDefinition] {
        MESSAGES
    }

    fn check(&self, module: &ParsedModule, ctx: &mut CheckContext) {
        for function in &module.outline.functions {
            self.check_function(module, function, ctx);
        }
    }
}
