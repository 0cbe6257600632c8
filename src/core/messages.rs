//! Message definitions, lookup by id or symbol, and the globally enabled set.

use crate::domain::model::MessageCategory;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageDefinition {
    pub msgid: &'static str,
    pub symbol: &'static str,
    /// `{}` placeholders are filled positionally
    pub template: &'static str,
    pub description: &'static str,
    pub default_enabled: bool,
}

impl MessageDefinition {
    pub fn category(&self) -> MessageCategory {
        self.msgid
            .chars()
            .next()
            .and_then(MessageCategory::from_letter)
            .unwrap_or(MessageCategory::Warning)
    }

    pub fn format(&self, args: &[String]) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut args = args.iter();
        let mut rest = self.template;
        while let Some(pos) = rest.find("{}") {
            out.push_str(&rest[..pos]);
            match args.next() {
                Some(arg) => out.push_str(arg),
                None => out.push_str("{}"),
            }
            rest = &rest[pos + 2..];
        }
        out.push_str(rest);
        out
    }
}

pub const FATAL: &str = "F0001";
pub const SYNTAX_ERROR: &str = "E0001";
pub const UNRECOGNIZED_INLINE_OPTION: &str = "E0011";
pub const BAD_OPTION_VALUE: &str = "E0012";
pub const LOCALLY_DISABLED: &str = "I0011";
pub const SUPPRESSED_MESSAGE: &str = "I0020";

/// Messages emitted by the linter itself rather than by a checker.
pub static MASTER_MESSAGES: &[MessageDefinition] = &[
    MessageDefinition {
        msgid: FATAL,
        symbol: "fatal",
        template: "{}",
        description: "Used when an error occurred preventing the analysis of a module \
                      (unable to find it for instance).",
        default_enabled: true,
    },
    MessageDefinition {
        msgid: SYNTAX_ERROR,
        symbol: "syntax-error",
        template: "{}",
        description: "Used when a syntax error is raised for a module.",
        default_enabled: true,
    },
    MessageDefinition {
        msgid: UNRECOGNIZED_INLINE_OPTION,
        symbol: "unrecognized-inline-option",
        template: "Unrecognized file option {}",
        description: "Used when an unknown inline option is encountered.",
        default_enabled: true,
    },
    MessageDefinition {
        msgid: BAD_OPTION_VALUE,
        symbol: "bad-option-value",
        template: "Bad option value {}",
        description: "Used when a bad value for an inline option is encountered.",
        default_enabled: true,
    },
    MessageDefinition {
        msgid: LOCALLY_DISABLED,
        symbol: "locally-disabled",
        template: "Locally disabling {} ({})",
        description: "Used when an inline option disables a message or a messages category.",
        default_enabled: false,
    },
    MessageDefinition {
        msgid: SUPPRESSED_MESSAGE,
        symbol: "suppressed-message",
        template: "Suppressed {} (from line {})",
        description: "A message was triggered on a line, but suppressed explicitly \
                      by a disable= comment in the file.",
        default_enabled: false,
    },
];

pub const MASTER: &str = "master";

#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    entries: Vec<(&'static str, &'static MessageDefinition)>,
}

impl MessageStore {
    pub fn new() -> Self {
        let mut store = Self::default();
        store.register(MASTER, MASTER_MESSAGES);
        store
    }

    pub fn register(&mut self, checker: &'static str, messages: &'static [MessageDefinition]) {
        for message in messages {
            if self.get(message.msgid).is_none() {
                self.entries.push((checker, message));
            }
        }
    }

    pub fn definitions(&self) -> impl Iterator<Item = &'static MessageDefinition> + '_ {
        self.entries.iter().map(|(_, m)| *m)
    }

    /// 以訊息代碼（不分大小寫）或符號名稱查詢
    pub fn get(&self, key: &str) -> Option<&'static MessageDefinition> {
        self.entries
            .iter()
            .map(|(_, m)| *m)
            .find(|m| m.msgid.eq_ignore_ascii_case(key) || m.symbol == key)
    }

    /// Expand a message selector to message ids: `all`, a category letter,
    /// a checker name, a msgid or a symbol. `None` for unknown selectors.
    pub fn resolve(&self, selector: &str) -> Option<Vec<&'static str>> {
        let selector = selector.trim();
        if selector.eq_ignore_ascii_case("all") {
            return Some(self.definitions().map(|m| m.msgid).collect());
        }
        let mut chars = selector.chars();
        if let (Some(letter), None) = (chars.next(), chars.next()) {
            let category = MessageCategory::from_letter(letter)?;
            return Some(
                self.definitions()
                    .filter(|m| m.category() == category)
                    .map(|m| m.msgid)
                    .collect(),
            );
        }
        let by_checker: Vec<&'static str> = self
            .entries
            .iter()
            .filter(|(checker, _)| checker.eq_ignore_ascii_case(selector))
            .map(|(_, m)| m.msgid)
            .collect();
        if !by_checker.is_empty() {
            return Some(by_checker);
        }
        self.get(selector).map(|m| vec![m.msgid])
    }
}

/// Enable/disable lists contributed by one configuration layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageControl {
    pub disable: Vec<String>,
    pub enable: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MessageState {
    enabled: HashSet<&'static str>,
}

impl MessageState {
    /// 依序套用各層設定；同一層內先 disable 再 enable
    pub fn new(store: &MessageStore, layers: &[MessageControl]) -> Self {
        let mut enabled: HashSet<&'static str> = store
            .definitions()
            .filter(|m| m.default_enabled)
            .map(|m| m.msgid)
            .collect();

        for layer in layers {
            for selector in &layer.disable {
                match store.resolve(selector) {
                    Some(ids) => ids.iter().for_each(|id| {
                        enabled.remove(id);
                    }),
                    None => tracing::warn!("Unknown message in disable option: {}", selector),
                }
            }
            for selector in &layer.enable {
                match store.resolve(selector) {
                    Some(ids) => enabled.extend(ids),
                    None => tracing::warn!("Unknown message in enable option: {}", selector),
                }
            }
        }
        Self { enabled }
    }

    pub fn is_enabled(&self, msgid: &str) -> bool {
        self.enabled.contains(msgid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static TEST_MESSAGES: &[MessageDefinition] = &[
        MessageDefinition {
            msgid: "W1309",
            symbol: "f-string-without-interpolation",
            template: "Using an f-string that does not have any interpolated variables",
            description: "",
            default_enabled: true,
        },
        MessageDefinition {
            msgid: "C0001",
            symbol: "some-convention",
            template: "{} and {}",
            description: "",
            default_enabled: true,
        },
    ];

    fn store() -> MessageStore {
        let mut store = MessageStore::new();
        store.register("string", TEST_MESSAGES);
        store
    }

    fn control(disable: &[&str], enable: &[&str]) -> MessageControl {
        MessageControl {
            disable: disable.iter().map(|s| s.to_string()).collect(),
            enable: enable.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_lookup_by_id_and_symbol() {
        let store = store();
        assert_eq!(store.get("w1309").map(|m| m.symbol), Some("f-string-without-interpolation"));
        assert_eq!(store.get("f-string-without-interpolation").map(|m| m.msgid), Some("W1309"));
        assert!(store.get("no-such-message").is_none());
    }

    #[test]
    fn test_resolve_selectors() {
        let store = store();
        assert_eq!(store.resolve("W").unwrap(), vec!["W1309"]);
        assert_eq!(store.resolve("string").unwrap(), vec!["W1309", "C0001"]);
        assert_eq!(store.resolve("all").unwrap().len(), MASTER_MESSAGES.len() + 2);
        assert!(store.resolve("X").is_none());
        assert!(store.resolve("bogus").is_none());
    }

    #[test]
    fn test_format() {
        assert_eq!(TEST_MESSAGES[1].format(&["a".to_string(), "b".to_string()]), "a and b");
        assert_eq!(TEST_MESSAGES[1].format(&["a".to_string()]), "a and {}");
        assert_eq!(TEST_MESSAGES[1].category(), MessageCategory::Convention);
    }

    #[test]
    fn test_state_defaults() {
        let state = MessageState::new(&store(), &[]);
        assert!(state.is_enabled("W1309"));
        assert!(!state.is_enabled(LOCALLY_DISABLED));
    }

    #[test]
    fn test_disable_all_then_enable_in_same_layer() {
        let state = MessageState::new(
            &store(),
            &[control(&["all"], &["f-string-without-interpolation"])],
        );
        assert!(state.is_enabled("W1309"));
        assert!(!state.is_enabled("C0001"));
        assert!(!state.is_enabled(FATAL));
    }

    #[test]
    fn test_later_layer_wins() {
        let state = MessageState::new(
            &store(),
            &[control(&[], &["W1309"]), control(&["W"], &[])],
        );
        assert!(!state.is_enabled("W1309"));
    }
}
