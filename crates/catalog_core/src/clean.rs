use std::collections::{BTreeMap, BTreeSet};

/// Known replacements for characters the catalog emits as `\uXXXX` escapes.
pub const REPLACEMENTS: &[(char, &str)] = &[
    ('\u{00a0}', " "),   // no-break space
    ('\u{00a9}', "(c)"), // copyright sign
    ('\u{00ae}', "(r)"), // registered sign
    ('\u{00bf}', "?"),   // inverted question mark
    ('\u{00c1}', "A"),
    ('\u{00cd}', "I"),
    ('\u{00e9}', "e"),
    ('\u{00f1}', "n"),
    ('\u{2013}', "-"),  // en dash
    ('\u{2019}', "'"),  // right single quote
    ('\u{201c}', "\""), // left double quote
    ('\u{201d}', "\""), // right double quote
];

/// Result of one cleaning pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cleaned {
    pub text: String,
    /// Non-ASCII characters with no table entry, passed through unchanged.
    pub unknown: BTreeSet<char>,
}

/// Table-driven substitution of non-ASCII characters with ASCII equivalents.
#[derive(Debug, Clone)]
pub struct UnicodeCleaner {
    table: BTreeMap<char, String>,
}

impl Default for UnicodeCleaner {
    fn default() -> Self {
        Self::with_table(
            REPLACEMENTS
                .iter()
                .map(|(from, to)| (*from, (*to).to_string())),
        )
    }
}

impl UnicodeCleaner {
    pub fn with_table(table: impl IntoIterator<Item = (char, String)>) -> Self {
        Self {
            table: table.into_iter().collect(),
        }
    }

    /// Adds or overrides entries on top of the current table.
    pub fn extend(mut self, extra: impl IntoIterator<Item = (char, String)>) -> Self {
        self.table.extend(extra);
        self
    }

    pub fn clean(&self, text: &str) -> Cleaned {
        let mut out = String::with_capacity(text.len());
        let mut unknown = BTreeSet::new();
        for ch in text.chars() {
            match self.table.get(&ch) {
                Some(replacement) => out.push_str(replacement),
                None => {
                    if !ch.is_ascii() {
                        unknown.insert(ch);
                    }
                    out.push(ch);
                }
            }
        }
        Cleaned { text: out, unknown }
    }

    pub fn knows(&self, ch: char) -> bool {
        self.table.contains_key(&ch)
    }
}

/// Renders a character the way the unknown-character report prints it:
/// `\u00e8 => è`.
pub fn describe_char(ch: char) -> String {
    format!("\\u{:04x} => {}", ch as u32, ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_pads_code_point() {
        assert_eq!(describe_char('\u{e8}'), "\\u00e8 => \u{e8}");
        assert_eq!(describe_char('\u{1f600}'), "\\u1f600 => \u{1f600}");
    }

    #[test]
    fn extension_overrides_defaults() {
        let cleaner = UnicodeCleaner::default().extend([('\u{2013}', "--".to_string())]);
        assert_eq!(cleaner.clean("a\u{2013}b").text, "a--b");
        assert!(cleaner.knows('\u{a0}'));
    }
}
