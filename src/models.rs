//! Domain models that mirror the `word_table` schema. A [`Word`] can only be
//! built through [`Word::new`], so every value that reaches the store already
//! satisfies the non-empty key rule.

use std::fmt;

use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// One row of the table, keyed by its text. Comparison is byte-wise and
/// case-sensitive, matching SQLite's default `BINARY` collation, so
/// `"Hello" < "world"` and `"Zeta" < "alpha"`.
pub struct Word(String);

impl Word {
    /// Validate and wrap a key. Empty text is rejected with
    /// [`StoreError::InvalidRow`]; everything else is kept verbatim.
    pub fn new(text: impl Into<String>) -> Result<Self, StoreError> {
        let text = text.into();
        if text.is_empty() {
            return Err(StoreError::InvalidRow {
                reason: "word must not be empty".to_string(),
            });
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Word {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Word {
    type Error = StoreError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        Word::new(text)
    }
}

/// What happened to a single insert. A duplicate key is a defined no-op, not
/// an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    ConflictIgnored,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_word_is_rejected() {
        let err = Word::new("").unwrap_err();
        assert!(matches!(err, StoreError::InvalidRow { .. }));
    }

    #[test]
    fn words_keep_their_case_and_whitespace() {
        let word = Word::new(" Hello ").unwrap();
        assert_eq!(word.as_str(), " Hello ");
        assert_ne!(Word::new("hello").unwrap(), Word::new("Hello").unwrap());
    }

    #[test]
    fn ordering_puts_uppercase_first() {
        let mut words = vec![
            Word::new("world").unwrap(),
            Word::new("alpha").unwrap(),
            Word::new("Hello").unwrap(),
        ];
        words.sort();
        let texts: Vec<&str> = words.iter().map(Word::as_str).collect();
        assert_eq!(texts, ["Hello", "alpha", "world"]);
    }
}
