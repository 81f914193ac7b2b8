//! Capability token parsing.

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;

/// Characters that separate capability tokens in a list.
pub const TOKEN_DELIMITERS: &[char] = &[' ', '\t', '\n', ','];

/// A single capability token, e.g. `allowgpu` or `noprotecthome`.
///
/// The vocabulary is open: a token nobody looks up is simply inert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(String);

impl Token {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Token {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// De-duplicated set of capability tokens.
///
/// Lookups are existence-based; the order tokens arrived in never matters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet {
    tokens: HashSet<Token>,
}

impl TokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and merge every source list into one set.
    ///
    /// Application defaults and user overrides are merged the same way;
    /// precedence between them is expressed through `no` prefixes, not
    /// through source order.
    pub fn from_sources<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for source in sources {
            set.extend_from(source.as_ref());
        }
        set
    }

    /// Parse a single delimiter-separated list.
    pub fn parse(list: &str) -> Self {
        Self::from_sources([list])
    }

    /// Add every token found in `list`.
    pub fn extend_from(&mut self, list: &str) {
        self.tokens.extend(split_list(list, TOKEN_DELIMITERS).map(Token::new));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tokens.contains(name)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens in sorted order, for stable diagnostics.
    pub fn sorted(&self) -> Vec<&Token> {
        let mut tokens: Vec<_> = self.tokens.iter().collect();
        tokens.sort();
        tokens
    }
}

/// Split a list on any of `delimiters`, dropping empty entries.
///
/// Shared by the token parser and the free-form path/device/socket lists.
pub fn split_list<'a>(list: &'a str, delimiters: &'a [char]) -> impl Iterator<Item = &'a str> {
    list.split(delimiters)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
}
