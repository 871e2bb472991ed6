//! Tokens, the flat token vector, and the string forms of token groups.
//!
//! Captured parameter groups travel between extraction and binding as one
//! string ([`join_quoted`]) and are split again before conversion
//! ([`split_quoted`]). A token with an embedded space is wrapped in double
//! quotes so that it survives the round trip. A token holding a literal `"`
//! does not: the splitter treats it as the start of a quoted run. That
//! limitation is kept and tested.

use std::fmt;

use argbind_core::ValueSource;

/// Which kind of source produced a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    CommandLine,
    ResponseFile,
    Default,
}

impl From<Provenance> for ValueSource {
    fn from(provenance: Provenance) -> Self {
        match provenance {
            Provenance::CommandLine => ValueSource::CommandLine,
            Provenance::ResponseFile => ValueSource::ResponseFile,
            Provenance::Default => ValueSource::Default,
        }
    }
}

/// One whitespace-delimited unit of input. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    text: String,
    provenance: Provenance,
}

impl Token {
    pub fn new(text: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            text: text.into(),
            provenance,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn is(&self, text: &str) -> bool {
        self.text == text
    }
}

/// Ordered tokens left after draining every source.
///
/// Extraction removes tokens from the vector as options claim them; what
/// remains at the end is unexpected input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenVector {
    tokens: Vec<Token>,
}

impl TokenVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn first(&self) -> Option<&Token> {
        self.tokens.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Removes `count` tokens starting at `start` and returns them in order.
    ///
    /// The range is clamped to the vector.
    pub fn remove_range(&mut self, start: usize, count: usize) -> Vec<Token> {
        let start = start.min(self.tokens.len());
        let end = start.saturating_add(count).min(self.tokens.len());
        self.tokens.drain(start..end).collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.tokens.iter().map(Token::text).collect()
    }

    /// Renders the vector as a shell command line; see [`display_quoted`].
    pub fn display_quoted(&self) -> String {
        display_quoted(self.texts())
    }
}

impl FromIterator<Token> for TokenVector {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TokenVector {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl fmt::Display for TokenVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_quoted())
    }
}

/// Joins tokens with single spaces, wrapping any token that is empty or
/// contains whitespace in double quotes, so that [`split_quoted`] gives the
/// same tokens back.
///
/// # Examples
///
/// ```
/// use argbind_engine::join_quoted;
///
/// assert_eq!(join_quoted(["a", "b c", "d"]), r#"a "b c" d"#);
/// ```
pub fn join_quoted<I, S>(tokens: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for (i, token) in tokens.into_iter().enumerate() {
        let token = token.as_ref();
        if i > 0 {
            joined.push(' ');
        }
        if token.is_empty() || token.contains(char::is_whitespace) {
            joined.push('"');
            joined.push_str(token);
            joined.push('"');
        } else {
            joined.push_str(token);
        }
    }
    joined
}

/// Splits on whitespace, treating a double-quoted run as part of one token.
///
/// Quote characters are removed. An unterminated quote runs to the end of
/// the input.
///
/// # Examples
///
/// ```
/// use argbind_engine::split_quoted;
///
/// assert_eq!(split_quoted(r#"a "b c"  d"#), vec!["a", "b c", "d"]);
/// ```
pub fn split_quoted(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut in_quotes = false;

    for c in text.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                in_word = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}

/// Collapses whitespace runs to one space and trims both ends.
pub(crate) fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_plain_word(word: &str) -> bool {
    !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/'))
}

fn quote_word(word: &str) -> String {
    let mut single = String::from("'");
    let mut double = String::from("\"");
    for c in word.chars() {
        if c == '\'' {
            single.push_str("'\\''");
        } else {
            single.push(c);
        }
        if matches!(c, '"' | '\\' | '`' | '$') {
            double.push('\\');
        }
        double.push(c);
    }
    single.push('\'');
    double.push('"');
    if single.len() < double.len() {
        single
    } else {
        double
    }
}

/// Renders words as a command line a POSIX shell would split back into the
/// same words.
///
/// Words made only of alphanumerics and `_-./` are left bare; anything else
/// is single- or double-quoted, whichever comes out shorter, with double
/// quotes on a tie.
///
/// # Examples
///
/// ```
/// use argbind_engine::display_quoted;
///
/// assert_eq!(display_quoted(["-n", "5", "two words", ""]), r#"-n 5 "two words" """#);
/// assert_eq!(display_quoted(["$HOME"]), "'$HOME'");
/// assert_eq!(display_quoted(["it's"]), r#""it's""#);
/// ```
pub fn display_quoted<I, S>(words: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    words
        .into_iter()
        .map(|word| {
            let word = word.as_ref();
            if is_plain_word(word) {
                word.to_string()
            } else {
                quote_word(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
