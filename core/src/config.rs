//! Parse configuration and reserved tokens.

use serde::{Deserialize, Serialize};

/// Prefix naming a response file, as in `@args.txt`.
pub const RESPONSE_FILE_MARKER: char = '@';
/// Everything from this character to the end of a response-file line is ignored.
pub const RESPONSE_FILE_COMMENT: char = '#';
/// Ends the parameters of a variadic option.
pub const VARIADIC_STOP: &str = "--";
/// Opens a comment region; tokens up to the matching close are dropped.
pub const COMMENT_OPEN: &str = "-{";
/// Closes a comment region.
pub const COMMENT_CLOSE: &str = "}-";
/// Halts parsing with a help outcome when help is respected.
pub const HELP_TOKEN: &str = "--help";
/// Separates the short and long forms in a flag declaration, as in `"v,verbose"`.
pub const MULTI_FLAG_SEPARATOR: char = ',';

/// Tokens that can never be used as a flag's dashed form.
pub const RESERVED_TOKENS: [&str; 4] = [VARIADIC_STOP, COMMENT_OPEN, COMMENT_CLOSE, HELP_TOKEN];

/// Feature switches for one parse.
///
/// All features are off by default except the response-file depth limit.
///
/// # Examples
///
/// ```
/// use argbind_core::ParseConfig;
///
/// let config = ParseConfig::default().with_response_files().with_help();
/// assert!(config.response_files);
/// assert!(config.respect_help);
/// assert!(!config.comment_regions);
/// assert_eq!(config.max_response_depth, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Expand `@file` tokens.
    pub response_files: bool,
    /// Stop at [`HELP_TOKEN`] with a help outcome.
    pub respect_help: bool,
    /// Honor [`COMMENT_OPEN`] / [`COMMENT_CLOSE`] regions.
    pub comment_regions: bool,
    /// Most response files that may be open at once.
    pub max_response_depth: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            response_files: false,
            respect_help: false,
            comment_regions: false,
            max_response_depth: 10,
        }
    }
}

impl ParseConfig {
    pub fn with_response_files(mut self) -> Self {
        self.response_files = true;
        self
    }

    pub fn with_help(mut self) -> Self {
        self.respect_help = true;
        self
    }

    pub fn with_comment_regions(mut self) -> Self {
        self.comment_regions = true;
        self
    }

    pub fn with_max_response_depth(mut self, depth: usize) -> Self {
        self.max_response_depth = depth;
        self
    }
}
