//! The token source stack.
//!
//! Draining always reads from the top source. A `@file` token (when response
//! files are enabled) opens that file right away and pushes it, so nested
//! inclusion grows the stack instead of the call stack. Each source tracks
//! its own comment-region depth, which must be back at zero by the time the
//! source runs dry.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use argbind_core::{
    COMMENT_CLOSE, COMMENT_OPEN, HELP_TOKEN, ParseConfig, RESPONSE_FILE_COMMENT, RESPONSE_FILE_MARKER,
};
use tracing::{debug, trace};

use crate::error::SourceError;
use crate::tokens::{Provenance, Token, TokenVector};

/// How draining ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drained {
    /// Every source ran dry.
    Tokens(TokenVector),
    /// The help token was seen; nothing after it was read.
    Help,
}

enum Feed {
    CommandLine {
        args: VecDeque<String>,
    },
    ResponseFile {
        path: PathBuf,
        reader: BufReader<File>,
        pending: VecDeque<String>,
    },
}

struct Source {
    feed: Feed,
    comment_depth: usize,
}

impl Source {
    fn command_line<S: AsRef<str>>(args: &[S]) -> Self {
        Self {
            feed: Feed::CommandLine {
                args: args.iter().map(|a| a.as_ref().to_string()).collect(),
            },
            comment_depth: 0,
        }
    }

    fn response_file(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(|source| SourceError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            feed: Feed::ResponseFile {
                path: path.to_path_buf(),
                reader: BufReader::new(file),
                pending: VecDeque::new(),
            },
            comment_depth: 0,
        })
    }

    fn provenance(&self) -> Provenance {
        match self.feed {
            Feed::CommandLine { .. } => Provenance::CommandLine,
            Feed::ResponseFile { .. } => Provenance::ResponseFile,
        }
    }

    fn origin(&self) -> String {
        match &self.feed {
            Feed::CommandLine { .. } => "command line".to_string(),
            Feed::ResponseFile { path, .. } => format!("response file \"{}\"", path.display()),
        }
    }

    /// Next raw token, reading further lines of a response file as needed.
    fn next_token(&mut self) -> Result<Option<String>, SourceError> {
        match &mut self.feed {
            Feed::CommandLine { args } => Ok(args.pop_front()),
            Feed::ResponseFile {
                path,
                reader,
                pending,
            } => loop {
                if let Some(token) = pending.pop_front() {
                    return Ok(Some(token));
                }
                let mut line = String::new();
                let read = reader.read_line(&mut line).map_err(|source| SourceError::Read {
                    path: path.clone(),
                    source,
                })?;
                if read == 0 {
                    return Ok(None);
                }
                let content = match line.find(RESPONSE_FILE_COMMENT) {
                    Some(hash) => &line[..hash],
                    None => line.as_str(),
                };
                pending.extend(content.split_whitespace().map(str::to_string));
            },
        }
    }
}

enum Step {
    Emit(Token),
    Include(PathBuf),
    Skip,
    Exhausted,
    Help,
}

/// LIFO stack of token sources for one parse call.
pub struct SourceStack<'a> {
    sources: Vec<Source>,
    config: &'a ParseConfig,
}

impl<'a> SourceStack<'a> {
    pub fn new<S: AsRef<str>>(args: &[S], config: &'a ParseConfig) -> Self {
        Self {
            sources: vec![Source::command_line(args)],
            config,
        }
    }

    /// Number of sources currently open, the command line included.
    pub fn depth(&self) -> usize {
        self.sources.len()
    }

    /// Reads every source to the end, or up to the help token.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] for an unreadable or too deeply nested response
    /// file and for unbalanced comment regions.
    pub fn drain(mut self) -> Result<Drained, SourceError> {
        let mut tokens = TokenVector::new();
        loop {
            match self.step()? {
                Step::Emit(token) => {
                    trace!(token = token.text(), provenance = ?token.provenance(), "token");
                    tokens.push(token);
                }
                Step::Include(path) => self.include(&path)?,
                Step::Skip => {}
                Step::Exhausted => break,
                Step::Help => {
                    debug!(depth = self.depth(), "help token seen; stopped draining");
                    return Ok(Drained::Help);
                }
            }
        }
        debug!(count = tokens.len(), tokens = %tokens.display_quoted(), "drained token sources");
        Ok(Drained::Tokens(tokens))
    }

    fn step(&mut self) -> Result<Step, SourceError> {
        let config = self.config;
        let Some(top) = self.sources.last_mut() else {
            return Ok(Step::Exhausted);
        };

        let Some(text) = top.next_token()? else {
            if top.comment_depth > 0 {
                return Err(SourceError::UnbalancedStart {
                    origin: top.origin(),
                    depth: top.comment_depth,
                });
            }
            self.sources.pop();
            return Ok(Step::Skip);
        };

        if config.comment_regions {
            if text == COMMENT_OPEN {
                top.comment_depth += 1;
                return Ok(Step::Skip);
            }
            if text == COMMENT_CLOSE {
                if top.comment_depth == 0 {
                    return Err(SourceError::UnbalancedEnd { origin: top.origin() });
                }
                top.comment_depth -= 1;
                return Ok(Step::Skip);
            }
            if top.comment_depth > 0 {
                return Ok(Step::Skip);
            }
        }

        if config.response_files {
            if let Some(path) = text.strip_prefix(RESPONSE_FILE_MARKER).filter(|p| !p.is_empty()) {
                return Ok(Step::Include(PathBuf::from(path)));
            }
        }

        if config.respect_help && text == HELP_TOKEN {
            return Ok(Step::Help);
        }

        Ok(Step::Emit(Token::new(text, top.provenance())))
    }

    fn include(&mut self, path: &Path) -> Result<(), SourceError> {
        let open_files = self.sources.len() - 1;
        if open_files >= self.config.max_response_depth {
            return Err(SourceError::TooDeep {
                path: path.to_path_buf(),
                max: self.config.max_response_depth,
            });
        }
        let source = Source::response_file(path)?;
        debug!(path = %path.display(), depth = open_files + 1, "opened response file");
        self.sources.push(source);
        Ok(())
    }
}

/// Drains a fresh source stack over `args`.
///
/// # Errors
///
/// See [`SourceStack::drain`].
///
/// # Examples
///
/// ```
/// use argbind_core::ParseConfig;
/// use argbind_engine::{Drained, drain};
///
/// let config = ParseConfig::default().with_comment_regions();
/// let Drained::Tokens(tokens) = drain(&["-a", "-{", "ignored", "}-", "-b"], &config).unwrap() else {
///     panic!("no help token given");
/// };
/// assert_eq!(tokens.texts(), vec!["-a", "-b"]);
/// ```
pub fn drain<S: AsRef<str>>(args: &[S], config: &ParseConfig) -> Result<Drained, SourceError> {
    SourceStack::new(args, config).drain()
}
