//! The statement parser: alias and shortcut expansion, punctuation
//! splitting, terminator location, and pipe/redirection extraction.

use std::collections::HashSet;

use crate::config::{ParserConfig, Shortcut};

use super::comment::strip_comments;
use super::statement::Statement;
use super::tokenize::{
    LINE_FEED, ParseError, REDIRECTION_APPEND, REDIRECTION_CHARS, REDIRECTION_OUTPUT,
    REDIRECTION_PIPE, is_quote_char, is_redirect_char, split_words, strip_quotes,
};

/// Word-break table derived from parser configuration: the characters and
/// terminator strings that end a command word. Rebuilt whenever the
/// terminator set changes.
#[derive(Debug, Clone)]
struct WordBreaks {
    terminators: Vec<String>,
}

impl WordBreaks {
    fn from_config(config: &ParserConfig) -> Self {
        Self {
            terminators: config.terminators.clone(),
        }
    }

    /// Byte length of the word break starting at `pos`, if any: a quote or
    /// redirection character, a configured terminator (checked in order),
    /// or a whitespace character.
    fn break_len(&self, line: &str, pos: usize) -> Option<usize> {
        let rest = &line[pos..];
        let c = rest.chars().next()?;
        if is_quote_char(c) || is_redirect_char(c) {
            return Some(c.len_utf8());
        }
        for terminator in &self.terminators {
            if !terminator.is_empty() && rest.starts_with(terminator.as_str()) {
                return Some(terminator.len());
            }
        }
        if c.is_whitespace() {
            return Some(c.len_utf8());
        }
        None
    }
}

/// A leading command word located by the scanner: the word itself, the
/// separator that ended it, and the byte offset of whatever follows the
/// separator.
struct LeadingWord<'a> {
    word: &'a str,
    sep: &'a str,
    rest: usize,
}

/// Parses raw input lines into [`Statement`] values.
///
/// Holds the configuration snapshot every parse reads: terminators,
/// multiline commands, aliases, and shortcuts. All parse entry points take
/// `&self`; [`set_config`](Self::set_config) replaces the configuration
/// between parses and rebuilds the derived tables.
pub struct StatementParser {
    config: ParserConfig,
    breaks: WordBreaks,
    punctuation: Vec<char>,
}

impl Default for StatementParser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl StatementParser {
    /// Build a parser for the given configuration.
    pub fn new(config: ParserConfig) -> Self {
        let breaks = WordBreaks::from_config(&config);
        let punctuation = build_punctuation(&config);
        Self {
            config,
            breaks,
            punctuation,
        }
    }

    /// Replace the parser configuration atomically. The word-break table
    /// and the punctuation set are rebuilt for the new terminator set.
    pub fn set_config(&mut self, config: ParserConfig) {
        self.breaks = WordBreaks::from_config(&config);
        self.punctuation = build_punctuation(&config);
        self.config = config;
    }

    /// The current configuration snapshot.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Lex a line into tokens: comments stripped, aliases and shortcuts
    /// expanded, then split on whitespace and punctuation.
    ///
    /// Returns [`ParseError::UnterminatedQuote`] if a quote mark is opened
    /// but never closed.
    pub fn tokenize(&self, line: &str) -> Result<Vec<String>, ParseError> {
        let line = strip_comments(line);
        let line = self.expand(&line);
        let words = split_words(&line)?;
        Ok(self.split_on_punctuation(words))
    }

    /// Parse a line into a [`Statement`]: strip comments, expand aliases
    /// and shortcuts, locate the terminator, split command from args, and
    /// extract pipe and output redirection clauses.
    ///
    /// Returns [`ParseError::UnterminatedQuote`] if a quote mark is opened
    /// but never closed; no other condition fails.
    pub fn parse(&self, line: &str) -> Result<Statement, ParseError> {
        // A trailing line feed acts as an implicit terminator. Checked
        // before tokenizing, which discards unquoted whitespace.
        let line_feed_terminated = line.ends_with(LINE_FEED);

        let tokens = self.tokenize(line)?;

        let mut command = String::new();
        let mut args = String::new();
        let mut arg_list: Vec<String> = Vec::new();
        let mut terminator = String::new();
        let mut rest: Vec<String>;

        if line_feed_terminated {
            // the implicit terminator takes precedence over token
            // terminators and closes the whole token list
            terminator = LINE_FEED.to_string();
            (command, args) = command_and_args(&tokens);
            arg_list = tokens.get(1..).unwrap_or_default().to_vec();
            rest = Vec::new();
        } else if let Some((pos, found)) = find_terminator(&tokens, &self.config.terminators) {
            terminator = found;
            (command, args) = command_and_args(&tokens[..pos]);
            arg_list = tokens.get(1..pos).unwrap_or_default().to_vec();
            rest = tokens.get(pos + 1..).unwrap_or_default().to_vec();
            // only text up to the next terminator belongs to this statement
            if let Some((next, _)) = find_terminator(&rest, &self.config.terminators) {
                rest.truncate(next);
            }
        } else {
            let (testcommand, testargs) = command_and_args(&tokens);
            if self.config.multiline_commands.contains(&testcommand) {
                // No terminator but a multiline command: the whole line is
                // args. Redirection is only recognized after a terminator,
                // so its arguments may contain redirection-looking text.
                command = testcommand;
                args = testargs;
                arg_list = tokens.get(1..).unwrap_or_default().to_vec();
                rest = Vec::new();
            } else {
                rest = tokens;
            }
        }

        // A pipe clause takes every remaining token after the operator,
        // even redirection-looking ones: `say hi | wc > count.txt` pipes
        // to `wc > count.txt` instead of redirecting.
        let mut pipe_to: Vec<String> = Vec::new();
        if let Some(pos) = rest.iter().position(|t| t.as_str() == REDIRECTION_PIPE) {
            pipe_to = rest[pos + 1..]
                .iter()
                .map(|t| expand_user(strip_quotes(t)))
                .collect();
            rest.truncate(pos);
        }

        // First redirection operator by position wins, `>` or `>>` alike.
        let mut output = String::new();
        let mut output_to = String::new();
        if let Some(pos) = rest
            .iter()
            .position(|t| t.as_str() == REDIRECTION_OUTPUT || t.as_str() == REDIRECTION_APPEND)
        {
            output = rest[pos].clone();
            if let Some(target) = rest.get(pos + 1) {
                output_to = expand_user(strip_quotes(target));
            }
            rest.truncate(pos);
        }

        let mut suffix = String::new();
        if !terminator.is_empty() {
            // whatever is left is the suffix
            suffix = rest.join(" ");
        } else if command.is_empty() {
            // no terminator and no multiline command committed: the
            // leftover tokens are the command and the args
            (command, args) = command_and_args(&rest);
            arg_list = rest.get(1..).unwrap_or_default().to_vec();
        }

        let multiline_command = self.multiline_for(&command);

        log::debug!("parsed command {command:?} terminator {terminator:?}");

        Ok(Statement {
            raw: line.to_string(),
            command,
            args,
            arg_list,
            multiline_command,
            terminator,
            suffix,
            pipe_to,
            output,
            output_to,
        })
    }

    /// Partially parse input for completion code: aliases and shortcuts
    /// are expanded and the command word is located, but quoting
    /// correctness is not enforced, so this never fails.
    ///
    /// Args is the remainder of the line after the command and the
    /// separator that followed it, right-trimmed only; internal whitespace
    /// is preserved verbatim. Every other field keeps its default value.
    pub fn parse_command_only(&self, raw: &str) -> Statement {
        let line = self.expand(raw);

        let lw = self.leading_word(&line);
        let command = lw.word.to_string();
        let mut args = line[lw.rest..].trim_end().to_string();
        // empty input, or something like a bare `>`, has no command; args
        // must be empty too
        if command.is_empty() {
            args = String::new();
        }

        let multiline_command = self.multiline_for(&command);

        Statement {
            raw: raw.to_string(),
            command,
            args,
            multiline_command,
            ..Statement::default()
        }
    }

    /// Check whether `word` can be used as a command or alias name: no
    /// whitespace, quote, redirection, or terminator characters.
    ///
    /// On failure returns a human-readable list of the forbidden character
    /// classes, suitable for a user-facing diagnostic.
    pub fn is_valid_command(&self, word: &str) -> Result<(), String> {
        if !word.is_empty() && self.leading_word(word).word == word {
            return Ok(());
        }

        let mut forbidden = vec!["whitespace".to_string(), "quotes".to_string()];
        for c in REDIRECTION_CHARS {
            forbidden.push(quote_for_display(&c.to_string()));
        }
        for terminator in &self.config.terminators {
            forbidden.push(quote_for_display(terminator));
        }
        Err(forbidden.join(", "))
    }

    /// Expand aliases and shortcuts in the leading text of `line`.
    ///
    /// Aliases rewrite the command word repeatedly, but each alias name is
    /// applied at most once per pass, so a cycle between two aliases
    /// expands each once and stops. Shortcuts are checked afterwards in
    /// configured order and the first matching prefix is applied once.
    fn expand(&self, line: &str) -> String {
        let mut line = line.to_string();

        let mut consumed: HashSet<String> = HashSet::new();
        while consumed.len() < self.config.aliases.len() {
            let lw = self.leading_word(&line);
            if lw.word.is_empty() || consumed.contains(lw.word) {
                break;
            }
            let Some(expansion) = self.config.aliases.get(lw.word) else {
                break;
            };
            log::trace!("alias {:?} -> {expansion:?}", lw.word);
            let rebuilt = format!("{expansion}{}{}", lw.sep, &line[lw.rest..]);
            consumed.insert(lw.word.to_string());
            line = rebuilt;
        }

        for Shortcut { prefix, expansion } in &self.config.shortcuts {
            if let Some(rest) = line.strip_prefix(prefix.as_str()) {
                let mut expanded = expansion.clone();
                if !rest.starts_with(' ') {
                    expanded.push(' ');
                }
                line = format!("{expanded}{rest}");
                break;
            }
        }

        line
    }

    /// Locate the leading command word: skip leading whitespace, then take
    /// characters up to the first word break. Always succeeds; the word
    /// and separator are empty at end of input.
    fn leading_word<'a>(&self, line: &'a str) -> LeadingWord<'a> {
        let start = line.len() - line.trim_start().len();
        let mut end = start;
        let mut sep_len = 0;
        while end < line.len() {
            if let Some(len) = self.breaks.break_len(line, end) {
                sep_len = len;
                break;
            }
            end += line[end..].chars().next().map_or(1, char::len_utf8);
        }
        LeadingWord {
            word: &line[start..end],
            sep: &line[end..end + sep_len],
            rest: end + sep_len,
        }
    }

    /// Split unquoted multi-character tokens at punctuation boundaries.
    ///
    /// A run of the same punctuation character stays one token (`>>`);
    /// adjacent different punctuation characters split (`;>` into `;` and
    /// `>`). Tokens of one character, and tokens beginning with a quote
    /// character, pass through unsplit.
    fn split_on_punctuation(&self, tokens: Vec<String>) -> Vec<String> {
        let mut split = Vec::with_capacity(tokens.len());

        for token in tokens {
            if token.chars().count() <= 1 || token.starts_with(is_quote_char) {
                split.push(token);
                continue;
            }

            let mut current = String::new();
            let mut run_punctuation: Option<char> = None;
            for c in token.chars() {
                let is_punctuation = self.punctuation.contains(&c);
                let boundary = !current.is_empty()
                    && match run_punctuation {
                        Some(p) => c != p,
                        None => is_punctuation,
                    };
                if boundary {
                    split.push(std::mem::take(&mut current));
                }
                if current.is_empty() {
                    run_punctuation = is_punctuation.then_some(c);
                }
                current.push(c);
            }
            if !current.is_empty() {
                split.push(current);
            }
        }

        split
    }

    fn multiline_for(&self, command: &str) -> String {
        if !command.is_empty() && self.config.multiline_commands.iter().any(|m| m == command) {
            command.to_string()
        } else {
            String::new()
        }
    }
}

/// Single-character terminators plus, when redirection is allowed, the
/// redirection characters. A multi-character terminator cannot take part
/// in character-level splitting.
fn build_punctuation(config: &ParserConfig) -> Vec<char> {
    let mut punctuation: Vec<char> = config
        .terminators
        .iter()
        .filter_map(|t| {
            let mut chars = t.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            }
        })
        .collect();
    if config.allow_redirection {
        punctuation.extend(REDIRECTION_CHARS);
    }
    punctuation
}

/// Find the first token starting with a configured terminator, checking
/// terminators in configuration order at each position.
fn find_terminator(tokens: &[String], terminators: &[String]) -> Option<(usize, String)> {
    for (pos, token) in tokens.iter().enumerate() {
        for terminator in terminators {
            if !terminator.is_empty() && token.starts_with(terminator.as_str()) {
                return Some((pos, terminator.clone()));
            }
        }
    }
    None
}

/// Split tokens into the command (first token) and the space-joined args.
fn command_and_args(tokens: &[String]) -> (String, String) {
    match tokens.split_first() {
        Some((command, rest)) => (command.clone(), rest.join(" ")),
        None => (String::new(), String::new()),
    }
}

/// Expand a leading home-directory marker in a path-like token.
fn expand_user(token: &str) -> String {
    shellexpand::tilde(token).into_owned()
}

/// Shell-quote a character or terminator for a diagnostic message.
fn quote_for_display(s: &str) -> String {
    shlex::try_quote(s).map_or_else(|_| s.to_string(), |quoted| quoted.into_owned())
}
