//! The immutable result of parsing one input line.

use serde::{Deserialize, Serialize};

use super::tokenize::strip_quotes;

/// The structured outcome of parsing one line of input.
///
/// Built by [`StatementParser::parse`] or
/// [`StatementParser::parse_command_only`] and never modified afterwards.
/// `args` carries the argument text with quotes preserved; use
/// [`Statement::argv`] for the unquoted, executable-argument view.
///
/// [`StatementParser::parse`]: super::StatementParser::parse
/// [`StatementParser::parse_command_only`]: super::StatementParser::parse_command_only
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub(crate) raw: String,
    pub(crate) command: String,
    pub(crate) args: String,
    pub(crate) arg_list: Vec<String>,
    pub(crate) multiline_command: String,
    pub(crate) terminator: String,
    pub(crate) suffix: String,
    pub(crate) pipe_to: Vec<String>,
    pub(crate) output: String,
    pub(crate) output_to: String,
}

impl Statement {
    /// Exactly the text the user typed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The first word of the statement; empty if none was found.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Argument text after the command, joined by single spaces, with
    /// quotes preserved.
    pub fn args(&self) -> &str {
        &self.args
    }

    /// The argument tokens in order, quotes preserved per token.
    pub fn arg_list(&self) -> &[String] {
        &self.arg_list
    }

    /// Equals [`command`](Self::command) when the command is registered as
    /// a multiline command, otherwise empty.
    pub fn multiline_command(&self) -> &str {
        &self.multiline_command
    }

    /// The terminator that closed the statement, [`LINE_FEED`] for the
    /// implicit one, or empty if none was found.
    ///
    /// [`LINE_FEED`]: super::tokenize::LINE_FEED
    pub fn terminator(&self) -> &str {
        &self.terminator
    }

    /// Text appearing after the terminator but before any redirection or
    /// pipe clause.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Tokens of the external command output is piped to, unquoted and
    /// tilde-expanded; empty if there is no pipe clause.
    pub fn pipe_to(&self) -> &[String] {
        &self.pipe_to
    }

    /// The redirection operator in effect (`>` or `>>`), empty if none.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// The redirection target path, unquoted and tilde-expanded; empty if
    /// no target was given.
    pub fn output_to(&self) -> &str {
        &self.output_to
    }

    /// Command and args joined by a single space; quoted args stay quoted.
    pub fn command_and_args(&self) -> String {
        if self.command.is_empty() {
            String::new()
        } else if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args)
        }
    }

    /// The arguments a la `argv`: the command followed by each argument,
    /// surrounding quotes removed. Aliases and shortcuts are already
    /// expanded.
    pub fn argv(&self) -> Vec<String> {
        if self.command.is_empty() {
            return Vec::new();
        }
        let mut argv = vec![strip_quotes(&self.command).to_string()];
        argv.extend(self.arg_list.iter().map(|t| strip_quotes(t).to_string()));
        argv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_all_empty() {
        let statement = Statement::default();
        assert_eq!(statement.command(), "");
        assert_eq!(statement.args(), "");
        assert!(statement.arg_list().is_empty());
        assert_eq!(statement.command_and_args(), "");
        assert!(statement.argv().is_empty());
    }

    #[test]
    fn command_and_args_joins_with_one_space() {
        let statement = Statement {
            command: "say".into(),
            args: "hello there".into(),
            ..Statement::default()
        };
        assert_eq!(statement.command_and_args(), "say hello there");
    }

    #[test]
    fn command_and_args_command_alone() {
        let statement = Statement {
            command: "help".into(),
            ..Statement::default()
        };
        assert_eq!(statement.command_and_args(), "help");
    }

    #[test]
    fn argv_strips_quotes() {
        let statement = Statement {
            command: "say".into(),
            args: "\"hello there\" friend".into(),
            arg_list: vec!["\"hello there\"".into(), "friend".into()],
            ..Statement::default()
        };
        assert_eq!(statement.argv(), vec!["say", "hello there", "friend"]);
    }

    #[test]
    fn serializes_to_json() {
        let statement = Statement {
            raw: "say hi;".into(),
            command: "say".into(),
            args: "hi".into(),
            arg_list: vec!["hi".into()],
            terminator: ";".into(),
            ..Statement::default()
        };
        let json = serde_json::to_string(&statement).unwrap();
        let back: Statement = serde_json::from_str(&json).unwrap();
        assert_eq!(back, statement);
    }
}
