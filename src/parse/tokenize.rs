//! Word-level lexing: quote-preserving whitespace splitting and the
//! character classes shared across the parser.

use thiserror::Error;

/// Implicit terminator recorded when the input line ends in a line feed.
pub const LINE_FEED: &str = "\n";

/// Token that pipes statement output to an external process.
pub const REDIRECTION_PIPE: &str = "|";
/// Token that redirects statement output to a file, truncating it.
pub const REDIRECTION_OUTPUT: &str = ">";
/// Token that redirects statement output to a file, appending.
pub const REDIRECTION_APPEND: &str = ">>";

/// Characters that introduce redirection or piping.
pub const REDIRECTION_CHARS: [char; 2] = ['|', '>'];

/// Characters that open a quoted span.
pub const QUOTE_CHARS: [char; 2] = ['"', '\''];

/// Errors raised while lexing a line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A quote character was opened but never closed before end of input.
    #[error("no closing quotation")]
    UnterminatedQuote,
}

/// True for the quote characters recognized by the lexer.
pub fn is_quote_char(c: char) -> bool {
    QUOTE_CHARS.contains(&c)
}

/// True for redirection/pipe characters.
pub fn is_redirect_char(c: char) -> bool {
    REDIRECTION_CHARS.contains(&c)
}

/// Remove matching surrounding quote marks from a word, if present.
///
/// Only a full pair is stripped; a lone or mismatched quote is left alone.
pub fn strip_quotes(word: &str) -> &str {
    let mut chars = word.chars();
    if let (Some(first), Some(last)) = (chars.next(), chars.next_back())
        && is_quote_char(first)
        && first == last
    {
        return &word[first.len_utf8()..word.len() - last.len_utf8()];
    }
    word
}

/// Split a line into whitespace-delimited words, preserving quotes.
///
/// Quote characters stay in the emitted word. Inside a quoted span a
/// backslash escapes the next character, so an embedded quote mark does
/// not close the span, and whitespace does not split. A quote opened
/// mid-word (`say"hi there"`) keeps the word intact.
pub fn split_words(line: &str) -> Result<Vec<String>, ParseError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                current.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                } else if c == q {
                    quote = None;
                }
            }
            None => {
                if c.is_whitespace() {
                    if !current.is_empty() {
                        words.push(std::mem::take(&mut current));
                    }
                } else {
                    if is_quote_char(c) {
                        quote = Some(c);
                    }
                    current.push(c);
                }
            }
        }
    }

    if quote.is_some() {
        return Err(ParseError::UnterminatedQuote);
    }
    if !current.is_empty() {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_simple() {
        assert_eq!(split_words("ls -la /tmp").unwrap(), vec!["ls", "-la", "/tmp"]);
    }

    #[test]
    fn split_collapses_runs_of_whitespace() {
        assert_eq!(split_words("  say   hello  ").unwrap(), vec!["say", "hello"]);
    }

    #[test]
    fn split_keeps_quotes() {
        assert_eq!(
            split_words("say \"hello world\"").unwrap(),
            vec!["say", "\"hello world\""]
        );
    }

    #[test]
    fn split_single_quotes() {
        assert_eq!(
            split_words("say 'hello world'").unwrap(),
            vec!["say", "'hello world'"]
        );
    }

    #[test]
    fn split_quote_opened_mid_word() {
        assert_eq!(
            split_words("say\"hi there\"x").unwrap(),
            vec!["say\"hi there\"x"]
        );
    }

    #[test]
    fn split_escaped_quote_does_not_close() {
        assert_eq!(
            split_words(r#"say "a \" b""#).unwrap(),
            vec!["say", r#""a \" b""#]
        );
    }

    #[test]
    fn split_unterminated_quote_is_error() {
        assert_eq!(
            split_words("say \"unterminated"),
            Err(ParseError::UnterminatedQuote)
        );
    }

    #[test]
    fn split_empty_line() {
        assert!(split_words("").unwrap().is_empty());
        assert!(split_words("   ").unwrap().is_empty());
    }

    #[test]
    fn strip_quotes_pair() {
        assert_eq!(strip_quotes("\"hello\""), "hello");
        assert_eq!(strip_quotes("'hello'"), "hello");
    }

    #[test]
    fn strip_quotes_mismatched() {
        assert_eq!(strip_quotes("\"hello'"), "\"hello'");
        assert_eq!(strip_quotes("\"hello"), "\"hello");
    }

    #[test]
    fn strip_quotes_lone_quote() {
        assert_eq!(strip_quotes("\""), "\"");
        assert_eq!(strip_quotes(""), "");
    }

    #[test]
    fn strip_quotes_unquoted() {
        assert_eq!(strip_quotes("hello"), "hello");
    }
}
