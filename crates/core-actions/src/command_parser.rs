//! Submitted-line classification.
//!
//! * A line whose first non-whitespace character is the sentinel is a
//!   command. The keyword runs up to the first whitespace (it may be empty,
//!   `"."` alone) and the remaining text is split on whitespace into arguments.
//! * Everything else is an expression.
//! * No side-effects here; pure classification.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Command { keyword: String, args: Vec<String> },
    Expression,
}

pub struct CommandParser;

impl CommandParser {
    pub fn parse(line: &str, sentinel: char) -> ParsedLine {
        let Some(body) = line.trim().strip_prefix(sentinel) else {
            return ParsedLine::Expression;
        };
        let (keyword, rest) = body
            .split_once(char::is_whitespace)
            .unwrap_or((body, ""));
        ParsedLine::Command {
            keyword: keyword.to_string(),
            args: rest.split_whitespace().map(str::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn command(keyword: &str, args: &[&str]) -> ParsedLine {
        ParsedLine::Command {
            keyword: keyword.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn parse_bare_keyword() {
        assert_eq!(CommandParser::parse(".help", '.'), command("help", &[]));
    }

    #[test]
    fn parse_arguments_split_on_whitespace() {
        assert_eq!(
            CommandParser::parse(".save   /tmp/x  extra", '.'),
            command("save", &["/tmp/x", "extra"])
        );
        assert_eq!(
            CommandParser::parse(".load\tfile.txt", '.'),
            command("load", &["file.txt"])
        );
    }

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(CommandParser::parse(".HELP", '.'), command("HELP", &[]));
    }

    #[test]
    fn lone_sentinel_has_empty_keyword() {
        assert_eq!(CommandParser::parse(".", '.'), command("", &[]));
        assert_eq!(CommandParser::parse(". help", '.'), command("", &["help"]));
    }

    #[test]
    fn expressions() {
        assert_eq!(CommandParser::parse("1 + 2", '.'), ParsedLine::Expression);
        assert_eq!(CommandParser::parse(".5 * 2", ':'), ParsedLine::Expression);
        assert_eq!(CommandParser::parse("", '.'), ParsedLine::Expression);
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(CommandParser::parse(" .help", '.'), command("help", &[]));
        assert_eq!(
            CommandParser::parse("\t .save out.txt  ", '.'),
            command("save", &["out.txt"])
        );
        assert_eq!(CommandParser::parse("  1 .5", '.'), ParsedLine::Expression);
    }

    #[test]
    fn custom_sentinel() {
        assert_eq!(CommandParser::parse(":exit", ':'), command("exit", &[]));
    }
}
