//! Command line tokenizer
//!
//! Splits on whitespace, groups double-quoted text into one token (quotes are
//! dropped, there are no escapes) and peels off a `>`/`>>` redirection. It
//! never fails.

use serde::{Deserialize, Serialize};

/// Output redirection target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub path: String,   // Empty when the operator had no destination
    pub append: bool,
}

/// A tokenized command line
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCommand {
    pub command: String,
    pub args: Vec<String>,
    pub redirect: Option<Redirect>,
}

impl ParsedCommand {
    pub fn is_empty(&self) -> bool {
        self.command.is_empty()
    }
}

struct Token {
    text: String,
    quoted: bool,
}

fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut in_quotes = false;
    let mut started = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                quoted = true;
                started = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if started {
                    tokens.push(Token { text: std::mem::take(&mut current), quoted });
                    quoted = false;
                    started = false;
                }
            }
            c => {
                current.push(c);
                started = true;
            }
        }
    }
    if started {
        tokens.push(Token { text: current, quoted });
    }
    tokens
}

/// Parse a raw line into program, arguments and redirection
pub fn parse(line: &str) -> ParsedCommand {
    let mut tokens = tokenize(line).into_iter();
    let Some(first) = tokens.next() else {
        return ParsedCommand::default();
    };

    let mut args = Vec::new();
    let mut redirect = None;
    while let Some(token) = tokens.next() {
        if !token.quoted && (token.text == ">" || token.text == ">>") {
            redirect = Some(Redirect {
                path: tokens.next().map(|t| t.text).unwrap_or_default(),
                append: token.text == ">>",
            });
            break;
        }
        args.push(token.text);
    }

    ParsedCommand { command: first.text, args, redirect }
}
