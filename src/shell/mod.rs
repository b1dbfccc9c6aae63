//! The constrained shell learners type into
//!
//! `parser` turns a line into a `ParsedCommand`, `executor` runs it against a
//! `Session`. Shell errors are rendered as text and never escape.

pub mod command;
pub mod custom;
pub mod error;
pub mod executor;
pub mod parser;
pub mod session;

pub use command::Command;
pub use custom::{CustomCommand, TemplateContext};
pub use error::ShellError;
pub use executor::{ExecOutput, Executor};
pub use parser::{parse, ParsedCommand, Redirect};
pub use session::Session;
