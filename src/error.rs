//! Error types raised while reading, validating and resolving attacks.

use std::path::PathBuf;

use thiserror::Error;

use crate::parse::Field;

/// Errors surfaced by the parser, the resolver and the block reader.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed damage expression {expression:?}: {reason}")]
    MalformedDamageExpression { expression: String, reason: String },

    #[error("invalid {field} value {value:?}: expected {expected}")]
    InvalidFieldValue {
        field: Field,
        value: String,
        expected: &'static str,
    },

    #[error("unrecognized configuration line {line_number}: {line:?}")]
    UnrecognizedConfigurationLine { line_number: usize, line: String },

    #[error("{}", incomplete_message(.field, .block))]
    IncompleteConfiguration { field: Field, block: Option<usize> },

    #[error("file does not exist: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("input closed while waiting for an answer to {question:?}")]
    PromptClosed { question: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

fn incomplete_message(field: &Field, block: &Option<usize>) -> String {
    match block {
        Some(block) => format!("missing {field} in attack set {block}"),
        None => format!("missing {field}, not enough options to roll the attack(s)"),
    }
}
