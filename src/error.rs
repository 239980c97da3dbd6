use thiserror::Error;

/// Errors produced while evaluating an expression against a [`VariableTable`].
///
/// A failure inside a referenced variable is returned unchanged to the caller
/// that asked for the outer expression.
///
/// [`VariableTable`]: crate::VariableTable
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("Unknown Variable: {0}")]
    UnknownVariable(String),

    #[error("Circular Dependency: {name} ({})", .chain.join(" -> "))]
    CircularDependency { name: String, chain: Vec<String> },

    #[error("Mismatched Parenthesis at position {position}")]
    ParenMismatch { position: usize },

    #[error("Invalid Number: {0}")]
    InvalidNumber(String),

    #[error("Malformed Expression: {0}")]
    MalformedExpression(String),

    #[error("Unexpected character '{character}' at position {position}")]
    UnexpectedCharacter { character: char, position: usize },

    #[error("Expression nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// Errors raised while turning definition text into a variable table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("Line {line}: expected `name = expression`")]
    Syntax { line: usize },

    #[error("Line {line}: duplicate name `{name}`")]
    DuplicateName { name: String, line: usize },

    #[error("Line {line}: `{name}` is not a valid variable name")]
    InvalidName { name: String, line: usize },
}
