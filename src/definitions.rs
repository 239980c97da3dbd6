//! Text form of an equation list, one definition per line:
//!
//! ```text
//! width = 10;            // plain definition
//! height = width * 2     // the semicolon is optional
//! // depth = height / 4; // leading `//` disables the definition
//! ```

use crate::grammar::{EquationGrammar, Rule};
use crate::{DefinitionError, VariableTable};
use log::debug;
use pest::Parser;
use std::collections::HashSet;
use std::fmt;
use std::slice::Iter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: String,
    pub expression: String,
    pub comment: Option<String>,
    pub disabled: bool,
    /// 1-based line number in the source text.
    pub line: usize,
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.disabled {
            write!(f, "// ")?;
        }
        write!(f, "{} = {};", self.name, self.expression)?;
        if let Some(comment) = &self.comment {
            write!(f, " // {}", comment)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definitions {
    definitions: Vec<Definition>,
}

impl Definitions {
    /// Parses definition text. Blank lines and `//` remarks are skipped; any
    /// other line that is not a definition is an error.
    pub fn parse(text: &str) -> Result<Self, DefinitionError> {
        let mut definitions = Vec::new();
        for (index, source) in text.lines().enumerate() {
            if let Some(definition) = parse_line(source, index + 1)? {
                definitions.push(definition);
            }
        }
        debug!("Parsed {} definitions", definitions.len());
        Ok(Self { definitions })
    }

    pub fn iter(&self) -> Iter<'_, Definition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Builds the table handed to the evaluator.
    ///
    /// Disabled definitions and definitions without an expression are left
    /// out. Names must not start with a digit and must be unique among the
    /// remaining definitions.
    pub fn to_table(&self) -> Result<VariableTable, DefinitionError> {
        let mut seen = HashSet::new();
        let mut table = VariableTable::new();

        for definition in self.definitions.iter().filter(|d| !d.disabled) {
            if definition.expression.is_empty() {
                continue;
            }
            if definition.name.starts_with(|c: char| c.is_ascii_digit()) {
                return Err(DefinitionError::InvalidName {
                    name: definition.name.clone(),
                    line: definition.line,
                });
            }
            if !seen.insert(definition.name.as_str()) {
                return Err(DefinitionError::DuplicateName {
                    name: definition.name.clone(),
                    line: definition.line,
                });
            }
            table.insert_expression(&definition.name, &definition.expression);
        }

        Ok(table)
    }
}

impl<'a> IntoIterator for &'a Definitions {
    type Item = &'a Definition;
    type IntoIter = Iter<'a, Definition>;

    fn into_iter(self) -> Self::IntoIter {
        self.definitions.iter()
    }
}

fn parse_line(source: &str, line: usize) -> Result<Option<Definition>, DefinitionError> {
    let syntax = || DefinitionError::Syntax { line };
    let root = EquationGrammar::parse(Rule::line, source)
        .map_err(|_| syntax())?
        .next()
        .ok_or_else(syntax)?;

    let Some(pair) = root
        .into_inner()
        .find(|pair| pair.as_rule() == Rule::definition)
    else {
        return Ok(None);
    };

    let mut definition = Definition {
        name: String::new(),
        expression: String::new(),
        comment: None,
        disabled: false,
        line,
    };
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::disabled => definition.disabled = true,
            Rule::name => definition.name = part.as_str().to_string(),
            Rule::value => definition.expression = part.as_str().trim().to_string(),
            Rule::comment => {
                let comment = part.as_str().trim();
                if !comment.is_empty() {
                    definition.comment = Some(comment.to_string());
                }
            }
            _ => {}
        }
    }
    Ok(Some(definition))
}
