use std::fmt;

mod evaluator;
mod parser;

pub use evaluator::{Evaluator, EvaluatorConfig};
pub use parser::ExpressionParser as Parser;

#[derive(Debug, Clone, PartialEq)]
pub enum ASTNode {
    Number(f64),
    Identifier(String),
    Negate(Box<ASTNode>),
    /// `base ^ exponent`, right-associative.
    Power {
        base: Box<ASTNode>,
        exponent: Box<ASTNode>,
    },
    /// A left-associative run of one precedence tier, e.g. `a - b + c`.
    Chain {
        first: Box<ASTNode>,
        rest: Vec<(Operator, ASTNode)>,
    },
}

impl ASTNode {
    /// Variable names referenced by this expression, in order of first appearance.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_identifiers(&mut names);
        names
    }

    fn collect_identifiers<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            ASTNode::Number(_) => {}
            ASTNode::Identifier(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name.as_str());
                }
            }
            ASTNode::Negate(inner) => inner.collect_identifiers(names),
            ASTNode::Power { base, exponent } => {
                base.collect_identifiers(names);
                exponent.collect_identifiers(names);
            }
            ASTNode::Chain { first, rest } => {
                first.collect_identifiers(names);
                for (_, operand) in rest {
                    operand.collect_identifiers(names);
                }
            }
        }
    }

    fn is_atom(&self) -> bool {
        matches!(self, ASTNode::Number(_) | ASTNode::Identifier(_))
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, bare: bool) -> fmt::Result {
        if bare {
            write!(f, "{self}")
        } else {
            write!(f, "({self})")
        }
    }
}

impl fmt::Display for ASTNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ASTNode::Number(value) => write!(f, "{value}"),
            ASTNode::Identifier(name) => write!(f, "{name}"),
            ASTNode::Negate(inner) => {
                write!(f, "-")?;
                inner.fmt_operand(f, inner.is_atom() || matches!(**inner, ASTNode::Negate(_)))
            }
            ASTNode::Power { base, exponent } => {
                base.fmt_operand(f, base.is_atom() || matches!(**base, ASTNode::Negate(_)))?;
                write!(f, "^")?;
                exponent.fmt_operand(f, !matches!(**exponent, ASTNode::Chain { .. }))
            }
            ASTNode::Chain { first, rest } => {
                first.fmt_operand(f, !matches!(**first, ASTNode::Chain { .. }))?;
                for (operator, operand) in rest {
                    write!(f, " {operator} ")?;
                    operand.fmt_operand(f, !matches!(operand, ASTNode::Chain { .. }))?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// IEEE-754 semantics throughout; dividing by zero yields an infinity or NaN.
    pub fn apply(&self, left: f64, right: f64) -> f64 {
        match self {
            Operator::Add => left + right,
            Operator::Subtract => left - right,
            Operator::Multiply => left * right,
            Operator::Divide => left / right,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl TryFrom<char> for Operator {
    type Error = String;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '+' => Ok(Operator::Add),
            '-' => Ok(Operator::Subtract),
            '*' => Ok(Operator::Multiply),
            '/' => Ok(Operator::Divide),
            _ => Err(format!("Unknown operator: {}", value)),
        }
    }
}
