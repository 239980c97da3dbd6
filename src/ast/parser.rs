use crate::ast::evaluator::DEFAULT_MAX_DEPTH;
use crate::ast::{ASTNode, Operator};
use crate::grammar::{EquationGrammar, Rule};
use crate::EvalError;
use log::{debug, trace};
use pest::error::InputLocation;
use pest::Parser;

const SUM_TIER: [Operator; 2] = [Operator::Add, Operator::Subtract];
const PRODUCT_TIER: [Operator; 2] = [Operator::Multiply, Operator::Divide];

#[derive(Debug, Clone, Copy, PartialEq)]
enum TokenKind {
    Number,
    Identifier,
    Operator(Operator),
    Caret,
    Open,
    Close,
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    kind: TokenKind,
    text: &'a str,
    position: usize,
}

/// Turns expression text into an [`ASTNode`].
///
/// Grammar, loosest binding first:
///
/// ```text
/// expr  := term (('+' | '-') term)*
/// term  := power (('*' | '/') power)*
/// power := unary ('^' power)?
/// unary := '-' unary | atom
/// atom  := number | identifier | '(' expr ')'
/// ```
///
/// A single leading `+` on the whole expression is ignored.
pub struct ExpressionParser;

impl ExpressionParser {
    pub fn parse_expression(input: &str) -> Result<ASTNode, EvalError> {
        Self::parse_with_limit(input, DEFAULT_MAX_DEPTH)
    }

    /// Parses `input`, failing with [`EvalError::TooDeep`] once parentheses,
    /// negations or exponents nest more than `max_depth` levels.
    pub fn parse_with_limit(input: &str, max_depth: usize) -> Result<ASTNode, EvalError> {
        Self::parse_from_depth(input, 0, max_depth)
    }

    /// Parses `input` as if `depth` nesting levels were already in use, so that an
    /// expression reached through variable lookups shares one budget with its caller.
    pub(crate) fn parse_from_depth(
        input: &str,
        depth: usize,
        max_depth: usize,
    ) -> Result<ASTNode, EvalError> {
        debug!("Parsing expression: {}", input);
        let mut tokens = tokenize(input)?;
        trace!("Tokens: {:?}", tokens);

        check_parentheses(&tokens)?;

        if let Some(Token {
            kind: TokenKind::Operator(Operator::Add),
            ..
        }) = tokens.first()
        {
            tokens.remove(0);
        }

        let mut cursor = TokenCursor {
            input,
            tokens,
            position: 0,
            depth,
            max_depth,
        };
        let ast = cursor.parse_sum()?;
        if cursor.peek().is_some() {
            return Err(cursor.malformed());
        }

        debug!("Parse result: {:?}", ast);
        Ok(ast)
    }
}

fn tokenize(input: &str) -> Result<Vec<Token<'_>>, EvalError> {
    let root = EquationGrammar::parse(Rule::tokens, input)
        .map_err(|e| unexpected_character(input, &e.location))?
        .next()
        .ok_or_else(|| EvalError::MalformedExpression(input.trim().to_string()))?;

    let mut tokens = Vec::new();
    for pair in root.into_inner() {
        let kind = match pair.as_rule() {
            Rule::number => TokenKind::Number,
            Rule::identifier => TokenKind::Identifier,
            Rule::add => TokenKind::Operator(Operator::Add),
            Rule::subtract => TokenKind::Operator(Operator::Subtract),
            Rule::multiply => TokenKind::Operator(Operator::Multiply),
            Rule::divide => TokenKind::Operator(Operator::Divide),
            Rule::power => TokenKind::Caret,
            Rule::open => TokenKind::Open,
            Rule::close => TokenKind::Close,
            _ => continue,
        };
        tokens.push(Token {
            kind,
            text: pair.as_str(),
            position: pair.as_span().start(),
        });
    }
    Ok(tokens)
}

fn unexpected_character(input: &str, location: &InputLocation) -> EvalError {
    let position = match location {
        InputLocation::Pos(position) => *position,
        InputLocation::Span((start, _)) => *start,
    };
    // pest can also give up on well-formed input, e.g. when its stack guard trips.
    match input.get(position..).and_then(|rest| rest.chars().next()) {
        Some(character) if !is_token_char(character) => EvalError::UnexpectedCharacter {
            character,
            position,
        },
        _ => EvalError::MalformedExpression(input.trim().to_string()),
    }
}

fn is_token_char(character: char) -> bool {
    character.is_ascii_alphanumeric()
        || matches!(
            character,
            '_' | '.' | '+' | '-' | '*' | '/' | '^' | '(' | ')' | ' ' | '\t' | '\r' | '\n'
        )
}

/// Every `)` must close an earlier `(` and every `(` must be closed.
fn check_parentheses(tokens: &[Token<'_>]) -> Result<(), EvalError> {
    let mut unclosed = Vec::new();
    for token in tokens {
        match token.kind {
            TokenKind::Open => unclosed.push(token.position),
            TokenKind::Close => {
                if unclosed.pop().is_none() {
                    return Err(EvalError::ParenMismatch {
                        position: token.position,
                    });
                }
            }
            _ => {}
        }
    }
    match unclosed.first() {
        Some(&position) => Err(EvalError::ParenMismatch { position }),
        None => Ok(()),
    }
}

/// `digits ('.' digits)?`, nothing else.
fn parse_number(literal: &str) -> Result<f64, EvalError> {
    let invalid = || EvalError::InvalidNumber(literal.to_string());
    let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());

    let (whole, fraction) = match literal.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (literal, None),
    };
    if !all_digits(whole) || fraction.is_some_and(|fraction| !all_digits(fraction)) {
        return Err(invalid());
    }
    literal.parse::<f64>().map_err(|_| invalid())
}

struct TokenCursor<'a> {
    input: &'a str,
    tokens: Vec<Token<'a>>,
    position: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> TokenCursor<'a> {
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.position).copied();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek().is_some_and(|token| token.kind == kind) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn malformed(&self) -> EvalError {
        EvalError::MalformedExpression(self.input.trim().to_string())
    }

    fn nested(
        &mut self,
        rule: fn(&mut Self) -> Result<ASTNode, EvalError>,
    ) -> Result<ASTNode, EvalError> {
        if self.depth >= self.max_depth {
            return Err(EvalError::TooDeep {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let node = rule(self);
        self.depth -= 1;
        node
    }

    fn parse_sum(&mut self) -> Result<ASTNode, EvalError> {
        self.parse_chain(&SUM_TIER, Self::parse_product)
    }

    fn parse_product(&mut self) -> Result<ASTNode, EvalError> {
        self.parse_chain(&PRODUCT_TIER, Self::parse_power)
    }

    fn parse_chain(
        &mut self,
        tier: &[Operator],
        operand: fn(&mut Self) -> Result<ASTNode, EvalError>,
    ) -> Result<ASTNode, EvalError> {
        let first = operand(self)?;
        let mut rest = Vec::new();

        while let Some(operator) = self.peek().and_then(|token| match token.kind {
            TokenKind::Operator(operator) if tier.contains(&operator) => Some(operator),
            _ => None,
        }) {
            self.position += 1;
            rest.push((operator, operand(self)?));
        }

        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(ASTNode::Chain {
                first: Box::new(first),
                rest,
            })
        }
    }

    fn parse_power(&mut self) -> Result<ASTNode, EvalError> {
        let base = self.parse_unary()?;
        if !self.eat(TokenKind::Caret) {
            return Ok(base);
        }
        let exponent = self.nested(Self::parse_power)?; // Right associative
        Ok(ASTNode::Power {
            base: Box::new(base),
            exponent: Box::new(exponent),
        })
    }

    fn parse_unary(&mut self) -> Result<ASTNode, EvalError> {
        if self.eat(TokenKind::Operator(Operator::Subtract)) {
            let operand = self.nested(Self::parse_unary)?;
            return Ok(ASTNode::Negate(Box::new(operand)));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<ASTNode, EvalError> {
        let token = self.advance().ok_or_else(|| self.malformed())?;
        match token.kind {
            TokenKind::Number => parse_number(token.text).map(ASTNode::Number),
            TokenKind::Identifier => Ok(ASTNode::Identifier(token.text.to_string())),
            TokenKind::Open => {
                let inner = self.nested(Self::parse_sum)?;
                if self.eat(TokenKind::Close) {
                    Ok(inner)
                } else {
                    Err(self.malformed())
                }
            }
            _ => Err(self.malformed()),
        }
    }
}
