use crate::ast::{ASTNode, Parser};
use crate::{EvalError, Slot, VariableTable};
use log::{debug, trace};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

pub(crate) const DEFAULT_MAX_DEPTH: usize = 256;
const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Tuning knobs for an [`Evaluator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatorConfig {
    /// Number of parsed expressions kept in the LRU cache. Zero is treated as one.
    pub cache_capacity: usize,
    /// Nesting budget for one evaluation. Parser nesting, syntax tree levels and
    /// variables resolved through each other all count against it together.
    pub max_depth: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EvaluatorConfig {
    pub fn with_cache_capacity(mut self, cache_capacity: usize) -> Self {
        self.cache_capacity = cache_capacity;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Variables currently being resolved for one top-level evaluation, outermost first.
///
/// `depth` counts every nesting level in use: syntax tree levels being evaluated,
/// variables being resolved and, while parsing, the parser's own nesting. All of
/// them share [`EvaluatorConfig::max_depth`].
#[derive(Debug, Default)]
struct DependencyPath {
    names: Vec<String>,
    depth: usize,
}

impl DependencyPath {
    fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|entry| entry == name)
    }

    fn push(&mut self, name: &str) {
        self.names.push(name.to_string());
        self.depth += 1;
    }

    fn pop(&mut self) {
        if self.names.pop().is_some() {
            self.depth -= 1;
        }
    }

    /// The path as it would look after re-entering `name`.
    fn reentered(&self, name: &str) -> Vec<String> {
        let mut chain = self.names.clone();
        chain.push(name.to_string());
        chain
    }
}

pub struct Evaluator {
    cache: LruCache<String, Arc<ASTNode>>,
    max_depth: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::with_config(EvaluatorConfig::default())
    }
}

impl Evaluator {
    /// Creates a new `Evaluator` with a given maximum cache size.
    pub fn new(max_cache_size: usize) -> Self {
        Self::with_config(EvaluatorConfig::default().with_cache_capacity(max_cache_size))
    }

    pub fn with_config(config: EvaluatorConfig) -> Self {
        let capacity = NonZeroUsize::new(config.cache_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            max_depth: config.max_depth,
        }
    }

    /// Number of parsed expressions currently cached.
    pub fn cached_expressions(&self) -> usize {
        self.cache.len()
    }

    /// Parse an expression string into an AST, reusing a cached parse when the
    /// same text was seen recently. Failed parses are not cached.
    pub fn parse_expression(&mut self, expression: &str) -> Result<Arc<ASTNode>, EvalError> {
        self.parse_cached(expression, 0)
    }

    fn parse_cached(&mut self, expression: &str, depth: usize) -> Result<Arc<ASTNode>, EvalError> {
        if let Some(ast) = self.cache.get(expression) {
            trace!("Parse cache hit: {}", expression);
            return Ok(Arc::clone(ast));
        }

        let ast = Arc::new(Parser::parse_from_depth(expression, depth, self.max_depth)?);
        self.cache.put(expression.to_string(), Arc::clone(&ast));
        Ok(ast)
    }

    /// Evaluates `expression`, resolving every referenced variable through
    /// `variables`.
    ///
    /// Variables whose expressions resolve successfully are rewritten in the
    /// table as [`Slot::Evaluated`]; a failed resolution leaves its slot
    /// untouched. A final result of `NaN` is reported as
    /// [`EvalError::MalformedExpression`]; infinities are returned as values.
    pub fn evaluate(
        &mut self,
        expression: &str,
        variables: &mut VariableTable,
    ) -> Result<f64, EvalError> {
        let mut path = DependencyPath::default();
        self.evaluate_in(expression, variables, &mut path)
    }

    /// Evaluate an already parsed expression with the same resolution rules as
    /// [`Evaluator::evaluate`].
    pub fn evaluate_ast(
        &mut self,
        ast: &ASTNode,
        variables: &mut VariableTable,
    ) -> Result<f64, EvalError> {
        let mut path = DependencyPath::default();
        let value = self.evaluate_node(ast, variables, &mut path)?;
        if value.is_nan() {
            return Err(EvalError::MalformedExpression(ast.to_string()));
        }
        Ok(value)
    }

    /// Resolves the variable `name` itself, so that a cycle through `name` is
    /// reported against `name`.
    pub fn resolve(&mut self, name: &str, variables: &mut VariableTable) -> Result<f64, EvalError> {
        let mut path = DependencyPath::default();
        let value = self.resolve_variable(name, variables, &mut path)?;
        if value.is_nan() {
            return Err(EvalError::MalformedExpression(name.to_string()));
        }
        Ok(value)
    }

    fn evaluate_in(
        &mut self,
        expression: &str,
        variables: &mut VariableTable,
        path: &mut DependencyPath,
    ) -> Result<f64, EvalError> {
        let ast = self.parse_cached(expression, path.depth)?;
        let value = self.evaluate_node(&ast, variables, path)?;
        if value.is_nan() {
            return Err(EvalError::MalformedExpression(expression.trim().to_string()));
        }
        Ok(value)
    }

    fn evaluate_node(
        &mut self,
        node: &ASTNode,
        variables: &mut VariableTable,
        path: &mut DependencyPath,
    ) -> Result<f64, EvalError> {
        match node {
            ASTNode::Number(value) => Ok(*value),

            ASTNode::Identifier(name) => self.resolve_variable(name, variables, path),

            ASTNode::Negate(inner) => Ok(-self.evaluate_child(inner, variables, path)?),

            ASTNode::Power { base, exponent } => {
                let base = self.evaluate_child(base, variables, path)?;
                let exponent = self.evaluate_child(exponent, variables, path)?;
                Ok(base.powf(exponent))
            }

            ASTNode::Chain { first, rest } => {
                let mut value = self.evaluate_child(first, variables, path)?;
                for (operator, operand) in rest {
                    let right = self.evaluate_child(operand, variables, path)?;
                    value = operator.apply(value, right);
                }
                Ok(value)
            }
        }
    }

    fn evaluate_child(
        &mut self,
        node: &ASTNode,
        variables: &mut VariableTable,
        path: &mut DependencyPath,
    ) -> Result<f64, EvalError> {
        self.check_depth(path)?;
        path.depth += 1;
        let value = self.evaluate_node(node, variables, path);
        path.depth -= 1;
        value
    }

    fn check_depth(&self, path: &DependencyPath) -> Result<(), EvalError> {
        if path.depth >= self.max_depth {
            return Err(EvalError::TooDeep {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    fn resolve_variable(
        &mut self,
        name: &str,
        variables: &mut VariableTable,
        path: &mut DependencyPath,
    ) -> Result<f64, EvalError> {
        let expression = match variables.get(name) {
            None => return Err(EvalError::UnknownVariable(name.to_string())),
            Some(Slot::Evaluated(value)) => return Ok(*value),
            Some(Slot::Unevaluated(expression)) => expression.clone(),
        };

        if path.contains(name) {
            return Err(EvalError::CircularDependency {
                name: name.to_string(),
                chain: path.reentered(name),
            });
        }
        self.check_depth(path)?;

        debug!("Resolving variable {} = {}", name, expression);
        path.push(name);
        let result = self.evaluate_in(&expression, variables, path);
        path.pop();

        let value = result?;
        debug!("Memoizing {} = {}", name, value);
        variables.memoize(name, value);
        Ok(value)
    }
}
