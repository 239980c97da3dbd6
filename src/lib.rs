//! Evaluation engine for named arithmetic equations.
//!
//! A [`VariableTable`] maps names to either raw expressions or values. Evaluating
//! an expression resolves every variable it references through the same table,
//! caching each resolved value back into its slot and rejecting circular
//! references.
//!
//! ```
//! use equations_rs::{evaluate, Slot, VariableTable};
//!
//! let mut table: VariableTable = [("a", "1"), ("b", "2"), ("c", "a + b")]
//!     .into_iter()
//!     .collect();
//!
//! assert_eq!(evaluate("c * 2", &mut table), Ok(6.0));
//! assert_eq!(table.get("c"), Some(&Slot::Evaluated(3.0)));
//! ```

pub mod ast;
pub mod definitions;
mod error;
mod grammar;
pub mod report;
mod table;

pub use ast::{Evaluator, EvaluatorConfig};
pub use definitions::{Definition, Definitions};
pub use error::{DefinitionError, EvalError};
pub use report::{evaluate_tables, Report};
pub use table::{Slot, VariableTable};

/// Evaluates `expression` against `variables` with a default [`Evaluator`].
pub fn evaluate(expression: &str, variables: &mut VariableTable) -> Result<f64, EvalError> {
    Evaluator::default().evaluate(expression, variables)
}
