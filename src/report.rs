//! Whole-table evaluation, producing one result per variable.

use crate::{EvalError, Evaluator, EvaluatorConfig, VariableTable};
use log::debug;
use rayon::prelude::*;
use std::collections::btree_map::Iter;
use std::collections::BTreeMap;

/// Outcome of evaluating every variable in a table, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    results: BTreeMap<String, Result<f64, EvalError>>,
}

impl Report {
    pub fn get(&self, name: &str) -> Option<&Result<f64, EvalError>> {
        self.results.get(name)
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|result| result.as_ref().ok().copied())
    }

    pub fn iter(&self) -> Iter<'_, String, Result<f64, EvalError>> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Variables that failed, in name order.
    pub fn errors(&self) -> impl Iterator<Item = (&str, &EvalError)> {
        self.results
            .iter()
            .filter_map(|(name, result)| result.as_ref().err().map(|err| (name.as_str(), err)))
    }

    /// True when every variable evaluated.
    pub fn is_clean(&self) -> bool {
        self.results.values().all(Result::is_ok)
    }

    /// One-line message for the variable, e.g. `Result: 6` or
    /// `Syntax error in equation "e": Circular Dependency: e (e -> f -> e)`.
    pub fn feedback(&self, name: &str) -> Option<String> {
        self.get(name).map(|result| match result {
            Ok(value) if value.is_infinite() => {
                let sign = if value.is_sign_negative() { "-" } else { "" };
                format!("Result: {}Infinity", sign)
            }
            Ok(value) => format!("Result: {}", value),
            Err(err) => format!("Syntax error in equation \"{}\": {}", name, err),
        })
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = (&'a String, &'a Result<f64, EvalError>);
    type IntoIter = Iter<'a, String, Result<f64, EvalError>>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl Evaluator {
    /// Resolves every variable in `variables`, in name order.
    ///
    /// Each variable is resolved by name, so a member of a cycle reports the
    /// cycle against itself.
    pub fn evaluate_all(&mut self, variables: &mut VariableTable) -> Report {
        let mut results = BTreeMap::new();
        for name in variables.names() {
            let result = self.resolve(&name, variables);
            if let Err(err) = &result {
                debug!("Variable {} failed: {}", name, err);
            }
            results.insert(name, result);
        }
        Report { results }
    }
}

/// Evaluates independent tables in parallel, one [`Evaluator`] per worker.
///
/// Each table is only touched by the worker that evaluates it, so no locking is
/// involved. Reports come back in the same order as `tables`.
pub fn evaluate_tables(tables: &mut [VariableTable], config: &EvaluatorConfig) -> Vec<Report> {
    tables
        .par_iter_mut()
        .map_init(
            || Evaluator::with_config(*config),
            |evaluator, table| evaluator.evaluate_all(table),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Slot;

    fn sample_table() -> VariableTable {
        [
            ("a", Slot::from(1.0)),
            ("b", Slot::from(2.0)),
            ("c", Slot::from("a + b")),
            ("d", Slot::from("c * 2")),
            ("e", Slot::from("d + f")),
            ("f", Slot::from("e * 2")),
            ("g", Slot::from("c + a")),
            ("h", Slot::from("unknown / 2")),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_evaluate_all() {
        let mut table = sample_table();
        let report = Evaluator::default().evaluate_all(&mut table);

        assert_eq!(report.len(), 8);
        assert_eq!(report.value("a"), Some(1.0));
        assert_eq!(report.value("c"), Some(3.0));
        assert_eq!(report.value("d"), Some(6.0));
        assert_eq!(report.value("g"), Some(4.0));
        assert!(!report.is_clean());

        let failed: Vec<&str> = report.errors().map(|(name, _)| name).collect();
        assert_eq!(failed, vec!["e", "f", "h"]);

        assert_eq!(
            report.get("f"),
            Some(&Err(EvalError::CircularDependency {
                name: "f".to_string(),
                chain: vec!["f".to_string(), "e".to_string(), "f".to_string()],
            }))
        );
        assert_eq!(table.value("g"), Some(4.0));
        assert_eq!(table.value("e"), None);
    }

    #[test]
    fn test_feedback_messages() {
        let mut table = sample_table();
        let report = Evaluator::default().evaluate_all(&mut table);

        assert_eq!(report.feedback("d").as_deref(), Some("Result: 6"));
        assert_eq!(report.feedback("a").as_deref(), Some("Result: 1"));
        assert_eq!(
            report.feedback("e").as_deref(),
            Some("Syntax error in equation \"e\": Circular Dependency: e (e -> f -> e)")
        );
        assert_eq!(
            report.feedback("h").as_deref(),
            Some("Syntax error in equation \"h\": Unknown Variable: unknown")
        );
        assert_eq!(report.feedback("zzz"), None);
    }

    #[test]
    fn test_feedback_for_infinite_results() {
        let mut table: VariableTable = [("up", "1/0"), ("down", "-1/0"), ("half", "1/2")]
            .into_iter()
            .collect();
        let report = Evaluator::default().evaluate_all(&mut table);

        assert_eq!(report.feedback("up").as_deref(), Some("Result: Infinity"));
        assert_eq!(report.feedback("down").as_deref(), Some("Result: -Infinity"));
        assert_eq!(report.feedback("half").as_deref(), Some("Result: 0.5"));
    }

    #[test]
    fn test_evaluate_tables_in_parallel() {
        let mut tables: Vec<VariableTable> = (0..16)
            .map(|i| {
                let mut table = VariableTable::new();
                table.insert_value("scale", i as f64);
                table.insert_expression("width", "scale * 10");
                table.insert_expression("area", "width ^ 2");
                table
            })
            .collect();

        let reports = evaluate_tables(&mut tables, &EvaluatorConfig::default());

        assert_eq!(reports.len(), 16);
        for (i, (report, table)) in reports.iter().zip(&tables).enumerate() {
            let width = i as f64 * 10.0;
            assert!(report.is_clean());
            assert_eq!(report.value("area"), Some(width * width));
            assert_eq!(table.value("width"), Some(width));
        }
    }

    #[test]
    fn test_empty_table() {
        let report = Evaluator::default().evaluate_all(&mut VariableTable::new());
        assert!(report.is_empty());
        assert!(report.is_clean());
    }
}
