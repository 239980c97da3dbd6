use std::collections::hash_map::Iter;
use std::collections::HashMap;

/// State of one named variable.
///
/// `Unevaluated` holds the raw expression text; `Evaluated` holds a value that
/// was either supplied directly or cached by the evaluator after resolving the
/// expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Unevaluated(String),
    Evaluated(f64),
}

impl Slot {
    pub fn value(&self) -> Option<f64> {
        match self {
            Slot::Evaluated(value) => Some(*value),
            Slot::Unevaluated(_) => None,
        }
    }

    pub fn expression(&self) -> Option<&str> {
        match self {
            Slot::Unevaluated(expression) => Some(expression),
            Slot::Evaluated(_) => None,
        }
    }
}

impl From<f64> for Slot {
    fn from(value: f64) -> Self {
        Slot::Evaluated(value)
    }
}

impl From<&str> for Slot {
    fn from(expression: &str) -> Self {
        Slot::Unevaluated(expression.to_string())
    }
}

impl From<String> for Slot {
    fn from(expression: String) -> Self {
        Slot::Unevaluated(expression)
    }
}

/// Name to slot mapping handed to the evaluator.
///
/// The evaluator rewrites `Unevaluated` slots to `Evaluated` once they resolve
/// successfully; it never turns a value back into an expression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableTable {
    slots: HashMap<String, Slot>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a slot, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, slot: impl Into<Slot>) -> Option<Slot> {
        self.slots.insert(name.into(), slot.into())
    }

    pub fn insert_expression(
        &mut self,
        name: impl Into<String>,
        expression: impl Into<String>,
    ) -> Option<Slot> {
        self.insert(name, Slot::Unevaluated(expression.into()))
    }

    pub fn insert_value(&mut self, name: impl Into<String>, value: f64) -> Option<Slot> {
        self.insert(name, Slot::Evaluated(value))
    }

    pub fn get(&self, name: &str) -> Option<&Slot> {
        self.slots.get(name)
    }

    /// The cached value of `name`, if it has been evaluated.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Slot::value)
    }

    pub fn remove(&mut self, name: &str) -> Option<Slot> {
        self.slots.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, String, Slot> {
        self.slots.iter()
    }

    /// Variable names in ascending order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.slots.keys().cloned().collect();
        names.sort();
        names
    }

    /// Records a resolved value. Only called by the evaluator after a successful
    /// resolution of an `Unevaluated` slot.
    pub(crate) fn memoize(&mut self, name: &str, value: f64) {
        if let Some(slot) = self.slots.get_mut(name) {
            *slot = Slot::Evaluated(value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for VariableTable
where
    K: Into<String>,
    V: Into<Slot>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            slots: iter
                .into_iter()
                .map(|(name, slot)| (name.into(), slot.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a VariableTable {
    type Item = (&'a String, &'a Slot);
    type IntoIter = Iter<'a, String, Slot>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}
