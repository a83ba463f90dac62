//! Mutation criteria and the normalization exposed to callbacks.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The filter describing which records a mutation targets.
///
/// Held exactly as the caller supplied it; `Null` stands for "no criteria".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Criteria(Value);

impl Criteria {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    /// Criteria that were never supplied.
    pub fn none() -> Self {
        Self(Value::Null)
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }

    pub fn is_none(&self) -> bool {
        self.0.is_null()
    }

    /// The `where` clause, if it is a non-empty object or array.
    ///
    /// `{}`, `{"where": {}}`, a missing `where`, a scalar `where` and absent
    /// criteria all collapse to `None`.
    pub fn where_clause(&self) -> Option<&Value> {
        let clause = self.0.as_object()?.get("where")?;
        let non_empty = match clause {
            Value::Object(map) => !map.is_empty(),
            Value::Array(items) => !items.is_empty(),
            _ => false,
        };
        non_empty.then_some(clause)
    }
}

impl From<Value> for Criteria {
    fn from(raw: Value) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_shapes_normalize_to_none() {
        assert_eq!(Criteria::none().where_clause(), None);
        assert_eq!(Criteria::new(json!({})).where_clause(), None);
        assert_eq!(Criteria::new(json!({"where": {}})).where_clause(), None);
        assert_eq!(Criteria::new(json!({"where": []})).where_clause(), None);
        assert_eq!(Criteria::new(json!({"where": null})).where_clause(), None);
        assert_eq!(Criteria::new(json!({"where": 5})).where_clause(), None);
        assert_eq!(Criteria::new(json!({"where": "id"})).where_clause(), None);
        assert_eq!(Criteria::new(json!("id = 5")).where_clause(), None);
    }

    #[test]
    fn non_empty_where_is_exposed() {
        let criteria = Criteria::new(json!({"where": {"id": 5}, "limit": 1}));
        assert_eq!(criteria.where_clause(), Some(&json!({"id": 5})));

        let criteria = Criteria::new(json!({"where": [{"id": 1}, {"id": 2}]}));
        assert_eq!(criteria.where_clause(), Some(&json!([{"id": 1}, {"id": 2}])));
    }

    #[test]
    fn raw_criteria_are_kept_verbatim() {
        let raw = json!({"where": {}, "sort": "name"});
        let criteria = Criteria::from(raw.clone());
        assert_eq!(criteria.raw(), &raw);
        assert!(!criteria.is_none());
    }
}
