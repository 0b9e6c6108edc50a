//! Filter predicates for resource queries.
//!
//! Filters map field names to an equality scalar or a membership set and
//! render to `field=eq.value` / `field=in.(a,b)` query parameters. Fields
//! live in a `BTreeMap`, so every rendering is canonical in field order
//! regardless of how the filter was built — the cache relies on this.

use std::collections::BTreeMap;

use serde_json::Value;

/// A single filter predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// Field equals the scalar.
    Eq(Value),
    /// Field is a member of the set.
    In(Vec<Value>),
}

/// Conjunction of per-field predicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: BTreeMap<String, FilterValue>,
}

impl Filter {
    /// Empty filter (matches everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality predicate.
    pub fn eq(mut self, field: impl Into<String>, value: Value) -> Self {
        self.fields.insert(field.into(), FilterValue::Eq(value));
        self
    }

    /// Add a membership predicate.
    pub fn is_in(mut self, field: impl Into<String>, values: Vec<Value>) -> Self {
        self.fields.insert(field.into(), FilterValue::In(values));
        self
    }

    /// Whether no predicates are set.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Render as HTTP query parameters, one per field, in canonical order.
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|(field, predicate)| (field.clone(), render_predicate(predicate)))
            .collect()
    }

    /// Canonical string form used for cache fingerprints.
    pub fn canonical(&self) -> String {
        self.fields
            .iter()
            .map(|(field, predicate)| format!("{}={}", field, render_predicate(predicate)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn render_predicate(predicate: &FilterValue) -> String {
    match predicate {
        FilterValue::Eq(value) => format!("eq.{}", render_scalar(value)),
        FilterValue::In(values) => {
            let rendered: Vec<String> = values.iter().map(render_scalar).collect();
            format!("in.({})", rendered.join(","))
        }
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_params_render_predicates() {
        let filter = Filter::new()
            .eq("status", json!("active"))
            .is_in("tier", vec![json!(1), json!(2)]);

        assert_eq!(
            filter.to_query_params(),
            vec![
                ("status".to_string(), "eq.active".to_string()),
                ("tier".to_string(), "in.(1,2)".to_string()),
            ]
        );
    }

    #[test]
    fn test_canonical_is_sorted_by_field() {
        let filter = Filter::new()
            .eq("zeta", json!(1))
            .eq("alpha", json!(2));

        assert_eq!(filter.canonical(), "alpha=eq.2&zeta=eq.1");
    }

    #[test]
    fn test_redefining_a_field_replaces_the_predicate() {
        let filter = Filter::new()
            .eq("id", json!(1))
            .eq("id", json!(2));

        assert_eq!(filter.canonical(), "id=eq.2");
    }

    #[test]
    fn test_empty_filter() {
        let filter = Filter::new();
        assert!(filter.is_empty());
        assert_eq!(filter.canonical(), "");
        assert!(filter.to_query_params().is_empty());
    }
}
