//! Filter expression nodes.
//!
//! A [`Q`] is an immutable boolean tree. Leaves are keyword constraints such as
//! `("name", "x")` or `("age__gte", 18)`; inner nodes combine children with a
//! [`JoinType`]. Negation is a deferred flag applied at resolution time.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};
use std::str::FromStr;

use ormkit_proto::Value;

use crate::error::Error;

const INVALID_CHILDREN: &str = "All ordered arguments must be Q nodes";
const INVALID_JOIN_TYPE: &str = "join_type must be AND or OR";

/// How the children of a node combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JoinType {
    #[default]
    And,
    Or,
}

impl JoinType {
    /// SQL keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinType::And => "AND",
            JoinType::Or => "OR",
        }
    }
}

impl FromStr for JoinType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AND" => Ok(JoinType::And),
            "OR" => Ok(JoinType::Or),
            _ => Err(Error::Validation(INVALID_JOIN_TYPE.to_string())),
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of a filter constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// A literal value.
    Value(Value),
    /// A model instance, compared by its primary key.
    Instance {
        /// Model name of the instance.
        model: String,
        /// Primary-key value.
        pk: Value,
    },
}

impl FilterValue {
    /// Reference a model instance by primary key.
    pub fn instance(model: impl Into<String>, pk: impl Into<Value>) -> Self {
        FilterValue::Instance {
            model: model.into(),
            pk: pk.into(),
        }
    }

    /// The value used in comparisons. Instances yield their primary key.
    pub fn identity(&self) -> &Value {
        match self {
            FilterValue::Value(v) => v,
            FilterValue::Instance { pk, .. } => pk,
        }
    }

    fn from_json(json: &serde_json::Value) -> Result<Self, Error> {
        match json {
            serde_json::Value::Object(map) => match (map.get("model"), map.get("pk")) {
                (Some(serde_json::Value::String(model)), Some(pk)) => Ok(FilterValue::Instance {
                    model: model.clone(),
                    pk: Value::from_json(pk)?,
                }),
                _ => Err(Error::Operational(format!(
                    "filter value objects must carry model and pk: {json}"
                ))),
            },
            other => Ok(FilterValue::Value(Value::from_json(other)?)),
        }
    }
}

impl From<Value> for FilterValue {
    fn from(v: Value) -> Self {
        FilterValue::Value(v)
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        FilterValue::Value(v.into())
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        FilterValue::Value(v.into())
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Value(v.into())
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        FilterValue::Value(v.into())
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Value(v.into())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Value(v.into())
    }
}

impl<T: Into<Value>> From<Vec<T>> for FilterValue {
    fn from(v: Vec<T>) -> Self {
        FilterValue::Value(v.into())
    }
}

impl<T: Into<Value>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        FilterValue::Value(v.into())
    }
}

/// A filter expression node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Q {
    pub(crate) children: Vec<Q>,
    pub(crate) filters: Vec<(String, FilterValue)>,
    pub(crate) join_type: JoinType,
    pub(crate) negated: bool,
    /// The first child holds this node's own constraints.
    pub(crate) wraps_filters: bool,
}

impl Q {
    /// Create a node from children and keyword constraints.
    ///
    /// When both are given, the constraints are wrapped into their own child
    /// node (same join type) placed before the explicit children.
    pub fn new(
        children: Vec<Q>,
        join_type: JoinType,
        filters: Vec<(String, FilterValue)>,
    ) -> Self {
        let mut children = children;
        let mut filters = filters;
        if !children.is_empty() && !filters.is_empty() {
            let leaf = Q {
                children: Vec::new(),
                filters: std::mem::take(&mut filters),
                join_type,
                negated: false,
                wraps_filters: false,
            };
            children.insert(0, leaf);
            return Self {
                children,
                filters,
                join_type,
                negated: false,
                wraps_filters: true,
            };
        }
        Self {
            children,
            filters,
            join_type,
            negated: false,
            wraps_filters: false,
        }
    }

    /// Create a leaf with one constraint.
    pub fn filter(key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self {
            filters: vec![(key.into(), value.into())],
            ..Self::default()
        }
    }

    /// Add another constraint.
    ///
    /// On a node with children the constraint goes into the leading child
    /// that holds the node's own constraints, created on first use.
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        let entry = (key.into(), value.into());
        if self.wraps_filters {
            self.children[0].filters.push(entry);
        } else if self.children.is_empty() {
            self.filters.push(entry);
        } else {
            let leaf = Q {
                filters: vec![entry],
                join_type: self.join_type,
                ..Q::default()
            };
            self.children.insert(0, leaf);
            self.wraps_filters = true;
        }
        self
    }

    /// Set the join type, including that of the wrapped constraint child.
    pub fn with_join_type(mut self, join_type: JoinType) -> Self {
        self.join_type = join_type;
        if self.wraps_filters {
            self.children[0].join_type = join_type;
        }
        self
    }

    /// Conjunction of `children`.
    pub fn all(children: Vec<Q>) -> Self {
        Self::new(children, JoinType::And, Vec::new())
    }

    /// Disjunction of `children`.
    pub fn any(children: Vec<Q>) -> Self {
        Self::new(children, JoinType::Or, Vec::new())
    }

    /// Combine with AND.
    pub fn and(self, other: Q) -> Q {
        Self::all(vec![self, other])
    }

    /// Combine with OR.
    pub fn or(self, other: Q) -> Q {
        Self::any(vec![self, other])
    }

    /// Toggle negation.
    pub fn negate(mut self) -> Q {
        self.negated = !self.negated;
        self
    }

    /// Child nodes, the wrapped constraint child first if there is one.
    pub fn children(&self) -> &[Q] {
        &self.children
    }

    /// Constraints held directly by a leaf.
    pub fn filters(&self) -> &[(String, FilterValue)] {
        &self.filters
    }

    /// How children or constraints combine.
    pub fn join_type(&self) -> JoinType {
        self.join_type
    }

    /// Whether negation is applied when the node resolves.
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Build a node from a JSON document.
    ///
    /// The document is an object with optional `children` (array of node
    /// objects), `filters` (object of key to value), `join_type` (`"AND"` or
    /// `"OR"`) and `negated` (bool). Instance values are written as
    /// `{"model": ..., "pk": ...}`. Filters keep their document order.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, Error> {
        let serde_json::Value::Object(map) = json else {
            return Err(Error::Validation(INVALID_CHILDREN.to_string()));
        };

        let join_type = match map.get("join_type") {
            None => JoinType::And,
            Some(serde_json::Value::String(s)) => s.parse()?,
            Some(_) => return Err(Error::Validation(INVALID_JOIN_TYPE.to_string())),
        };

        let children = match map.get("children") {
            None => Vec::new(),
            Some(serde_json::Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    serde_json::Value::Object(_) => Q::from_json(item),
                    _ => Err(Error::Validation(INVALID_CHILDREN.to_string())),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(Error::Validation(INVALID_CHILDREN.to_string())),
        };

        let filters = match map.get("filters") {
            None => Vec::new(),
            Some(serde_json::Value::Object(entries)) => entries
                .iter()
                .map(|(key, value)| Ok((key.clone(), FilterValue::from_json(value)?)))
                .collect::<Result<Vec<_>, Error>>()?,
            Some(other) => {
                return Err(Error::Operational(format!(
                    "filters must be an object, got {other}"
                )))
            }
        };

        let negated = map
            .get("negated")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);

        let mut node = Q::new(children, join_type, filters);
        node.negated = negated;
        Ok(node)
    }

    /// Parse a node from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, Error> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        Self::from_json(&json)
    }
}

impl BitAnd for Q {
    type Output = Q;

    fn bitand(self, rhs: Q) -> Q {
        self.and(rhs)
    }
}

impl BitOr for Q {
    type Output = Q;

    fn bitor(self, rhs: Q) -> Q {
        self.or(rhs)
    }
}

impl Not for Q {
    type Output = Q;

    fn not(self) -> Q {
        self.negate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_construction_wraps_filters() {
        let child = Q::filter("age__gte", 18i64);
        let q = Q::new(
            vec![child.clone()],
            JoinType::Or,
            vec![("name".into(), "x".into())],
        );

        assert!(q.filters().is_empty());
        assert_eq!(q.children().len(), 2);
        assert_eq!(q.children()[0].filters()[0].0, "name");
        assert_eq!(q.children()[0].join_type(), JoinType::Or);
        assert_eq!(q.children()[1], child);
    }

    #[test]
    fn test_with_filter_on_inner_node_wraps_constraint() {
        let q = (Q::filter("name", "a") & Q::filter("age", 1i64)).with_filter("id", 7i64);
        assert!(q.filters().is_empty());
        assert_eq!(q.children().len(), 3);
        assert_eq!(q.children()[0].filters()[0].0, "id");
        assert_eq!(q.children()[1].filters()[0].0, "name");

        let q = q.with_filter("title", "x");
        assert_eq!(q.children().len(), 3);
        assert_eq!(q.children()[0].filters().len(), 2);
    }

    #[test]
    fn test_join_type_reaches_wrapped_constraints() {
        let q = Q::new(
            vec![Q::filter("age__gte", 18i64)],
            JoinType::And,
            vec![("name".into(), "x".into()), ("id".into(), 1i64.into())],
        )
        .with_join_type(JoinType::Or);

        assert_eq!(q.join_type(), JoinType::Or);
        assert_eq!(q.children()[0].join_type(), JoinType::Or);
        assert_eq!(q.children()[1].join_type(), JoinType::And);
    }

    #[test]
    fn test_operators() {
        let q = Q::filter("a", 1i64) & Q::filter("b", 2i64);
        assert_eq!(q.join_type(), JoinType::And);
        assert_eq!(q.children().len(), 2);

        let q = Q::filter("a", 1i64) | Q::filter("b", 2i64);
        assert_eq!(q.join_type(), JoinType::Or);

        let q = !Q::filter("a", 1i64);
        assert!(q.is_negated());
        assert!(!(!q).is_negated());
    }

    #[test]
    fn test_join_type_parse() {
        assert_eq!("AND".parse::<JoinType>().unwrap(), JoinType::And);
        assert_eq!("OR".parse::<JoinType>().unwrap(), JoinType::Or);
        let err = "XOR".parse::<JoinType>().unwrap_err();
        assert_eq!(err.to_string(), "join_type must be AND or OR");
    }

    #[test]
    fn test_instance_identity() {
        let v = FilterValue::instance("Author", 7i64);
        assert_eq!(v.identity(), &Value::Int64(7));
        let v: FilterValue = "x".into();
        assert_eq!(v.identity(), &Value::from("x"));
    }

    #[test]
    fn test_from_json() {
        let q = Q::from_json_str(
            r#"{
                "join_type": "OR",
                "negated": true,
                "children": [
                    {"filters": {"name": "x"}},
                    {"filters": {"author": {"model": "Author", "pk": 3}}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(q.join_type(), JoinType::Or);
        assert!(q.is_negated());
        assert_eq!(q.children().len(), 2);
        assert_eq!(
            q.children()[1].filters()[0].1,
            FilterValue::instance("Author", 3i64)
        );
    }

    #[test]
    fn test_from_json_validation() {
        let err = Q::from_json(&serde_json::json!({"children": [1]})).unwrap_err();
        assert_eq!(err.to_string(), "All ordered arguments must be Q nodes");

        let err = Q::from_json(&serde_json::json!({"join_type": "XOR"})).unwrap_err();
        assert_eq!(err.to_string(), "join_type must be AND or OR");

        let err = Q::from_json(&serde_json::json!({"filters": {"a": {"x": 1}}})).unwrap_err();
        assert!(matches!(err, Error::Operational(_)));
    }
}
