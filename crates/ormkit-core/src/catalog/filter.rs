//! Filter registry entries.

use crate::query::Lookup;

/// How a filter key is evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterInfo {
    /// Field or relation name the key refers to.
    pub field: String,
    /// Column compared by the filter.
    pub column: String,
    /// Comparison operator.
    pub lookup: Lookup,
    /// Table to join before comparing, for relational filters.
    pub join: Option<FilterJoin>,
}

/// Join required by a relational filter.
///
/// The joined table is matched on `table.backward_key = model.pk`, and the
/// filter compares `table.column`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterJoin {
    /// Joined table.
    pub table: String,
    /// Column of the joined table pointing back at the model.
    pub backward_key: String,
}

impl FilterInfo {
    /// Check whether the filter needs a join.
    pub fn is_relational(&self) -> bool {
        self.join.is_some()
    }

    /// Table holding the compared column.
    pub fn table<'a>(&'a self, model_table: &'a str) -> &'a str {
        self.join.as_ref().map_or(model_table, |j| j.table.as_str())
    }
}
