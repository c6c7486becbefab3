//! Query modifiers: the resolved form of a filter tree.
//!
//! A [`QueryModifier`] is the triple {predicate, joins, having}. Predicates are
//! [`Predicate::Empty`] or a concrete [`Criterion`]; `Empty` is the identity of
//! both conjunction and disjunction and negates to itself.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use ormkit_proto::Criterion;

/// A possibly empty boolean predicate.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Predicate {
    /// No constraint.
    #[default]
    Empty,
    /// A concrete criterion.
    Expr(Criterion),
}

impl Predicate {
    /// Check whether the predicate is empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, Predicate::Empty)
    }

    /// Borrow the criterion, if any.
    pub fn as_criterion(&self) -> Option<&Criterion> {
        match self {
            Predicate::Empty => None,
            Predicate::Expr(c) => Some(c),
        }
    }

    /// Take the criterion, if any.
    pub fn into_criterion(self) -> Option<Criterion> {
        match self {
            Predicate::Empty => None,
            Predicate::Expr(c) => Some(c),
        }
    }

    /// Conjoin, returning the other operand when one side is empty.
    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::Empty, rhs) => rhs,
            (lhs, Predicate::Empty) => lhs,
            (Predicate::Expr(l), Predicate::Expr(r)) => Predicate::Expr(l.and(r)),
        }
    }

    /// Disjoin, returning the other operand when one side is empty.
    pub fn or(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::Empty, rhs) => rhs,
            (lhs, Predicate::Empty) => lhs,
            (Predicate::Expr(l), Predicate::Expr(r)) => Predicate::Expr(l.or(r)),
        }
    }

    /// Negate. Empty stays empty.
    pub fn negate(self) -> Predicate {
        match self {
            Predicate::Empty => Predicate::Empty,
            Predicate::Expr(c) => Predicate::Expr(c.negate()),
        }
    }
}

impl From<Criterion> for Predicate {
    fn from(criterion: Criterion) -> Self {
        Predicate::Expr(criterion)
    }
}

impl From<Option<Criterion>> for Predicate {
    fn from(criterion: Option<Criterion>) -> Self {
        criterion.map_or(Predicate::Empty, Predicate::Expr)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Empty => Ok(()),
            Predicate::Expr(c) => write!(f, "{c}"),
        }
    }
}

/// A join onto `table` under `condition`.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// Joined table.
    pub table: String,
    /// Join condition.
    pub condition: Criterion,
}

impl Join {
    /// Create a join.
    pub fn new(table: impl Into<String>, condition: Criterion) -> Self {
        Self {
            table: table.into(),
            condition,
        }
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LEFT OUTER JOIN \"{}\" ON {}", self.table, self.condition)
    }
}

/// Resolved filter: a `WHERE` predicate, the joins it needs and a `HAVING`
/// predicate.
///
/// Joins keep their order and may repeat; deduplication belongs to the
/// statement builder.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryModifier {
    /// Row-level predicate.
    pub predicate: Predicate,
    /// Joins required by the predicates.
    pub joins: Vec<Join>,
    /// Group-level predicate.
    pub having: Predicate,
}

impl QueryModifier {
    /// Create an empty modifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a modifier holding only joins.
    pub fn from_joins(joins: Vec<Join>) -> Self {
        Self {
            joins,
            ..Self::default()
        }
    }

    /// Set the row-level predicate.
    pub fn with_predicate(mut self, criterion: Criterion) -> Self {
        self.predicate = Predicate::Expr(criterion);
        self
    }

    /// Set the group-level predicate.
    pub fn with_having(mut self, criterion: Criterion) -> Self {
        self.having = Predicate::Expr(criterion);
        self
    }

    /// Append a join.
    pub fn with_join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Check whether neither predicate constrains anything.
    pub fn is_empty(&self) -> bool {
        self.predicate.is_empty() && self.having.is_empty()
    }

    /// Conjoin two modifiers.
    pub fn and(mut self, other: QueryModifier) -> QueryModifier {
        self.joins.extend(other.joins);
        QueryModifier {
            predicate: self.predicate.and(other.predicate),
            joins: self.joins,
            having: self.having.and(other.having),
        }
    }

    /// Disjoin two modifiers.
    ///
    /// When either side carries a having-predicate, both sides are folded
    /// into a single having-predicate and the row-level predicate is empty.
    pub fn or(mut self, other: QueryModifier) -> QueryModifier {
        self.joins.extend(other.joins);
        if self.having.is_empty() && other.having.is_empty() {
            return QueryModifier {
                predicate: self.predicate.or(other.predicate),
                joins: self.joins,
                having: Predicate::Empty,
            };
        }
        let lhs = self.predicate.and(self.having);
        let rhs = other.predicate.and(other.having);
        QueryModifier {
            predicate: Predicate::Empty,
            joins: self.joins,
            having: lhs.or(rhs),
        }
    }

    /// Negate the modifier. Joins are kept.
    pub fn negate(self) -> QueryModifier {
        if self.is_empty() {
            return self;
        }
        if self.having.is_empty() {
            return QueryModifier {
                predicate: self.predicate.negate(),
                joins: self.joins,
                having: Predicate::Empty,
            };
        }
        QueryModifier {
            predicate: Predicate::Empty,
            joins: self.joins,
            having: self.predicate.and(self.having).negate(),
        }
    }
}

impl BitAnd for QueryModifier {
    type Output = QueryModifier;

    fn bitand(self, rhs: QueryModifier) -> QueryModifier {
        self.and(rhs)
    }
}

impl BitOr for QueryModifier {
    type Output = QueryModifier;

    fn bitor(self, rhs: QueryModifier) -> QueryModifier {
        self.or(rhs)
    }
}

impl Not for QueryModifier {
    type Output = QueryModifier;

    fn not(self) -> QueryModifier {
        self.negate()
    }
}
