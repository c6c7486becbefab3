//! Predicate IR consumed by the SQL assembly stage.
//!
//! A [`Criterion`] is a boolean expression over [`Term`]s. Criteria are
//! immutable trees; combinators consume their operands and return a new tree.
//! Rendering through [`fmt::Display`] produces SQL text with inline literals.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A (possibly table-qualified) column reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    /// Table the column belongs to, if qualified.
    pub table: Option<String>,
    /// Column name.
    pub name: String,
}

impl Column {
    /// Create a table-qualified column.
    pub fn new(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    /// Create an unqualified column.
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: name.into(),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "\"{}\".\"{}\"", table, self.name),
            None => write!(f, "\"{}\"", self.name),
        }
    }
}

/// Aggregate function types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateFunction {
    /// Count of rows/values.
    Count,
    /// Sum of numeric values.
    Sum,
    /// Average of numeric values.
    Avg,
    /// Minimum value.
    Min,
    /// Maximum value.
    Max,
}

impl AggregateFunction {
    /// SQL function name.
    pub fn sql_name(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
        }
    }
}

/// An operand of a predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Term {
    /// A column reference.
    Column(Column),
    /// A literal value.
    Value(Value),
    /// An aggregate over a term (`None` means `*`).
    Aggregate {
        /// The aggregate function.
        function: AggregateFunction,
        /// The aggregated term.
        argument: Option<Box<Term>>,
        /// Whether `DISTINCT` applies.
        distinct: bool,
    },
    /// `UPPER(term)`, used by case-insensitive comparisons.
    Upper(Box<Term>),
}

/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    /// SQL operator symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

impl Term {
    /// Create a table-qualified column term.
    pub fn column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Term::Column(Column::new(table, name))
    }

    /// Create an aggregate term.
    pub fn aggregate(function: AggregateFunction, argument: Option<Term>, distinct: bool) -> Self {
        Term::Aggregate {
            function,
            argument: argument.map(Box::new),
            distinct,
        }
    }

    /// Wrap the term in `UPPER(...)`.
    pub fn upper(self) -> Self {
        Term::Upper(Box::new(self))
    }

    /// Check whether evaluating this term requires grouping.
    pub fn is_aggregate(&self) -> bool {
        match self {
            Term::Aggregate { .. } => true,
            Term::Upper(inner) => inner.is_aggregate(),
            Term::Column(_) | Term::Value(_) => false,
        }
    }

    /// Build `self <op> value`.
    pub fn compare(self, op: CompareOp, value: impl Into<Value>) -> Criterion {
        Criterion::Compare {
            left: self,
            op,
            right: Term::Value(value.into()),
        }
    }

    /// Build `self = value`.
    pub fn eq(self, value: impl Into<Value>) -> Criterion {
        self.compare(CompareOp::Eq, value)
    }

    /// Build `self <> value`.
    pub fn ne(self, value: impl Into<Value>) -> Criterion {
        self.compare(CompareOp::Ne, value)
    }

    /// Build `self = other` between two terms (join conditions).
    pub fn eq_term(self, other: Term) -> Criterion {
        Criterion::Compare {
            left: self,
            op: CompareOp::Eq,
            right: other,
        }
    }

    /// Build `self IN (values)`.
    pub fn is_in(self, values: Vec<Value>) -> Criterion {
        Criterion::In {
            term: self,
            values,
            negated: false,
        }
    }

    /// Build `self NOT IN (values)`.
    pub fn not_in(self, values: Vec<Value>) -> Criterion {
        Criterion::In {
            term: self,
            values,
            negated: true,
        }
    }

    /// Build `self BETWEEN low AND high`.
    pub fn between(self, low: impl Into<Value>, high: impl Into<Value>) -> Criterion {
        Criterion::Between {
            term: self,
            low: low.into(),
            high: high.into(),
        }
    }

    /// Build `self IS NULL`.
    pub fn is_null(self) -> Criterion {
        Criterion::IsNull {
            term: self,
            negated: false,
        }
    }

    /// Build `self IS NOT NULL`.
    pub fn not_null(self) -> Criterion {
        Criterion::IsNull {
            term: self,
            negated: true,
        }
    }

    /// Build `self LIKE pattern ESCAPE '\'`.
    pub fn like(self, pattern: Term) -> Criterion {
        Criterion::Like {
            term: self,
            pattern,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Column(column) => write!(f, "{column}"),
            Term::Value(value) => write!(f, "{value}"),
            Term::Aggregate {
                function,
                argument,
                distinct,
            } => {
                write!(f, "{}(", function.sql_name())?;
                if *distinct {
                    write!(f, "DISTINCT ")?;
                }
                match argument {
                    Some(arg) => write!(f, "{arg})"),
                    None => write!(f, "*)"),
                }
            }
            Term::Upper(inner) => write!(f, "UPPER({inner})"),
        }
    }
}

/// A boolean expression usable in `WHERE`, `HAVING` and join conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Criterion {
    /// Binary comparison.
    Compare {
        /// Left operand.
        left: Term,
        /// Operator.
        op: CompareOp,
        /// Right operand.
        right: Term,
    },
    /// Set membership.
    In {
        /// Tested term.
        term: Term,
        /// Candidate values.
        values: Vec<Value>,
        /// `NOT IN` when set.
        negated: bool,
    },
    /// Inclusive range test.
    Between {
        /// Tested term.
        term: Term,
        /// Lower bound.
        low: Value,
        /// Upper bound.
        high: Value,
    },
    /// Null test.
    IsNull {
        /// Tested term.
        term: Term,
        /// `IS NOT NULL` when set.
        negated: bool,
    },
    /// Pattern match with `\` as the escape character.
    Like {
        /// Tested term.
        term: Term,
        /// Pattern operand.
        pattern: Term,
    },
    /// Constant truth value.
    Literal(bool),
    /// Conjunction.
    And(Box<Criterion>, Box<Criterion>),
    /// Disjunction.
    Or(Box<Criterion>, Box<Criterion>),
    /// Negation.
    Not(Box<Criterion>),
}

impl Criterion {
    /// Conjoin two criteria.
    pub fn and(self, other: Criterion) -> Criterion {
        Criterion::And(Box::new(self), Box::new(other))
    }

    /// Disjoin two criteria.
    pub fn or(self, other: Criterion) -> Criterion {
        Criterion::Or(Box::new(self), Box::new(other))
    }

    /// Negate the criterion.
    pub fn negate(self) -> Criterion {
        Criterion::Not(Box::new(self))
    }

    /// Check whether any operand is an aggregate.
    pub fn has_aggregate(&self) -> bool {
        match self {
            Criterion::Compare { left, right, .. } => left.is_aggregate() || right.is_aggregate(),
            Criterion::In { term, .. }
            | Criterion::Between { term, .. }
            | Criterion::IsNull { term, .. } => term.is_aggregate(),
            Criterion::Like { term, pattern } => term.is_aggregate() || pattern.is_aggregate(),
            Criterion::Literal(_) => false,
            Criterion::And(l, r) | Criterion::Or(l, r) => l.has_aggregate() || r.has_aggregate(),
            Criterion::Not(inner) => inner.has_aggregate(),
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parent_is_and: bool) -> fmt::Result {
        let needs_parens = match self {
            Criterion::And(..) => !parent_is_and,
            Criterion::Or(..) => parent_is_and,
            _ => false,
        };
        if needs_parens {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::Compare { left, op, right } => {
                write!(f, "{} {} {}", left, op.symbol(), right)
            }
            Criterion::In {
                term,
                values,
                negated,
            } => {
                let keyword = if *negated { "NOT IN" } else { "IN" };
                write!(f, "{term} {keyword} {}", Value::List(values.clone()))
            }
            Criterion::Between { term, low, high } => {
                write!(f, "{term} BETWEEN {low} AND {high}")
            }
            Criterion::IsNull { term, negated } => {
                if *negated {
                    write!(f, "{term} IS NOT NULL")
                } else {
                    write!(f, "{term} IS NULL")
                }
            }
            Criterion::Like { term, pattern } => write!(f, "{term} LIKE {pattern} ESCAPE '\\'"),
            Criterion::Literal(true) => write!(f, "1=1"),
            Criterion::Literal(false) => write!(f, "1=0"),
            Criterion::And(l, r) => {
                l.fmt_operand(f, true)?;
                write!(f, " AND ")?;
                r.fmt_operand(f, true)
            }
            Criterion::Or(l, r) => {
                l.fmt_operand(f, false)?;
                write!(f, " OR ")?;
                r.fmt_operand(f, false)
            }
            Criterion::Not(inner) => write!(f, "NOT ({inner})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_rendering() {
        let c = Term::column("author", "name").eq("x");
        assert_eq!(c.to_string(), "\"author\".\"name\" = 'x'");

        let c = Term::column("author", "age").compare(CompareOp::Ge, 18i64);
        assert_eq!(c.to_string(), "\"author\".\"age\" >= 18");
    }

    #[test]
    fn test_boolean_rendering() {
        let a = Term::column("t", "a").eq(1i64);
        let b = Term::column("t", "b").eq(2i64);
        let c = Term::column("t", "c").eq(3i64);

        let and_or = a.clone().and(b.clone().or(c.clone()));
        assert_eq!(
            and_or.to_string(),
            "\"t\".\"a\" = 1 AND (\"t\".\"b\" = 2 OR \"t\".\"c\" = 3)"
        );

        let or_and = a.clone().or(b.clone().and(c));
        assert_eq!(
            or_and.to_string(),
            "\"t\".\"a\" = 1 OR (\"t\".\"b\" = 2 AND \"t\".\"c\" = 3)"
        );

        assert_eq!(a.negate().to_string(), "NOT (\"t\".\"a\" = 1)");
    }

    #[test]
    fn test_set_and_null_rendering() {
        let c = Term::column("t", "id").is_in(vec![1i64.into(), 2i64.into()]);
        assert_eq!(c.to_string(), "\"t\".\"id\" IN (1,2)");

        let c = Term::column("t", "id").not_in(vec![3i64.into()]);
        assert_eq!(c.to_string(), "\"t\".\"id\" NOT IN (3)");

        assert_eq!(
            Term::column("t", "x").not_null().to_string(),
            "\"t\".\"x\" IS NOT NULL"
        );
        assert_eq!(
            Term::column("t", "x").between(1i64, 5i64).to_string(),
            "\"t\".\"x\" BETWEEN 1 AND 5"
        );
    }

    #[test]
    fn test_like_and_upper() {
        let c = Term::column("t", "title")
            .upper()
            .like(Term::Value(Value::from("%RUST%")).upper());
        assert_eq!(
            c.to_string(),
            "UPPER(\"t\".\"title\") LIKE UPPER('%RUST%') ESCAPE '\\'"
        );
    }

    #[test]
    fn test_aggregate_detection() {
        let count = Term::aggregate(
            AggregateFunction::Count,
            Some(Term::column("book", "id")),
            true,
        );
        assert!(count.is_aggregate());
        assert_eq!(count.to_string(), "COUNT(DISTINCT \"book\".\"id\")");

        let c = count.compare(CompareOp::Gt, 2i64);
        assert!(c.has_aggregate());
        assert!(!Term::column("t", "a").eq(1i64).has_aggregate());
    }
}
