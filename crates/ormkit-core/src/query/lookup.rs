//! Comparison operators addressed by filter key suffixes.

use ormkit_proto::{CompareOp, Criterion, Term, Value};

use crate::error::Error;

/// A comparison operator, selected by the `__<op>` suffix of a filter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lookup {
    Exact,
    Not,
    In,
    NotIn,
    Gt,
    Gte,
    Lt,
    Lte,
    Range,
    IsNull,
    NotIsNull,
    Contains,
    IContains,
    StartsWith,
    IStartsWith,
    EndsWith,
    IEndsWith,
    IExact,
}

impl Lookup {
    /// Every operator, in registration order.
    pub const ALL: [Lookup; 18] = [
        Lookup::Exact,
        Lookup::Not,
        Lookup::In,
        Lookup::NotIn,
        Lookup::Gt,
        Lookup::Gte,
        Lookup::Lt,
        Lookup::Lte,
        Lookup::Range,
        Lookup::IsNull,
        Lookup::NotIsNull,
        Lookup::Contains,
        Lookup::IContains,
        Lookup::StartsWith,
        Lookup::IStartsWith,
        Lookup::EndsWith,
        Lookup::IEndsWith,
        Lookup::IExact,
    ];

    /// Key suffix for this operator. Empty for [`Lookup::Exact`].
    pub fn suffix(&self) -> &'static str {
        match self {
            Lookup::Exact => "",
            Lookup::Not => "not",
            Lookup::In => "in",
            Lookup::NotIn => "not_in",
            Lookup::Gt => "gt",
            Lookup::Gte => "gte",
            Lookup::Lt => "lt",
            Lookup::Lte => "lte",
            Lookup::Range => "range",
            Lookup::IsNull => "isnull",
            Lookup::NotIsNull => "not_isnull",
            Lookup::Contains => "contains",
            Lookup::IContains => "icontains",
            Lookup::StartsWith => "startswith",
            Lookup::IStartsWith => "istartswith",
            Lookup::EndsWith => "endswith",
            Lookup::IEndsWith => "iendswith",
            Lookup::IExact => "iexact",
        }
    }

    /// Parse a key suffix (without the `__`).
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        if suffix.is_empty() {
            return None;
        }
        Self::ALL.iter().copied().find(|l| l.suffix() == suffix)
    }

    /// Full filter key for `base` with this operator.
    pub fn key(&self, base: &str) -> String {
        match self {
            Lookup::Exact => base.to_string(),
            other => format!("{base}__{}", other.suffix()),
        }
    }

    /// Build the criterion comparing `term` with `value`.
    pub fn apply(&self, term: Term, value: &Value) -> Result<Criterion, Error> {
        let criterion = match self {
            Lookup::Exact if value.is_null() => term.is_null(),
            Lookup::Exact => term.eq(value.clone()),
            Lookup::Not if value.is_null() => term.not_null(),
            Lookup::Not => term.clone().ne(value.clone()).or(term.is_null()),
            Lookup::In => {
                let values = self.list(value)?;
                if values.is_empty() {
                    Criterion::Literal(false)
                } else {
                    term.is_in(values.to_vec())
                }
            }
            Lookup::NotIn => {
                let values = self.list(value)?;
                if values.is_empty() {
                    Criterion::Literal(true)
                } else {
                    term.clone().not_in(values.to_vec()).or(term.is_null())
                }
            }
            Lookup::Gt => term.compare(CompareOp::Gt, value.clone()),
            Lookup::Gte => term.compare(CompareOp::Ge, value.clone()),
            Lookup::Lt => term.compare(CompareOp::Lt, value.clone()),
            Lookup::Lte => term.compare(CompareOp::Le, value.clone()),
            Lookup::Range => match self.list(value)? {
                [low, high] => term.between(low.clone(), high.clone()),
                other => {
                    return Err(Error::Operational(format!(
                        "range filter expects two bounds, got {}",
                        other.len()
                    )))
                }
            },
            Lookup::IsNull => {
                if self.flag(value)? {
                    term.is_null()
                } else {
                    term.not_null()
                }
            }
            Lookup::NotIsNull => {
                if self.flag(value)? {
                    term.not_null()
                } else {
                    term.is_null()
                }
            }
            Lookup::Contains => term.like(pattern(value, "%", "%")),
            Lookup::StartsWith => term.like(pattern(value, "", "%")),
            Lookup::EndsWith => term.like(pattern(value, "%", "")),
            Lookup::IContains => term.upper().like(pattern(value, "%", "%").upper()),
            Lookup::IStartsWith => term.upper().like(pattern(value, "", "%").upper()),
            Lookup::IEndsWith => term.upper().like(pattern(value, "%", "").upper()),
            Lookup::IExact => term.upper().eq_term(Term::Value(value.clone()).upper()),
        };
        Ok(criterion)
    }

    fn list<'v>(&self, value: &'v Value) -> Result<&'v [Value], Error> {
        value.as_list().ok_or_else(|| {
            Error::Operational(format!(
                "{} filter expects a list, got {}",
                self.suffix(),
                value.type_name()
            ))
        })
    }

    fn flag(&self, value: &Value) -> Result<bool, Error> {
        value.as_bool().ok_or_else(|| {
            Error::Operational(format!(
                "{} filter expects a bool, got {}",
                self.suffix(),
                value.type_name()
            ))
        })
    }
}

/// Escape `LIKE` metacharacters with `\`.
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn pattern(value: &Value, prefix: &str, suffix: &str) -> Term {
    let body = escape_like(&value.to_plain_string());
    Term::Value(Value::String(format!("{prefix}{body}{suffix}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col() -> Term {
        Term::column("t", "name")
    }

    #[test]
    fn test_suffix_parsing() {
        assert_eq!(Lookup::from_suffix("gte"), Some(Lookup::Gte));
        assert_eq!(Lookup::from_suffix("not_isnull"), Some(Lookup::NotIsNull));
        assert_eq!(Lookup::from_suffix(""), None);
        assert_eq!(Lookup::from_suffix("name"), None);
        assert_eq!(Lookup::In.key("id"), "id__in");
        assert_eq!(Lookup::Exact.key("id"), "id");
    }

    #[test]
    fn test_exact_and_not() {
        let c = Lookup::Exact.apply(col(), &Value::from("x")).unwrap();
        assert_eq!(c.to_string(), "\"t\".\"name\" = 'x'");

        let c = Lookup::Not.apply(col(), &Value::from("x")).unwrap();
        assert_eq!(
            c.to_string(),
            "\"t\".\"name\" <> 'x' OR \"t\".\"name\" IS NULL"
        );

        let c = Lookup::Exact.apply(col(), &Value::Null).unwrap();
        assert_eq!(c.to_string(), "\"t\".\"name\" IS NULL");
    }

    #[test]
    fn test_empty_membership() {
        let empty = Value::List(vec![]);
        assert_eq!(
            Lookup::In.apply(col(), &empty).unwrap(),
            Criterion::Literal(false)
        );
        assert_eq!(
            Lookup::NotIn.apply(col(), &empty).unwrap(),
            Criterion::Literal(true)
        );
    }

    #[test]
    fn test_range_shape() {
        let c = Lookup::Range
            .apply(Term::column("t", "age"), &Value::from(vec![1i64, 9]))
            .unwrap();
        assert_eq!(c.to_string(), "\"t\".\"age\" BETWEEN 1 AND 9");

        let err = Lookup::Range
            .apply(Term::column("t", "age"), &Value::from(vec![1i64]))
            .unwrap_err();
        assert!(matches!(err, Error::Operational(_)));

        let err = Lookup::In.apply(col(), &Value::from(3i64)).unwrap_err();
        assert!(matches!(err, Error::Operational(_)));
    }

    #[test]
    fn test_isnull_flags() {
        let c = Lookup::IsNull.apply(col(), &Value::Bool(false)).unwrap();
        assert_eq!(c.to_string(), "\"t\".\"name\" IS NOT NULL");
        let c = Lookup::NotIsNull.apply(col(), &Value::Bool(true)).unwrap();
        assert_eq!(c.to_string(), "\"t\".\"name\" IS NOT NULL");
    }

    #[test]
    fn test_pattern_escaping() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");

        let c = Lookup::StartsWith.apply(col(), &Value::from("a_b")).unwrap();
        assert_eq!(c.to_string(), "\"t\".\"name\" LIKE 'a\\_b%' ESCAPE '\\'");

        let c = Lookup::IContains.apply(col(), &Value::from("rust")).unwrap();
        assert_eq!(
            c.to_string(),
            "UPPER(\"t\".\"name\") LIKE UPPER('%rust%') ESCAPE '\\'"
        );

        let c = Lookup::IExact.apply(col(), &Value::from("Rust")).unwrap();
        assert_eq!(c.to_string(), "UPPER(\"t\".\"name\") = UPPER('Rust')");
    }
}
