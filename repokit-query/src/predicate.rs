//! Boolean predicates over entity fields.

use repokit_model::{FieldValue, Fields};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Comparison operators for numeric (and other ordered) values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    /// The field is null.
    Empty,
    /// The field is not null.
    NotEmpty,
}

impl NumberOperator {
    /// True for operators that compare against an operand.
    #[must_use]
    pub const fn needs_operand(&self) -> bool {
        !matches!(self, Self::Empty | Self::NotEmpty)
    }
}

/// Comparison operators for text values. All comparisons are ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOperator {
    Equal,
    NotEqual,
    /// The field is null, empty or whitespace.
    Empty,
    /// The field has at least one non-whitespace character.
    NotEmpty,
    StartsWith,
    EndsWith,
    Contains,
    NotContains,
}

impl TextOperator {
    /// True for operators that compare against an operand.
    #[must_use]
    pub const fn needs_operand(&self) -> bool {
        !matches!(self, Self::Empty | Self::NotEmpty)
    }
}

type CustomTest = Arc<dyn Fn(&dyn Fields) -> bool + Send + Sync>;

/// A composable boolean expression over an entity's fields.
///
/// Missing fields read as [`FieldValue::Null`].
#[derive(Clone)]
pub enum Predicate {
    /// Always true.
    True,
    /// Always false.
    False,
    /// Ordered comparison of a field against a value.
    Compare {
        field: String,
        op: NumberOperator,
        value: FieldValue,
    },
    /// Text comparison of a field against a string.
    Text {
        field: String,
        op: TextOperator,
        value: String,
    },
    /// The field equals one of the listed values.
    In {
        field: String,
        values: Vec<FieldValue>,
    },
    Not(Box<Predicate>),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    /// Opaque in-memory condition. Stores that translate predicates cannot
    /// push it down and must evaluate it after loading.
    Custom { name: String, test: CustomTest },
}

impl Predicate {
    /// Ordered comparison of `field` against `value`.
    pub fn compare(field: impl Into<String>, op: NumberOperator, value: impl Into<FieldValue>) -> Self {
        Self::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// `field == value`.
    pub fn eq(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::compare(field, NumberOperator::Equal, value)
    }

    /// Text comparison of `field` against `value`.
    pub fn text(field: impl Into<String>, op: TextOperator, value: impl Into<String>) -> Self {
        Self::Text {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// `field` equals any of `values`.
    pub fn one_of<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        Self::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Wraps a closure as a predicate.
    pub fn custom<F>(name: impl Into<String>, test: F) -> Self
    where
        F: Fn(&dyn Fields) -> bool + Send + Sync + 'static,
    {
        Self::Custom {
            name: name.into(),
            test: Arc::new(test),
        }
    }

    /// Conjunction of all predicates. Empty input yields [`Predicate::True`].
    pub fn all(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        let mut parts: Vec<Predicate> = Vec::new();
        for p in predicates {
            match p {
                Self::True => {}
                Self::And(inner) => parts.extend(inner),
                other => parts.push(other),
            }
        }
        match parts.len() {
            0 => Self::True,
            1 => parts.remove(0),
            _ => Self::And(parts),
        }
    }

    /// Disjunction of all predicates. Empty input yields [`Predicate::False`].
    pub fn any(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        let mut parts: Vec<Predicate> = Vec::new();
        for p in predicates {
            match p {
                Self::False => {}
                Self::Or(inner) => parts.extend(inner),
                other => parts.push(other),
            }
        }
        match parts.len() {
            0 => Self::False,
            1 => parts.remove(0),
            _ => Self::Or(parts),
        }
    }

    /// `self AND other`.
    #[must_use]
    pub fn and(self, other: Predicate) -> Self {
        Self::all([self, other])
    }

    /// `self OR other`.
    #[must_use]
    pub fn or(self, other: Predicate) -> Self {
        Self::any([self, other])
    }

    /// True if this predicate accepts everything without inspecting fields.
    #[must_use]
    pub fn is_always_true(&self) -> bool {
        matches!(self, Self::True)
    }

    /// Names of every field the predicate reads. Custom predicates are opaque
    /// and contribute nothing.
    pub fn fields_referenced(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Self::Compare { field, .. } | Self::Text { field, .. } | Self::In { field, .. } => {
                out.insert(field.as_str());
            }
            Self::Not(inner) => inner.collect_fields(out),
            Self::And(parts) | Self::Or(parts) => {
                for p in parts {
                    p.collect_fields(out);
                }
            }
            Self::True | Self::False | Self::Custom { .. } => {}
        }
    }

    /// Evaluates the predicate against an entity.
    pub fn matches(&self, entity: &dyn Fields) -> bool {
        match self {
            Self::True => true,
            Self::False => false,
            Self::Compare { field, op, value } => {
                let actual = entity.field(field).unwrap_or(FieldValue::Null);
                compare_matches(&actual, *op, value)
            }
            Self::Text { field, op, value } => {
                let actual = entity.field(field).unwrap_or(FieldValue::Null);
                text_matches(actual.as_str(), *op, value)
            }
            Self::In { field, values } => {
                let actual = entity.field(field).unwrap_or(FieldValue::Null);
                values.iter().any(|v| actual.loosely_equals(v))
            }
            Self::Not(inner) => !inner.matches(entity),
            Self::And(parts) => parts.iter().all(|p| p.matches(entity)),
            Self::Or(parts) => parts.iter().any(|p| p.matches(entity)),
            Self::Custom { test, .. } => test(entity),
        }
    }
}

fn compare_matches(actual: &FieldValue, op: NumberOperator, expected: &FieldValue) -> bool {
    use std::cmp::Ordering::{Equal, Greater, Less};

    match op {
        NumberOperator::Empty => actual.is_null(),
        NumberOperator::NotEmpty => !actual.is_null(),
        NumberOperator::Equal => actual.loosely_equals(expected),
        NumberOperator::NotEqual => !actual.loosely_equals(expected),
        NumberOperator::GreaterThan => actual.compare(expected) == Some(Greater),
        NumberOperator::GreaterOrEqual => matches!(actual.compare(expected), Some(Greater | Equal)),
        NumberOperator::LessThan => actual.compare(expected) == Some(Less),
        NumberOperator::LessOrEqual => matches!(actual.compare(expected), Some(Less | Equal)),
    }
}

fn text_matches(actual: Option<&str>, op: TextOperator, expected: &str) -> bool {
    match op {
        TextOperator::Empty => actual.is_none_or(|s| s.trim().is_empty()),
        TextOperator::NotEmpty => actual.is_some_and(|s| !s.trim().is_empty()),
        TextOperator::Equal => actual == Some(expected),
        TextOperator::NotEqual => actual != Some(expected),
        TextOperator::StartsWith => actual.is_some_and(|s| s.starts_with(expected)),
        TextOperator::EndsWith => actual.is_some_and(|s| s.ends_with(expected)),
        TextOperator::Contains => actual.is_some_and(|s| s.contains(expected)),
        TextOperator::NotContains => !actual.is_some_and(|s| s.contains(expected)),
    }
}

impl std::ops::Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Self::Output {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => f.write_str("True"),
            Self::False => f.write_str("False"),
            Self::Compare { field, op, value } => write!(f, "({field} {op:?} {value})"),
            Self::Text { field, op, value } => write!(f, "({field} {op:?} {value:?})"),
            Self::In { field, values } => write!(f, "({field} In {values:?})"),
            Self::Not(inner) => write!(f, "Not{inner:?}"),
            Self::And(parts) => f.debug_tuple("And").field(parts).finish(),
            Self::Or(parts) => f.debug_tuple("Or").field(parts).finish(),
            Self::Custom { name, .. } => write!(f, "Custom({name})"),
        }
    }
}
