//! Incremental predicate construction.
//!
//! [`PredicateBuilder`] accumulates three kinds of fragments and combines them
//! on [`PredicateBuilder::build`]:
//!
//! ```text
//! (AND of raw conditions) AND (AND of composite filters) <concat> (value filters)
//! ```
//!
//! where each value filter is an OR over its listed values and the value
//! filters are joined to each other, and to the rest, by the configured
//! concat operator.

use crate::error::{QueryError, QueryResult};
use crate::predicate::{NumberOperator, Predicate, TextOperator};
use repokit_model::FieldValue;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// How two fragments are joined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

impl LogicalOperator {
    fn join(self, parts: Vec<Predicate>) -> Predicate {
        match self {
            Self::And => Predicate::all(parts),
            Self::Or => Predicate::any(parts),
        }
    }
}

/// One side of a composite filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    Text {
        op: TextOperator,
        #[serde(default)]
        value: Option<String>,
    },
    Number {
        op: NumberOperator,
        #[serde(default)]
        value: Option<FieldValue>,
    },
}

impl Condition {
    /// Text condition with an operand.
    pub fn text(op: TextOperator, value: impl Into<String>) -> Self {
        Self::Text {
            op,
            value: Some(value.into()),
        }
    }

    /// Numeric condition with an operand.
    pub fn number(op: NumberOperator, value: impl Into<FieldValue>) -> Self {
        Self::Number {
            op,
            value: Some(value.into()),
        }
    }

    /// Text null-or-whitespace check.
    pub fn text_empty() -> Self {
        Self::Text {
            op: TextOperator::Empty,
            value: None,
        }
    }

    /// Numeric null check.
    pub fn number_empty() -> Self {
        Self::Number {
            op: NumberOperator::Empty,
            value: None,
        }
    }

    fn into_predicate(self, field: &str) -> QueryResult<Predicate> {
        match self {
            Self::Text { op, value } => match (op.needs_operand(), value) {
                (true, None) => Err(QueryError::InvalidFilterState(format!(
                    "text operator {op:?} on '{field}' needs a value"
                ))),
                (_, value) => Ok(Predicate::text(field, op, value.unwrap_or_default())),
            },
            Self::Number { op, value } => match (op.needs_operand(), value) {
                (true, None) => Err(QueryError::InvalidFilterState(format!(
                    "number operator {op:?} on '{field}' needs a value"
                ))),
                (_, value) => Ok(Predicate::compare(field, op, value.unwrap_or(FieldValue::Null))),
            },
        }
    }
}

/// A composite filter: a property tested by one condition, or by two
/// conditions joined with exactly one logical operator.
///
/// Deserializable so filter state can arrive from outside the process. A
/// descriptor that names a logic operator but carries no second condition (or
/// the reverse) is rejected at build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    pub field: String,
    pub first: Condition,
    #[serde(default)]
    pub logic: Option<LogicalOperator>,
    #[serde(default)]
    pub second: Option<Condition>,
}

impl FilterDescriptor {
    pub fn new(field: impl Into<String>, first: Condition) -> Self {
        Self {
            field: field.into(),
            first,
            logic: None,
            second: None,
        }
    }

    /// Adds a second condition joined with AND.
    #[must_use]
    pub fn and(self, second: Condition) -> Self {
        self.with_second(LogicalOperator::And, second)
    }

    /// Adds a second condition joined with OR.
    #[must_use]
    pub fn or(self, second: Condition) -> Self {
        self.with_second(LogicalOperator::Or, second)
    }

    fn with_second(mut self, logic: LogicalOperator, second: Condition) -> Self {
        self.logic = Some(logic);
        self.second = Some(second);
        self
    }

    /// Converts the descriptor into a predicate.
    pub fn to_predicate(&self) -> QueryResult<Predicate> {
        let first = self.first.clone().into_predicate(&self.field)?;
        match (self.logic, self.second.clone()) {
            (None, None) => Ok(first),
            (Some(logic), Some(second)) => {
                let second = second.into_predicate(&self.field)?;
                Ok(logic.join(vec![first, second]))
            }
            (Some(logic), None) => Err(QueryError::InvalidFilterState(format!(
                "filter on '{}' promises a second condition joined by {logic:?} but has none",
                self.field
            ))),
            (None, Some(_)) => Err(QueryError::InvalidFilterState(format!(
                "filter on '{}' has a second condition but no logic operator",
                self.field
            ))),
        }
    }
}

/// Accumulates predicate fragments and combines them into one predicate.
#[derive(Debug, Clone, Default)]
pub struct PredicateBuilder {
    conditions: Vec<Predicate>,
    filters: Vec<FilterDescriptor>,
    value_filters: Vec<Predicate>,
    concat: LogicalOperator,
}

impl PredicateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the operator joining value filters to each other and to the rest.
    #[must_use]
    pub fn concat_with(mut self, operator: LogicalOperator) -> Self {
        self.concat = operator;
        self
    }

    /// Adds a raw boolean condition.
    #[must_use]
    pub fn condition(mut self, predicate: Predicate) -> Self {
        self.conditions.push(predicate);
        self
    }

    /// Adds a "field equals one of `values`" filter. An empty value list
    /// adds nothing.
    #[must_use]
    pub fn values<I, V>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        let field = field.into();
        let alternatives: Vec<Predicate> = values
            .into_iter()
            .map(|v| Predicate::eq(field.clone(), v))
            .collect();
        if !alternatives.is_empty() {
            self.value_filters.push(Predicate::any(alternatives));
        }
        self
    }

    /// Adds a composite comparison filter.
    #[must_use]
    pub fn filter(mut self, filter: FilterDescriptor) -> Self {
        self.filters.push(filter);
        self
    }

    /// True if no fragment has been added.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.filters.is_empty() && self.value_filters.is_empty()
    }

    /// Combines every fragment into a single predicate.
    ///
    /// Returns [`Predicate::True`] when nothing was added, and
    /// [`QueryError::InvalidFilterState`] for a malformed composite filter.
    pub fn build(&self) -> QueryResult<Predicate> {
        let mut base = self.conditions.clone();
        for filter in &self.filters {
            base.push(filter.to_predicate()?);
        }

        let base = (!base.is_empty()).then(|| Predicate::all(base));
        let values = (!self.value_filters.is_empty())
            .then(|| self.concat.join(self.value_filters.clone()));

        let predicate = match (base, values) {
            (None, None) => Predicate::True,
            (Some(base), None) => base,
            (None, Some(values)) => values,
            (Some(base), Some(values)) => self.concat.join(vec![base, values]),
        };
        trace!("built predicate {:?}", predicate);
        Ok(predicate)
    }
}
