//! Specifications: predicate + ordering + pagination.

use crate::error::QueryResult;
use crate::paging::PagedList;
use crate::predicate::Predicate;
use repokit_model::{FieldValue, Fields};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

type Configuration<T> = Arc<dyn Fn(Vec<T>) -> Vec<T> + Send + Sync>;

/// Produces the sort key of an entity.
pub enum KeySelector<T> {
    /// Sort by a named field.
    Field(String),
    /// Sort by a computed key.
    Computed(Arc<dyn Fn(&T) -> FieldValue + Send + Sync>),
}

impl<T: Fields> KeySelector<T> {
    fn key(&self, entity: &T) -> FieldValue {
        match self {
            Self::Field(name) => entity.field(name).unwrap_or(FieldValue::Null),
            Self::Computed(f) => f(entity),
        }
    }
}

impl<T> Clone for KeySelector<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Field(name) => Self::Field(name.clone()),
            Self::Computed(f) => Self::Computed(Arc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for KeySelector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, "Field({name})"),
            Self::Computed(_) => f.write_str("Computed"),
        }
    }
}

/// One ordering key and its direction.
pub struct OrderClause<T> {
    pub key: KeySelector<T>,
    pub descending: bool,
}

impl<T> fmt::Debug for OrderClause<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderClause")
            .field("key", &self.key)
            .field("descending", &self.descending)
            .finish()
    }
}

impl<T> Clone for OrderClause<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            descending: self.descending,
        }
    }
}

/// A reusable query description over entities of type `T`.
///
/// [`Specification::apply`] runs, in order: raw configurations, the
/// predicate, then the order clauses (first clause primary, stable sort).
/// Pagination is separate ([`Specification::apply_pagination`]) and always
/// runs last.
pub struct Specification<T> {
    predicate: Option<Predicate>,
    order: Vec<OrderClause<T>>,
    page_size: Option<usize>,
    page_index: Option<usize>,
    configurations: Vec<Configuration<T>>,
}

impl<T> Default for Specification<T> {
    fn default() -> Self {
        Self {
            predicate: None,
            order: Vec::new(),
            page_size: None,
            page_index: None,
            configurations: Vec::new(),
        }
    }
}

impl<T> Clone for Specification<T> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
            order: self.order.clone(),
            page_size: self.page_size,
            page_index: self.page_index,
            configurations: self.configurations.clone(),
        }
    }
}

impl<T> fmt::Debug for Specification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("predicate", &self.predicate)
            .field("order", &self.order)
            .field("page_size", &self.page_size)
            .field("page_index", &self.page_index)
            .field("configurations", &self.configurations.len())
            .finish()
    }
}

impl<T: Fields> Specification<T> {
    /// A specification that matches everything, unordered and unpaged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specification filtering by `predicate`.
    pub fn with_predicate(predicate: Predicate) -> Self {
        Self::new().where_(predicate)
    }

    /// Sets the predicate, replacing any previous one.
    #[must_use]
    pub fn where_(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// ANDs `predicate` onto the current predicate.
    #[must_use]
    pub fn and_where(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(match self.predicate.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    /// Primary ascending order on a field. Clears earlier clauses.
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order.clear();
        self.push_order(KeySelector::Field(field.into()), false)
    }

    /// Primary descending order on a field. Clears earlier clauses.
    #[must_use]
    pub fn order_by_descending(mut self, field: impl Into<String>) -> Self {
        self.order.clear();
        self.push_order(KeySelector::Field(field.into()), true)
    }

    /// Secondary ascending order on a field.
    #[must_use]
    pub fn then_by(self, field: impl Into<String>) -> Self {
        self.push_order(KeySelector::Field(field.into()), false)
    }

    /// Secondary descending order on a field.
    #[must_use]
    pub fn then_by_descending(self, field: impl Into<String>) -> Self {
        self.push_order(KeySelector::Field(field.into()), true)
    }

    /// Appends an order clause with a computed key.
    #[must_use]
    pub fn then_by_key<F>(self, key: F, descending: bool) -> Self
    where
        F: Fn(&T) -> FieldValue + Send + Sync + 'static,
    {
        self.push_order(KeySelector::Computed(Arc::new(key)), descending)
    }

    fn push_order(mut self, key: KeySelector<T>, descending: bool) -> Self {
        self.order.push(OrderClause { key, descending });
        self
    }

    /// Requests page `page_index` (1-based) of `page_size` items.
    #[must_use]
    pub fn paginate(mut self, page_index: usize, page_size: usize) -> Self {
        self.page_index = Some(page_index);
        self.page_size = Some(page_size);
        self
    }

    /// Adds a raw configuration hook, run before the predicate.
    #[must_use]
    pub fn configure<F>(mut self, hook: F) -> Self
    where
        F: Fn(Vec<T>) -> Vec<T> + Send + Sync + 'static,
    {
        self.configurations.push(Arc::new(hook));
        self
    }

    pub fn predicate(&self) -> Option<&Predicate> {
        self.predicate.as_ref()
    }

    pub fn order_clauses(&self) -> &[OrderClause<T>] {
        &self.order
    }

    pub fn page_size(&self) -> Option<usize> {
        self.page_size
    }

    pub fn page_index(&self) -> Option<usize> {
        self.page_index
    }

    /// True if raw configuration hooks are registered. Stores must not push
    /// the predicate down past them.
    pub fn has_configurations(&self) -> bool {
        !self.configurations.is_empty()
    }

    /// True if both a positive page size and a page index are set.
    pub fn is_paged(&self) -> bool {
        matches!((self.page_size, self.page_index), (Some(size), Some(_)) if size > 0)
    }

    /// Applies configurations, predicate and ordering. Does not paginate.
    pub fn apply(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let mut items: Vec<T> = items.into_iter().collect();
        for hook in &self.configurations {
            items = hook(items);
        }
        if let Some(predicate) = &self.predicate {
            items.retain(|e| predicate.matches(e));
        }
        if !self.order.is_empty() {
            items.sort_by(|a, b| self.compare(a, b));
        }
        items
    }

    fn compare(&self, a: &T, b: &T) -> Ordering {
        for clause in &self.order {
            let ord = clause.key.key(a).sort_cmp(&clause.key.key(b));
            let ord = if clause.descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Skips `(page_index - 1) * page_size` items and takes `page_size`.
    /// Returns the input untouched unless the specification is paged.
    pub fn apply_pagination(&self, items: Vec<T>) -> Vec<T> {
        match (self.page_size, self.page_index) {
            (Some(size), Some(index)) if size > 0 => {
                let skip = index.saturating_sub(1).saturating_mul(size);
                items.into_iter().skip(skip).take(size).collect()
            }
            _ => items,
        }
    }

    /// Applies the whole specification and wraps the result as a page.
    ///
    /// An unpaged specification yields a single page holding everything.
    pub fn to_page(&self, items: impl IntoIterator<Item = T>) -> QueryResult<PagedList<T>> {
        let items = self.apply(items);
        match (self.page_size, self.page_index) {
            (Some(size), Some(index)) if size > 0 => PagedList::new(items, index, size),
            _ => {
                let count = items.len();
                Ok(PagedList::from_page(items, 1, count, count))
            }
        }
    }
}
