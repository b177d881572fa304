//! Collection accessors consumed by [`crate::paginate`].

use std::future::Future;

use crate::cursor::KeyValue;
use crate::error::BoxError;
use crate::order::{OrderSpec, Sortable};

/// An already-filtered collection that can be read in order.
pub trait OrderedSource {
    type Item: Sortable;
    type Error: Into<BoxError>;

    /// Return at most `limit` records in `order`, starting strictly after
    /// the position `after` when given.
    fn fetch_ordered(
        &self,
        order: &OrderSpec,
        after: Option<&[KeyValue]>,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Self::Item>, Self::Error>> + Send;
}

/// An in-memory collection.
#[derive(Debug, Clone)]
pub struct MemorySource<T> {
    items: Vec<T>,
}

impl<T> Default for MemorySource<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> MemorySource<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    /// Keep only the items matching `predicate`.
    pub fn filter(mut self, predicate: impl FnMut(&T) -> bool) -> Self {
        self.items.retain(predicate);
        self
    }
}

impl<T> FromIterator<T> for MemorySource<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T> OrderedSource for MemorySource<T>
where
    T: Sortable + Clone + Send + Sync,
{
    type Item = T;
    type Error = std::convert::Infallible;

    async fn fetch_ordered(
        &self,
        order: &OrderSpec,
        after: Option<&[KeyValue]>,
        limit: usize,
    ) -> Result<Vec<T>, Self::Error> {
        let mut window: Vec<&T> = self
            .items
            .iter()
            .filter(|item| after.is_none_or(|key| order.is_after(*item, key)))
            .collect();

        window.sort_by(|a, b| order.compare(*a, *b));

        Ok(window.into_iter().take(limit).cloned().collect())
    }
}
