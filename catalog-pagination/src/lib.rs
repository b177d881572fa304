//! Cursor-based pagination over ordered, uniquely keyed collections.
//!
//! A caller hands [`paginate`] an already-filtered [`OrderedSource`], an
//! [`OrderSpec`] and a page size. The engine fetches one record more than
//! requested to find out whether another page follows, trims the probe
//! record, and returns the page with one [`Cursor`] per item.
//!
//! Only forward traversal (`first`/`after`) is supported.

pub mod cursor;
pub mod error;
pub mod order;
pub mod page;
pub mod source;

pub use cursor::{Cursor, KeyKind, KeyValue};
pub use error::{BoxError, PaginationError, PaginationResult};
pub use order::{Direction, OrderField, OrderSpec, Sortable};
pub use page::{Edge, Page, PageInfo};
pub use source::{MemorySource, OrderedSource};

/// Fetch the page of `first` records that follows `after`.
///
/// `first` must be at least 1; any upper bound is the caller's policy. An
/// empty `after` is the same as no cursor. `has_previous_page` only reports
/// whether a cursor was given.
#[tracing::instrument(level = "debug", skip(source, order, after), fields(after = ?after))]
pub async fn paginate<S>(
    source: &S,
    order: &OrderSpec,
    first: usize,
    after: Option<&Cursor>,
) -> PaginationResult<Page<S::Item>>
where
    S: OrderedSource,
{
    if first == 0 {
        return Err(PaginationError::InvalidPageSize(first));
    }

    let after = after.filter(|cursor| !cursor.is_empty());
    let after_key = after.map(|cursor| order.decode_cursor(cursor)).transpose()?;

    let records = source
        .fetch_ordered(order, after_key.as_deref(), first.saturating_add(1))
        .await
        .map_err(|err| PaginationError::Source(err.into()))?;

    Ok(assemble(records, order, first, after_key.as_deref()))
}

/// Order the fetched window, trim the probe record and build the page.
fn assemble<T: Sortable>(
    mut records: Vec<T>,
    order: &OrderSpec,
    first: usize,
    after: Option<&[KeyValue]>,
) -> Page<T> {
    records.sort_by(|a, b| order.compare(a, b));

    if let Some(key) = after {
        let fetched = records.len();
        records.retain(|record| order.is_after(record, key));

        if records.len() != fetched {
            tracing::warn!(
                discarded = fetched - records.len(),
                "source returned records that are not after the cursor"
            );
        }
    }

    let has_next_page = records.len() > first;
    records.truncate(first);

    tracing::debug!(returned = records.len(), has_next_page, "page assembled");

    let edges = records
        .into_iter()
        .map(|node| Edge {
            cursor: order.cursor_for(&node),
            node,
        })
        .collect();

    Page::new(edges, has_next_page, after.is_some())
}
