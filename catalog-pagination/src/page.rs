//! Page, edge and page-info types.
//!
//! These follow the Relay connection shape, so a GraphQL layer can map them
//! one to one onto `edges` and `pageInfo`.

use crate::cursor::Cursor;

/// A single item in a page together with its cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge<T> {
    pub node: T,
    pub cursor: Cursor,
}

/// Information about the position of a page in the ordered collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// Whether more items follow this page.
    pub has_next_page: bool,
    /// Whether the page was requested after a cursor.
    ///
    /// This is not checked against the collection.
    pub has_previous_page: bool,
    /// Cursor of the first item, `None` for an empty page.
    pub start_cursor: Option<Cursor>,
    /// Cursor of the last item, `None` for an empty page.
    pub end_cursor: Option<Cursor>,
}

impl PageInfo {
    /// Derive the page info of a trimmed page.
    pub fn from_edges<T>(edges: &[Edge<T>], has_next_page: bool, has_previous_page: bool) -> Self {
        Self {
            has_next_page,
            has_previous_page,
            start_cursor: edges.first().map(|edge| edge.cursor.clone()),
            end_cursor: edges.last().map(|edge| edge.cursor.clone()),
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    pub fn new(edges: Vec<Edge<T>>, has_next_page: bool, has_previous_page: bool) -> Self {
        let page_info = PageInfo::from_edges(&edges, has_next_page, has_previous_page);

        Self { edges, page_info }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Iterate over the items without their cursors.
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.edges.iter().map(|edge| &edge.node)
    }

    /// Map the items, keeping cursors and page info.
    pub fn map<U, F>(self, mut f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            edges: self
                .edges
                .into_iter()
                .map(|edge| Edge {
                    node: f(edge.node),
                    cursor: edge.cursor,
                })
                .collect(),
            page_info: self.page_info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(node: u32) -> Edge<u32> {
        Edge {
            node,
            cursor: Cursor::from(format!("c{node}")),
        }
    }

    #[test]
    fn test_empty_page_has_no_cursors() {
        let page: Page<u32> = Page::new(Vec::new(), false, false);

        assert_eq!(page.page_info, PageInfo::default());
        assert!(page.is_empty());
    }

    #[test]
    fn test_cursors_come_from_first_and_last_edge() {
        let page = Page::new(vec![edge(1), edge(2), edge(3)], true, true);

        assert_eq!(page.page_info.start_cursor, Some(Cursor::from("c1")));
        assert_eq!(page.page_info.end_cursor, Some(Cursor::from("c3")));
        assert!(page.page_info.has_next_page);
        assert!(page.page_info.has_previous_page);
    }

    #[test]
    fn test_map_keeps_cursors() {
        let page = Page::new(vec![edge(1), edge(2)], false, false).map(|n| n * 10);

        assert_eq!(page.nodes().copied().collect::<Vec<_>>(), vec![10, 20]);
        assert_eq!(page.edges[1].cursor, Cursor::from("c2"));
        assert_eq!(page.page_info.end_cursor, Some(Cursor::from("c2")));
    }
}
