use async_graphql::connection::{Connection, CursorType, Edge, EmptyFields};
use async_graphql::{Context, ErrorExtensions, OutputType};
use catalog_pagination::{Cursor, Page, PaginationError};

use crate::database::DatabasePool;

/// Get PostgreSQL connection pool from [`Context`].
pub fn get_pgpool(context: &Context<'_>) -> async_graphql::Result<sqlx::PgPool> {
    Ok(context.data::<DatabasePool>()?.get_pool())
}

/// Page-size bounds enforced before the pagination engine is called.
#[derive(Debug, Clone, Copy)]
pub struct PagePolicy {
    pub max_page_size: usize,
}

impl PagePolicy {
    /// Validate a requested page size, `argument` naming it in errors.
    pub fn check(&self, argument: &str, size: i32) -> async_graphql::Result<usize> {
        let size = usize::try_from(size)
            .ok()
            .filter(|size| *size > 0)
            .ok_or_else(|| bad_user_input(format!("{argument} must be at least 1")))?;

        if size > self.max_page_size {
            return Err(bad_user_input(format!(
                "per page must be less than {}",
                self.max_page_size
            )));
        }

        Ok(size)
    }
}

/// Cursor of a GraphQL connection, carried as-is to the pagination engine.
pub struct ConnectionCursor(pub Cursor);

impl CursorType for ConnectionCursor {
    type Error = std::convert::Infallible;

    fn decode_cursor(s: &str) -> Result<Self, Self::Error> {
        Ok(Self(Cursor::from(s)))
    }

    fn encode_cursor(&self) -> String {
        self.0.to_string()
    }
}

/// Map an engine page onto an async-graphql connection.
pub fn into_connection<T, N, F>(
    page: Page<T>,
    mut map: F,
) -> Connection<ConnectionCursor, N, EmptyFields, EmptyFields>
where
    N: OutputType,
    F: FnMut(T) -> N,
{
    let mut connection = Connection::new(
        page.page_info.has_previous_page,
        page.page_info.has_next_page,
    );

    connection.edges.extend(
        page.edges
            .into_iter()
            .map(|edge| Edge::new(ConnectionCursor(edge.cursor), map(edge.node))),
    );

    connection
}

/// Convert an engine error into a field error.
///
/// Cursor and page-size problems are reported to the client; anything else
/// is logged and replaced with a generic message.
pub fn pagination_error(err: PaginationError) -> async_graphql::Error {
    if err.is_client_error() {
        return bad_user_input(err.to_string());
    }

    tracing::error!("Pagination failed: {err:?}");

    async_graphql::Error::new("Internal server error")
}

pub fn bad_user_input(message: impl Into<String>) -> async_graphql::Error {
    async_graphql::Error::new(message)
        .extend_with(|_, extensions| extensions.set("code", "BAD_USER_INPUT"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_policy_bounds() {
        let policy = PagePolicy { max_page_size: 50 };

        assert_eq!(policy.check("first", 1).unwrap(), 1);
        assert_eq!(policy.check("first", 50).unwrap(), 50);
        assert_eq!(
            policy.check("first", 51).unwrap_err().message,
            "per page must be less than 50"
        );
        assert_eq!(
            policy.check("last", 0).unwrap_err().message,
            "last must be at least 1"
        );
        assert!(policy.check("first", -3).is_err());
    }

    #[test]
    fn test_server_errors_are_hidden() {
        let err = PaginationError::Source(Box::new(std::io::Error::other("password=hunter2")));

        assert_eq!(pagination_error(err).message, "Internal server error");
    }

    #[test]
    fn test_cursor_errors_are_reported() {
        let err = pagination_error(PaginationError::MalformedCursor("zzz".into()));

        assert!(err.message.contains("Malformed cursor"));
    }
}
