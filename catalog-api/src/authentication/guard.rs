use async_graphql::{Context, Guard};

use super::session::CurrentUser;

/// Rejects the field unless the request carries a logged-in user.
pub struct IsAuthenticated;

impl Guard for IsAuthenticated {
    async fn check(&self, context: &Context<'_>) -> async_graphql::Result<()> {
        if context.data_opt::<CurrentUser>().is_some() {
            Ok(())
        } else {
            Err("User is not authenticated".into())
        }
    }
}
