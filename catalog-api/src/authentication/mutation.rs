use async_graphql::SimpleObject;
use poem::session::Session;

use super::session::{authenticate, start_session};
use crate::prelude::*;

#[derive(SimpleObject)]
pub struct LoginPayload {
    pub ok: bool,
}

#[derive(Default)]
pub struct AuthenticationMutation;

#[Object]
impl AuthenticationMutation {
    /// Log in with email and password.
    ///
    /// On success the session cookie identifies the user in later requests.
    async fn login(
        &self,
        context: &Context<'_>,
        email: String,
        password: String,
    ) -> async_graphql::Result<LoginPayload> {
        let pool = get_pgpool(context)?;
        let session = context.data::<Session>()?;

        let Some(user_id) = authenticate(&pool, &email, password).await? else {
            tracing::info!("Rejected login attempt");
            return Ok(LoginPayload { ok: false });
        };

        start_session(session, user_id);
        tracing::info!(user = %user_id, "User logged in");

        Ok(LoginPayload { ok: true })
    }

    /// End the current session.
    async fn logout(&self, context: &Context<'_>) -> async_graphql::Result<bool> {
        context.data::<Session>()?.purge();

        Ok(true)
    }
}
