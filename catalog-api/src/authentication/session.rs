use poem::session::Session;
use uuid::Uuid;

/// Session key holding the id of the logged-in user.
pub const USER_ID_KEY: &str = "user_id";

/// The user attached to the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
}

impl CurrentUser {
    /// The user stored in `session`, if any.
    pub fn from_session(session: &Session) -> Option<Self> {
        session
            .get::<Uuid>(USER_ID_KEY)
            .map(|id| Self { id })
    }
}

#[derive(sqlx::FromRow)]
struct Credentials {
    id: Uuid,
    password_hash: String,
}

/// Check `email`/`password` against the users table.
///
/// Returns the user id when the credentials are valid.
pub async fn authenticate(
    pool: &sqlx::PgPool,
    email: &str,
    password: String,
) -> async_graphql::Result<Option<Uuid>> {
    let credentials = sqlx::query_as::<_, Credentials>(
        "SELECT id, password_hash FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    let Some(Credentials { id, password_hash }) = credentials else {
        return Ok(None);
    };

    verify_password(id, password, password_hash).await
}

/// Check `password` against the stored bcrypt hash of user `id`.
async fn verify_password(
    id: Uuid,
    password: String,
    password_hash: String,
) -> async_graphql::Result<Option<Uuid>> {
    // bcrypt verification is CPU bound.
    let verified =
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash)).await?;

    match verified {
        Ok(true) => Ok(Some(id)),
        Ok(false) => Ok(None),
        Err(err) => {
            tracing::warn!(user = %id, "Stored password hash is unusable: {err}");
            Ok(None)
        }
    }
}

/// Store the user in a fresh session.
pub fn start_session(session: &Session, user_id: Uuid) {
    session.renew();
    session.set(USER_ID_KEY, user_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use poem::session::SessionStatus;

    fn hash(password: &str) -> String {
        bcrypt::hash(password, 4).unwrap()
    }

    #[tokio::test]
    async fn test_verify_password() {
        let id = Uuid::from_u128(7);

        let accepted = verify_password(id, "hunter2".into(), hash("hunter2")).await.unwrap();
        let rejected = verify_password(id, "hunter3".into(), hash("hunter2")).await.unwrap();

        assert_eq!(accepted, Some(id));
        assert_eq!(rejected, None);
    }

    #[tokio::test]
    async fn test_unusable_hash_is_rejected() {
        let result = verify_password(Uuid::nil(), "hunter2".into(), "not-a-hash".into())
            .await
            .unwrap();

        assert_eq!(result, None);
    }

    #[test]
    fn test_session_carries_current_user() {
        let session = Session::default();
        assert_eq!(CurrentUser::from_session(&session), None);

        let id = Uuid::from_u128(42);
        start_session(&session, id);

        assert_eq!(CurrentUser::from_session(&session), Some(CurrentUser { id }));
        assert_eq!(session.status(), SessionStatus::Renewed);

        session.purge();
        assert_eq!(CurrentUser::from_session(&session), None);
    }
}
