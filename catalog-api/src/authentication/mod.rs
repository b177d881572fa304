//! Session-based authentication.

pub mod guard;
pub mod mutation;
pub mod session;

pub use guard::IsAuthenticated;
pub use mutation::AuthenticationMutation;
pub use session::CurrentUser;
