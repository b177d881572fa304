pub use async_graphql::{Context, ID, Object};

pub use crate::utils::*;
