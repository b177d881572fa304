//! Podcast catalog: types, lookups and the podcast query/mutation fields.

pub mod loader;
pub mod mutation;
pub mod query;
pub mod source;
pub mod types;

pub use loader::PodcastLoader;
pub use mutation::PodcastsMutation;
pub use query::PodcastsQuery;
