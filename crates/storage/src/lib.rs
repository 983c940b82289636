#![forbid(unsafe_code)]

pub mod keys;
pub mod records;
pub mod repository;
pub mod sqlite;
pub mod store;

pub use repository::{
    ActivityRepository, ContentOverrideRepository, ProfileRepository, ResultRepository, Stores,
};
pub use store::{InMemoryStore, KeyValueStore, StoreError};
