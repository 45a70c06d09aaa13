pub(crate) mod core;
pub(crate) mod selection_store;

pub use core::RedisStore;
pub use selection_store::RedisSelectionStore;
