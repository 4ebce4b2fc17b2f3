pub mod api;
pub mod errors;
pub mod memory;
pub mod metrics;

pub use api::{GraphStore, GraphWriter};
pub use errors::StoreError;
pub use memory::InMemoryGraphStore;
