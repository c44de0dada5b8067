mod executor;

pub use executor::{BulkExecutor, BulkResult};
