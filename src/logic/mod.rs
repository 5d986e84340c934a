pub mod query;
pub mod upsert;

pub use query::*;
pub use upsert::*;
