pub mod engine;
pub mod sqlite;

pub use engine::{QueryEngine, Table};
pub use sqlite::SqliteEngine;
