// Durable board stores

pub mod files;
pub mod sqlite;

pub use files::FileStore;
pub use sqlite::SqliteStore;
