//! Repository implementations: SQLite for the service, memory for tests and throwaway runs.

mod memory;
mod sqlite;

pub use memory::MemoryRepository;
pub use sqlite::SqliteRepository;
