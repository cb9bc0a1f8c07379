pub mod memory;
pub mod sqlite;
pub mod store;

pub use memory::MemoryRepository;
pub use sqlite::SqliteRepository;
pub use store::{ReviewRepository, StorageError};
