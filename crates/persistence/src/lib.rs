//! Fabula Persistence - Database, cache, and encryption layer

pub mod cache;
pub mod encryption;
pub mod sqlite;

pub use encryption::derive_machine_key;
pub use encryption::TokenEncryptor;
pub use sqlite::Database;
