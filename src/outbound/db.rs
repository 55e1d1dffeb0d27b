pub mod memory_db;
pub mod postgres_db;
