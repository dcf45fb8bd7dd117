pub mod error;
pub mod filtering;
pub mod loader;
pub mod store;
pub mod table;
