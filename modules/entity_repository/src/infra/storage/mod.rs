//! Storage layer - connection and schema helpers

pub mod connection;

pub use connection::{connect, create_table_for};
