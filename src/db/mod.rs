//! Database handle published at startup.
//!
//! Layout:
//! - `firestore.rs`: the `Database` handle and its endpoint options

pub mod firestore;

pub use firestore::{Database, DatabaseOptions};
