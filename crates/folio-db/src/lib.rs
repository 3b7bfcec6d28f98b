//! SQLite persistence for Folio.
//!
//! [`Database`] owns the connection pool and serves reads. Every mutation of
//! a project's image set goes through a [`MediaTransaction`], which commits
//! or rolls back as a unit.

pub mod database;
pub mod error;
pub mod rows;
pub mod schema;
pub mod tx;

pub use database::Database;
pub use error::{DbError, DbResult};
pub use rows::NewImage;
pub use tx::MediaTransaction;
