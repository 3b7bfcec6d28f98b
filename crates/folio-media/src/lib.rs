//! Project media reconciliation for Folio.
//!
//! Ties the pieces together: the diff planner decides what changes, the
//! content store holds the bytes, the placeholder generator renders previews
//! and the database records the result. [`MediaReconciler`] is the entry
//! point for every operation that changes a project's image set.

pub mod error;
pub mod reconciler;
pub mod request;

pub use error::{MediaError, MediaResult};
pub use reconciler::MediaReconciler;
pub use request::{ContentCleanup, MediaRequest, ReconcileOutcome};
