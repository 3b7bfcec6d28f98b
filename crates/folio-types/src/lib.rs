//! Foundation types for Folio.
//!
//! This crate provides the identity, reference, and model types shared by the
//! content store, the diff engine, the database layer, and the HTTP surface.
//! Every other Folio crate depends on `folio-types`.
//!
//! # Key Types
//!
//! - [`ProjectId`] / [`ImageId`] — Database row identifiers
//! - [`ContentRef`] — Public URL of a file held by the content store
//! - [`Project`] / [`ProjectImage`] — Persisted rows
//! - [`ProjectWithImages`] — A project together with its ordered images
//! - [`ProjectFields`] — Client-editable scalar fields of a project
//! - [`Page`] — Paginated listing envelope

pub mod content;
pub mod error;
pub mod ids;
pub mod project;

pub use content::ContentRef;
pub use error::TypeError;
pub use ids::{ImageId, ProjectId};
pub use project::{
    ImageOrder, Page, Project, ProjectFields, ProjectImage, ProjectWithImages, NO_HIGHLIGHT,
};
