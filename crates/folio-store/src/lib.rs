//! Content-addressed image storage for Folio.
//!
//! Uploaded image bytes are stored under a file name derived from the BLAKE3
//! digest of their content, so writing the same bytes twice lands on the
//! same file. The store is independent of the database: it knows nothing
//! about projects or image rows, only about bytes and [`ContentRef`]s.
//!
//! # Backends
//!
//! All backends implement the [`ContentStore`] trait:
//!
//! - [`FsContentStore`] -- files under `<root>/public/img`
//! - [`InMemoryContentStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Only JPEG, PNG and WebP content is accepted; anything else is rejected
//!    before a byte is written.
//! 2. The stored extension is the canonical one for the detected type; the
//!    upload's file name plays no part in naming.
//! 3. Saving existing content is a no-op that returns the same reference.
//! 4. Deleting an absent file is not an error.
//! 5. Files are written to a temporary name and renamed into place, so a
//!    reader never observes a partially written image.
//!
//! [`ContentRef`]: folio_types::ContentRef

pub mod digest;
pub mod error;
pub mod fs;
pub mod media;
pub mod memory;
pub mod traits;

pub use digest::ContentDigest;
pub use error::{StoreError, StoreResult};
pub use fs::FsContentStore;
pub use media::{stored_file_name, MediaType};
pub use memory::InMemoryContentStore;
pub use traits::{ContentStore, SavedContent};
