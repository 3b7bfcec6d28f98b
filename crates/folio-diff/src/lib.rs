//! Media diff engine for Folio.
//!
//! Turns a client's description of a project's desired image list into a
//! reconciliation plan against the images currently persisted.
//!
//! # Key Types
//!
//! - [`DesiredSlot`] / [`SlotContent`] -- one position of the desired list:
//!   keep an existing image or store a new upload
//! - [`FormFields`] -- submitted form fields, parsed into slots and scalars
//! - [`MediaPlan`] -- images to delete, uploads to create, final order and
//!   highlight target
//! - [`ResolvedPlan`] -- the final order once pending uploads have ids

pub mod error;
pub mod form;
pub mod plan;
pub mod slot;

pub use error::{DiffError, DiffResult};
pub use form::FormFields;
pub use plan::{plan_media, MediaPlan, PendingImage, PlacedSlot, ResolvedPlan, SlotIdentity};
pub use slot::{DesiredSlot, SlotContent, Upload};
