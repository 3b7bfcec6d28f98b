//! Reconciliation planning: desired slots against persisted images.
//!
//! [`plan_media`] is a pure function. It decides which persisted images go
//! away, which uploads must be stored, the final position of every image and
//! which of them (if any) carries the highlight. Identities of uploads are
//! not known until their rows exist, so the plan refers to them by slot
//! index and [`MediaPlan::resolve`] substitutes real ids afterwards.

use std::collections::{BTreeMap, BTreeSet};

use folio_types::ImageId;

use crate::error::{DiffError, DiffResult};
use crate::slot::{DesiredSlot, SlotContent, Upload};

/// Identity of an image in the final order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SlotIdentity {
    /// A persisted image that is kept.
    Existing(ImageId),
    /// A new image, identified by the slot index it was submitted at.
    Pending(usize),
}

/// An upload that must be stored and inserted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingImage {
    pub index: usize,
    pub upload: Upload,
}

/// One entry of the final order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedSlot {
    pub index: usize,
    pub identity: SlotIdentity,
}

/// Output of [`plan_media`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MediaPlan {
    /// Persisted images no keep slot references, ascending.
    pub to_delete: Vec<ImageId>,
    /// New uploads in ascending slot order.
    pub to_create: Vec<PendingImage>,
    /// Every surviving image, sorted by slot index.
    pub final_order: Vec<PlacedSlot>,
    /// Image at final position `highlight_index`, if that position exists.
    pub highlight: Option<SlotIdentity>,
}

/// A plan whose pending uploads have been assigned image ids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedPlan {
    pub order: Vec<ImageId>,
    pub highlight: Option<ImageId>,
}

impl MediaPlan {
    /// Number of images the project will have.
    pub fn final_len(&self) -> usize {
        self.final_order.len()
    }

    /// Substitute created image ids (keyed by slot index) for pending slots.
    pub fn resolve(&self, created: &BTreeMap<usize, ImageId>) -> DiffResult<ResolvedPlan> {
        let lookup = |identity: SlotIdentity| match identity {
            SlotIdentity::Existing(id) => Ok(id),
            SlotIdentity::Pending(index) => created
                .get(&index)
                .copied()
                .ok_or(DiffError::UnresolvedSlot(index)),
        };

        let order = self
            .final_order
            .iter()
            .map(|placed| lookup(placed.identity))
            .collect::<DiffResult<Vec<_>>>()?;
        let highlight = self.highlight.map(lookup).transpose()?;
        Ok(ResolvedPlan { order, highlight })
    }
}

/// Compare the desired slots against the persisted image ids.
///
/// - `current`: ids of the images the project has now.
/// - `slots`: desired slots in submission order; when two slots share an
///   index the later one wins.
/// - `highlight_index`: position in the final order to highlight, or any
///   negative value for none. Out-of-range positions highlight nothing.
///
/// Fails if a keep slot names an image outside `current`, or names the same
/// image twice.
pub fn plan_media(
    current: &[ImageId],
    slots: &[DesiredSlot],
    highlight_index: i64,
) -> DiffResult<MediaPlan> {
    let mut by_index: BTreeMap<usize, &SlotContent> = BTreeMap::new();
    for slot in slots {
        by_index.insert(slot.index, &slot.content);
    }

    let current: BTreeSet<ImageId> = current.iter().copied().collect();
    let mut kept: BTreeSet<ImageId> = BTreeSet::new();
    let mut to_create = Vec::new();
    let mut final_order = Vec::with_capacity(by_index.len());

    for (index, content) in by_index {
        let identity = match content {
            SlotContent::Keep(id) => {
                if !current.contains(id) {
                    return Err(DiffError::UnknownImage(*id));
                }
                if !kept.insert(*id) {
                    return Err(DiffError::DuplicateImage(*id));
                }
                SlotIdentity::Existing(*id)
            }
            SlotContent::New(upload) => {
                to_create.push(PendingImage {
                    index,
                    upload: upload.clone(),
                });
                SlotIdentity::Pending(index)
            }
        };
        final_order.push(PlacedSlot { index, identity });
    }

    let to_delete = current.difference(&kept).copied().collect();

    let highlight = usize::try_from(highlight_index)
        .ok()
        .and_then(|pos| final_order.get(pos))
        .map(|placed| placed.identity);

    Ok(MediaPlan {
        to_delete,
        to_create,
        final_order,
        highlight,
    })
}
