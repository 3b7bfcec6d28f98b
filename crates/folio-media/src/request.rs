use folio_diff::{DesiredSlot, FormFields};
use folio_types::{ContentRef, ProjectFields, ProjectId, ProjectWithImages, NO_HIGHLIGHT};

/// Desired state of a project as submitted by a client.
#[derive(Clone, Debug, Default)]
pub struct MediaRequest {
    pub fields: ProjectFields,
    pub slots: Vec<DesiredSlot>,
    /// Final position to highlight; negative for none.
    pub highlight_index: i64,
}

impl MediaRequest {
    pub fn new(fields: ProjectFields, slots: Vec<DesiredSlot>) -> Self {
        Self {
            fields,
            slots,
            highlight_index: NO_HIGHLIGHT,
        }
    }

    pub fn with_highlight(mut self, index: i64) -> Self {
        self.highlight_index = index;
        self
    }

    /// Interpret a submitted form.
    pub fn from_form(form: &FormFields) -> Self {
        Self {
            fields: form.project_fields(),
            slots: form.desired_slots(),
            highlight_index: form.highlight_index(),
        }
    }
}

/// What happened to content whose rows were removed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentCleanup {
    /// Files removed from the content store.
    pub deleted: Vec<ContentRef>,
    /// Files left in place because other image rows still reference them.
    pub retained: Vec<ContentRef>,
    /// Files whose removal failed. They are left behind as orphans.
    pub failed: Vec<ContentRef>,
}

impl ContentCleanup {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Result of a committed create or update.
#[derive(Clone, Debug, PartialEq)]
pub struct ReconcileOutcome {
    pub id: ProjectId,
    /// The project as persisted, images in final slot order. `None` if it
    /// could not be loaded after the commit.
    pub project: Option<ProjectWithImages>,
    pub cleanup: ContentCleanup,
}
