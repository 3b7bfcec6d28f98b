use bytes::Bytes;
use folio_types::ImageId;

/// Raw bytes of a not-yet-stored image plus the name it was uploaded under.
#[derive(Clone, PartialEq, Eq)]
pub struct Upload {
    pub filename: String,
    pub data: Bytes,
}

impl Upload {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

impl std::fmt::Debug for Upload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upload")
            .field("filename", &self.filename)
            .field("size", &self.data.len())
            .finish()
    }
}

/// What a slot holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlotContent {
    /// Keep an image that is already persisted for the project.
    Keep(ImageId),
    /// Store a new image.
    New(Upload),
}

/// One position in the client's desired image ordering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DesiredSlot {
    /// Position as submitted by the client; need not be contiguous.
    pub index: usize,
    pub content: SlotContent,
}

impl DesiredSlot {
    pub fn keep(index: usize, id: ImageId) -> Self {
        Self {
            index,
            content: SlotContent::Keep(id),
        }
    }

    pub fn upload(index: usize, filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            index,
            content: SlotContent::New(Upload::new(filename, data)),
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self.content, SlotContent::New(_))
    }
}
