//! Form interpretation: submitted fields to desired slots and scalars.
//!
//! Slot fields follow the admin client's naming:
//!
//! ```text
//! files[3][id] = 42      keep image 42 at position 3
//! files[4]     = <file>  store a new image at position 4
//! files[]      = <file>  store a new image after all indexed slots
//! ```
//!
//! Parsing never fails: malformed keys and unparseable ids are ignored.

use std::collections::BTreeMap;

use bytes::Bytes;
use folio_types::{ImageId, ProjectFields, NO_HIGHLIGHT};

use crate::slot::{DesiredSlot, SlotContent, Upload};

const SLOT_FIELD: &str = "files";

/// A submitted form: text fields and file parts, in submission order.
#[derive(Clone, Debug, Default)]
pub struct FormFields {
    values: Vec<(String, String)>,
    files: Vec<(String, Upload)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SlotKey {
    Id(usize),
    File(usize),
    Append,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.push((key.into(), value.into()));
    }

    pub fn push_file(&mut self, key: impl Into<String>, filename: impl Into<String>, data: impl Into<Bytes>) {
        self.files.push((key.into(), Upload::new(filename, data)));
    }

    /// Builder-style [`FormFields::push_value`].
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_value(key, value);
        self
    }

    /// Builder-style [`FormFields::push_file`].
    pub fn with_file(
        mut self,
        key: impl Into<String>,
        filename: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        self.push_file(key, filename, data);
        self
    }

    /// First value submitted under `key`.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Scalar project fields. Not validated; see [`ProjectFields::validated`].
    pub fn project_fields(&self) -> ProjectFields {
        ProjectFields {
            name: self.value("name").unwrap_or_default().to_string(),
            category: self.value("category").map(str::to_string),
            client: self.value("client").map(str::to_string),
            order: self
                .value("order")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0),
        }
    }

    /// Requested highlight position, or [`NO_HIGHLIGHT`].
    pub fn highlight_index(&self) -> i64 {
        self.value("highlightImageIndex")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(NO_HIGHLIGHT)
    }

    /// Parse the slot fields into desired slots, sorted by index.
    ///
    /// A keep id and an upload at the same index resolve to the keep. When a
    /// key repeats, the later submission wins. Empty uploads are ignored.
    pub fn desired_slots(&self) -> Vec<DesiredSlot> {
        let mut keeps: BTreeMap<usize, ImageId> = BTreeMap::new();
        for (key, value) in &self.values {
            if let Some(SlotKey::Id(index)) = parse_slot_key(key) {
                if let Ok(id) = value.parse::<ImageId>() {
                    keeps.insert(index, id);
                }
            }
        }

        let mut uploads: BTreeMap<usize, &Upload> = BTreeMap::new();
        let mut appended: Vec<&Upload> = Vec::new();
        for (key, upload) in &self.files {
            if upload.data.is_empty() {
                continue;
            }
            match parse_slot_key(key) {
                Some(SlotKey::File(index)) if !keeps.contains_key(&index) => {
                    uploads.insert(index, upload);
                }
                Some(SlotKey::Append) => appended.push(upload),
                _ => {}
            }
        }

        let mut slots: Vec<DesiredSlot> = keeps
            .into_iter()
            .map(|(index, id)| DesiredSlot::keep(index, id))
            .chain(uploads.into_iter().map(|(index, upload)| DesiredSlot {
                index,
                content: SlotContent::New(upload.clone()),
            }))
            .collect();
        slots.sort_by_key(|s| s.index);

        let mut next = slots.last().map(|s| s.index + 1).unwrap_or(0);
        for upload in appended {
            slots.push(DesiredSlot {
                index: next,
                content: SlotContent::New(upload.clone()),
            });
            next += 1;
        }
        slots
    }
}

fn parse_slot_key(key: &str) -> Option<SlotKey> {
    let rest = key.strip_prefix(SLOT_FIELD)?.strip_prefix('[')?;
    if rest == "]" {
        return Some(SlotKey::Append);
    }
    let (token, tail) = rest.split_once(']')?;
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index = token.parse().ok()?;
    match tail {
        "" => Some(SlotKey::File(index)),
        "[id]" => Some(SlotKey::Id(index)),
        _ => None,
    }
}
