use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::ContentRef;
use crate::error::TypeError;
use crate::ids::{ImageId, ProjectId};

/// Highlight index sentinel meaning "no highlighted slot requested".
pub const NO_HIGHLIGHT: i64 = -1;

/// Value of a project image's `order` column.
///
/// Despite its name the column is a binary highlight marker: exactly one
/// image of a project may carry [`ImageOrder::Highlighted`], every other
/// image carries [`ImageOrder::Regular`]. No other value is ever written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageOrder {
    Regular,
    Highlighted,
}

impl ImageOrder {
    /// The stored column value.
    pub const fn value(self) -> i64 {
        match self {
            Self::Regular => 0,
            Self::Highlighted => 1,
        }
    }
}

/// A portfolio project row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub status: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    /// Display position of the project among projects.
    pub order: i64,
    pub highlighted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An image belonging to a project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectImage {
    pub id: ImageId,
    /// Owning project. Images are removed with their project.
    pub project_id: ProjectId,
    pub name: String,
    pub url: ContentRef,
    /// Highlight marker, see [`ImageOrder`].
    pub order: i64,
    #[serde(rename = "blur_hash", skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectImage {
    pub fn is_highlighted(&self) -> bool {
        self.order == ImageOrder::Highlighted.value()
    }
}

/// A project together with its images in display order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectWithImages {
    #[serde(flatten)]
    pub project: Project,
    pub images: Vec<ProjectImage>,
}

impl ProjectWithImages {
    /// The highlighted image, if any.
    pub fn highlighted_image(&self) -> Option<&ProjectImage> {
        self.images.iter().find(|img| img.is_highlighted())
    }
}

/// Client-editable scalar fields of a project.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFields {
    pub name: String,
    pub category: Option<String>,
    pub client: Option<String>,
    pub order: i64,
}

impl ProjectFields {
    /// Check required fields and normalize optional ones.
    ///
    /// Blank `category` and `client` values are stored as absent.
    pub fn validated(self) -> Result<Self, TypeError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(TypeError::MissingField("name"));
        }
        Ok(Self {
            name,
            category: non_blank(self.category),
            client: non_blank(self.client),
            order: self.order,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Paginated listing envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}
