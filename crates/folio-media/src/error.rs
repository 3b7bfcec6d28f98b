use thiserror::Error;

use folio_db::DbError;
use folio_diff::DiffError;
use folio_store::StoreError;
use folio_types::{ProjectId, TypeError};

/// Why a media operation failed.
///
/// The relational side is never partially changed: a failure either happened
/// before the transaction opened or rolled it back. `orphaned` counts files
/// newly written to the content store before the failure and left
/// unreferenced; uploads whose content was already stored do not count.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    #[error("unsupported content in '{filename}': {detected}")]
    UnsupportedContent {
        filename: String,
        detected: String,
        orphaned: usize,
    },

    #[error("storage error: {source}")]
    Storage {
        #[source]
        source: StoreError,
        orphaned: usize,
    },

    #[error("database error: {source}")]
    Database {
        #[source]
        source: DbError,
        orphaned: usize,
    },
}

impl MediaError {
    /// Files written before the failure and now unreferenced.
    pub fn orphaned(&self) -> usize {
        match self {
            Self::Validation(_) | Self::ProjectNotFound(_) => 0,
            Self::UnsupportedContent { orphaned, .. }
            | Self::Storage { orphaned, .. }
            | Self::Database { orphaned, .. } => *orphaned,
        }
    }

    /// `true` if the failed operation changed nothing at all.
    pub fn is_side_effect_free(&self) -> bool {
        self.orphaned() == 0
    }

    pub(crate) fn with_orphans(mut self, count: usize) -> Self {
        match &mut self {
            Self::UnsupportedContent { orphaned, .. }
            | Self::Storage { orphaned, .. }
            | Self::Database { orphaned, .. } => *orphaned = count,
            Self::Validation(_) | Self::ProjectNotFound(_) => {}
        }
        self
    }

    pub(crate) fn from_store(filename: &str, err: StoreError) -> Self {
        match err {
            StoreError::UnsupportedMediaType { detected } => Self::UnsupportedContent {
                filename: filename.to_string(),
                detected,
                orphaned: 0,
            },
            source => Self::Storage {
                source,
                orphaned: 0,
            },
        }
    }
}

impl From<DbError> for MediaError {
    fn from(source: DbError) -> Self {
        Self::Database {
            source,
            orphaned: 0,
        }
    }
}

impl From<TypeError> for MediaError {
    fn from(err: TypeError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<DiffError> for MediaError {
    fn from(err: DiffError) -> Self {
        Self::Validation(err.to_string())
    }
}

pub type MediaResult<T> = Result<T, MediaError>;
