//! The two shared "current file" cells read by the image and histogram views.
//!
//! A single `PathStateRegistry` is built at startup and handed to every
//! component that needs it. Clones share the same cells.

use std::fmt::{Display, Formatter, Result as FmtResult};

use {
    serde::{Deserialize, Serialize},
    tracing::debug,
};

use crate::state::observable::{Observable, Subscription};

/// An observable optional filesystem path.
pub type PathCell = Observable<Option<String>>;

/// Selects one of the two path cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    /// Image shown in the primary viewer.
    Image,
    /// Image whose histogram is displayed.
    Histogram,
}

impl PathKind {
    /// Both kinds, image first.
    pub const ALL: [PathKind; 2] = [PathKind::Image, PathKind::Histogram];

    /// Cell name used in logs.
    #[must_use]
    pub fn cell_name(self) -> &'static str {
        match self {
            PathKind::Image => "active_image_path",
            PathKind::Histogram => "active_histogram_path",
        }
    }
}

impl Display for PathKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PathKind::Image => write!(f, "image"),
            PathKind::Histogram => write!(f, "histogram"),
        }
    }
}

/// Point-in-time copy of both cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSnapshot {
    /// Active image path.
    pub image: Option<String>,
    /// Active histogram path.
    pub histogram: Option<String>,
}

/// Holds the active image path and the active histogram path.
///
/// The cells are independent: writing one never notifies subscribers of
/// the other, and nothing here keeps them equal.
#[derive(Debug, Clone)]
pub struct PathStateRegistry {
    active_image_path: PathCell,
    active_histogram_path: PathCell,
}

impl Default for PathStateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PathStateRegistry {
    /// Creates a registry with both paths unset.
    pub fn new() -> Self {
        debug!("PathStateRegistry: Creating registry with unset paths");
        Self {
            active_image_path: Observable::named(PathKind::Image.cell_name(), None),
            active_histogram_path: Observable::named(PathKind::Histogram.cell_name(), None),
        }
    }

    /// The cell for the image shown in the primary viewer.
    #[must_use]
    pub fn active_image_path(&self) -> &PathCell {
        &self.active_image_path
    }

    /// The cell for the image whose histogram is shown.
    #[must_use]
    pub fn active_histogram_path(&self) -> &PathCell {
        &self.active_histogram_path
    }

    /// Returns the cell selected by `kind`.
    #[must_use]
    pub fn cell(&self, kind: PathKind) -> &PathCell {
        match kind {
            PathKind::Image => &self.active_image_path,
            PathKind::Histogram => &self.active_histogram_path,
        }
    }

    /// Reads the current value of one cell.
    #[must_use]
    pub fn read(&self, kind: PathKind) -> Option<String> {
        self.cell(kind).get()
    }

    /// Writes one cell and notifies its subscribers.
    ///
    /// # Arguments
    ///
    /// * `kind` - Which cell to write.
    /// * `path` - New path, or `None` for "nothing selected".
    pub fn write(&self, kind: PathKind, path: Option<String>) {
        debug!(cell = kind.cell_name(), path = ?path, "PathStateRegistry: Writing path");
        self.cell(kind).set(path);
    }

    /// Subscribes to one cell. See `Observable::subscribe`.
    pub fn subscribe<F>(&self, kind: PathKind, callback: F) -> Subscription
    where
        F: Fn(&Option<String>) + Send + Sync + 'static,
    {
        self.cell(kind).subscribe(callback)
    }

    /// Copies both current values.
    #[must_use]
    pub fn snapshot(&self) -> PathSnapshot {
        PathSnapshot {
            image: self.active_image_path.get(),
            histogram: self.active_histogram_path.get(),
        }
    }
}
