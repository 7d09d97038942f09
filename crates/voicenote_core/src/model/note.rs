//! Note domain model.
//!
//! # Responsibility
//! - Define the only persisted entity of the core.
//! - Provide edit helpers that keep identity and cosmetics untouched.
//!
//! # Invariants
//! - `id` is assigned once and never changes.
//! - `created_at` keeps the original creation display string; edits only
//!   append [`EDITED_MARKER`].
//! - `presentation` is fixed at creation.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Suffix appended to `created_at` on every successful edit.
pub const EDITED_MARKER: &str = " (edited)";

/// Stable note identifier derived from wall-clock milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub i64);

impl NoteId {
    pub fn value(self) -> i64 {
        self.0
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cosmetic data assigned at creation.
///
/// The core never interprets these values; it only guarantees they survive
/// persistence unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    /// CSS gradient string picked from the palette.
    #[serde(default = "default_gradient")]
    pub gradient: String,
    /// Tilt in degrees, within `[-3, 3)`.
    #[serde(default)]
    pub rotation: f64,
}

/// Persisted note record.
///
/// Serialized field names (`id`, `text`, `date`, `pinned`, `gradient`,
/// `rotation`) match the stored collection format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub text: String,
    /// Display timestamp fixed at creation, plus one marker per edit.
    #[serde(rename = "date")]
    pub created_at: String,
    #[serde(default)]
    pub pinned: bool,
    #[serde(flatten)]
    pub presentation: Presentation,
}

impl Note {
    /// Replaces note text and annotates the display timestamp.
    ///
    /// Repeated edits append the marker again.
    pub fn apply_edit(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.created_at.push_str(EDITED_MARKER);
    }

    /// Returns whether this note has been edited at least once.
    pub fn is_edited(&self) -> bool {
        self.created_at.ends_with(EDITED_MARKER)
    }
}

fn default_gradient() -> String {
    crate::store::palette::GRADIENTS[0].to_string()
}
