//! Cosmetic presentation assignment for new notes.
//!
//! Gradient and tilt are drawn uniformly at random once, at creation; they
//! are persisted with the note and never recomputed.

use crate::model::note::Presentation;
use rand::Rng;

/// Fixed gradient palette.
pub const GRADIENTS: [&str; 7] = [
    "linear-gradient(135deg, #FFDE59, #FFB830)",
    "linear-gradient(135deg, #A0E7E5, #4ECDC4)",
    "linear-gradient(135deg, #FFAEBC, #FF8FAB)",
    "linear-gradient(135deg, #B4F8C8, #8BE9A8)",
    "linear-gradient(135deg, #FBE7C6, #F9D29D)",
    "linear-gradient(135deg, #A0C4FF, #7B9FFF)",
    "linear-gradient(135deg, #E0C3FC, #D4A5FF)",
];

/// Maximum absolute tilt in degrees.
pub const MAX_ROTATION_DEGREES: f64 = 3.0;

/// Picks presentation data for a freshly created note.
pub fn random_presentation() -> Presentation {
    presentation_from(&mut rand::thread_rng())
}

/// Draws a gradient and a rotation in `[-MAX, MAX)` from `rng`.
pub fn presentation_from<R: Rng + ?Sized>(rng: &mut R) -> Presentation {
    let index = rng.gen_range(0..GRADIENTS.len());
    Presentation {
        gradient: GRADIENTS[index].to_string(),
        rotation: rng.gen_range(-MAX_ROTATION_DEGREES..MAX_ROTATION_DEGREES),
    }
}
