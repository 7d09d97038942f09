//! Fire-and-forget user feedback capabilities.

/// Cosmetic acknowledgment fired once per successful note creation.
///
/// Implementations must swallow their own failures.
pub trait CelebrationEffect: Send {
    fn celebrate(&self);
}

/// Celebration effect that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCelebration;

impl CelebrationEffect for NoCelebration {
    fn celebrate(&self) {}
}

/// System clipboard writer.
pub trait Clipboard: Send {
    /// Writes `text` to the clipboard, returning a human-readable cause on
    /// failure.
    fn write_text(&self, text: &str) -> Result<(), String>;
}
