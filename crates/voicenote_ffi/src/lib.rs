//! Flutter-facing bindings for the VoiceNote core.

pub mod api;
