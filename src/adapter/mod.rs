//! Input adapter for the engagement engine.
//!
//! Normalizes raw UI notifications (navigation, clicks, scrolls, form
//! submits) into the uniform event shape the engine records, and provides
//! the channel-backed source the engine drains.

pub mod source;
pub mod types;

pub use source::{InputEventSource, ScriptedSource, SourceError};
pub use types::{
    ClickPoint, InteractionEvent, InteractionKind, NormalizedEvent, PageVisit, RawUiEvent,
};
