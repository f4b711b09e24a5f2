//! Event types for the input adapter.
//!
//! Raw UI notifications (navigation, clicks, scrolls, form submits) are
//! normalized here into the uniform `InteractionEvent` shape the engine
//! records. The engine stamps timestamps with its own clock at ingest, so
//! raw events carry none.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pixel coordinates of a click within the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClickPoint {
    pub x: f64,
    pub y: f64,
}

/// Classification of a recorded interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    Click,
    Scroll,
    FormSubmit,
    PageTime,
    QuickAction,
}

/// A single recorded user action. Immutable once appended to a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionEvent {
    /// What kind of action this was
    pub kind: InteractionKind,
    /// Semantic identifier of the UI element involved, or a logical name
    /// for synthetic events
    pub element: String,
    /// Viewport coordinates, present only for clicks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<ClickPoint>,
    /// Free-form payload: scroll depth, element text, action name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl InteractionEvent {
    /// Create a click event.
    pub fn click(
        element: &str,
        coordinates: Option<ClickPoint>,
        text: Option<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            kind: InteractionKind::Click,
            element: element.to_string(),
            coordinates,
            value: text.map(serde_json::Value::String),
            timestamp: at,
        }
    }

    /// Create a scroll event carrying the observed depth percentage.
    pub fn scroll(depth_percent: u8, at: DateTime<Utc>) -> Self {
        Self {
            kind: InteractionKind::Scroll,
            element: "document".to_string(),
            coordinates: None,
            value: Some(serde_json::json!(depth_percent.min(100))),
            timestamp: at,
        }
    }

    /// Create a form submission event.
    pub fn form_submit(form: &str, at: DateTime<Utc>) -> Self {
        Self {
            kind: InteractionKind::FormSubmit,
            element: form.to_string(),
            coordinates: None,
            value: None,
            timestamp: at,
        }
    }

    /// Create a synthetic page-time ping for the given page.
    pub fn page_time(page: &str, millis: u64, at: DateTime<Utc>) -> Self {
        Self {
            kind: InteractionKind::PageTime,
            element: page.to_string(),
            coordinates: None,
            value: Some(serde_json::json!(millis)),
            timestamp: at,
        }
    }

    /// Create a quick-action event identified by its logical name.
    pub fn quick_action(name: &str, at: DateTime<Utc>) -> Self {
        Self {
            kind: InteractionKind::QuickAction,
            element: name.to_string(),
            coordinates: None,
            value: Some(serde_json::Value::String(name.to_string())),
            timestamp: at,
        }
    }

    /// Scroll depth carried by this event, when it is a scroll.
    pub fn scroll_depth(&self) -> Option<u8> {
        match self.kind {
            InteractionKind::Scroll => self
                .value
                .as_ref()
                .and_then(|v| v.as_u64())
                .map(|d| d.min(100) as u8),
            _ => None,
        }
    }
}

/// Navigation payload: the page being opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageVisit {
    /// Path or route identifier
    pub path: String,
    /// Document title
    pub title: String,
    /// Path the user navigated from, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
}

impl PageVisit {
    pub fn new(path: &str, title: &str) -> Self {
        Self {
            path: path.to_string(),
            title: title.to_string(),
            referrer: None,
        }
    }
}

/// Raw UI notification as produced by a routing/input collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RawUiEvent {
    Navigate {
        path: String,
        title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        referrer: Option<String>,
    },
    Click {
        element: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        coordinates: Option<ClickPoint>,
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    Scroll {
        depth_percent: u8,
    },
    FormSubmit {
        form: String,
    },
    PageTime {
        page: String,
        millis: u64,
    },
    QuickAction {
        name: String,
    },
}

/// A raw event normalized against the engine clock.
#[derive(Debug, Clone)]
pub enum NormalizedEvent {
    PageVisit(PageVisit),
    Interaction(InteractionEvent),
}

impl RawUiEvent {
    /// Normalize into the uniform event shape, stamped at the given instant.
    pub fn normalize(self, at: DateTime<Utc>) -> NormalizedEvent {
        match self {
            RawUiEvent::Navigate {
                path,
                title,
                referrer,
            } => NormalizedEvent::PageVisit(PageVisit {
                path,
                title,
                referrer,
            }),
            RawUiEvent::Click {
                element,
                coordinates,
                text,
            } => NormalizedEvent::Interaction(InteractionEvent::click(
                &element,
                coordinates,
                text,
                at,
            )),
            RawUiEvent::Scroll { depth_percent } => {
                NormalizedEvent::Interaction(InteractionEvent::scroll(depth_percent, at))
            }
            RawUiEvent::FormSubmit { form } => {
                NormalizedEvent::Interaction(InteractionEvent::form_submit(&form, at))
            }
            RawUiEvent::PageTime { page, millis } => {
                NormalizedEvent::Interaction(InteractionEvent::page_time(&page, millis, at))
            }
            RawUiEvent::QuickAction { name } => {
                NormalizedEvent::Interaction(InteractionEvent::quick_action(&name, at))
            }
        }
    }
}
