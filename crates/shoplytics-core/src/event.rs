use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event types stored in `visitor_events.event_type`.
///
/// Only product views are recorded today; `PageView` exists so rows written
/// by a newer deployment still parse on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "PRODUCT_VIEW")]
    ProductView,
    #[serde(rename = "PAGE_VIEW")]
    PageView,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProductView => "PRODUCT_VIEW",
            Self::PageView => "PAGE_VIEW",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "PRODUCT_VIEW" => Ok(Self::ProductView),
            "PAGE_VIEW" => Ok(Self::PageView),
            other => Err(anyhow!("unknown event type: {other}")),
        }
    }
}

/// Dedup key for a product view: a fixed prefix plus the product id, with no
/// time component. One session can record a given product at most once for
/// the session's whole lifetime.
pub fn product_view_key(product_id: &str) -> String {
    format!("product-{product_id}")
}

/// A stored tracking event — mirrors the `visitor_events` table columns.
/// Immutable after insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitorEvent {
    pub id: String,
    pub session_id: String,
    pub channel_id: String,
    /// NULL once the referenced product is deleted from the catalog.
    pub product_id: Option<String>,
    pub event_type: EventType,
    pub event_key: String,
    pub created_at: DateTime<Utc>,
}

impl VisitorEvent {
    pub fn product_view(
        session_id: String,
        channel_id: String,
        product_id: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id,
            channel_id,
            event_key: product_view_key(&product_id),
            product_id: Some(product_id),
            event_type: EventType::ProductView,
            created_at: now,
        }
    }
}

/// The payload the storefront sends to POST /api/track.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackRequest {
    pub channel_id: String,
    pub product_id: String,
    /// Absent for first-contact traffic; the service synthesizes one.
    pub session_token: Option<String>,
    /// Present when the storefront request carries an authenticated shopper.
    pub customer_id: Option<String>,
}

/// Why a tracking call was accepted without recording an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackRefusal {
    Duplicate,
    ProductNotFound,
    ChannelNotFound,
}

/// Result of a tracking call. Refusals are ordinary outcomes, not errors —
/// the storefront always receives a structured answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackOutcome {
    pub recorded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<TrackRefusal>,
}

impl TrackOutcome {
    pub fn recorded() -> Self {
        Self {
            recorded: true,
            reason: None,
        }
    }

    pub fn refused(reason: TrackRefusal) -> Self {
        Self {
            recorded: false,
            reason: Some(reason),
        }
    }
}
